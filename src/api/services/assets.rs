//! 内嵌静态资源（样式表等）

use actix_web::{HttpResponse, ResponseError, web};
use rust_embed::Embed;
use tracing::debug;

#[derive(Embed)]
#[folder = "assets/"]
struct StaticAssets;

fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or_default() {
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// GET /static/{file}
pub async fn serve(path: web::Path<String>) -> HttpResponse {
    let file = path.into_inner();
    match StaticAssets::get(&file) {
        Some(content) => HttpResponse::Ok()
            .content_type(content_type(&file))
            .insert_header(("Cache-Control", "public, max-age=86400"))
            .body(content.data.into_owned()),
        None => {
            debug!("Static file not found: {}", file);
            crate::errors::AppError::not_found("File not found").error_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("style.css"), "text/css; charset=utf-8");
        assert_eq!(content_type("logo.svg"), "image/svg+xml");
        assert_eq!(content_type("README"), "application/octet-stream");
    }

    #[test]
    fn test_stylesheet_is_embedded() {
        assert!(StaticAssets::get("style.css").is_some());
    }
}
