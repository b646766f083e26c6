//! AppError tests

use std::error::Error;

use actix_web::ResponseError;
use actix_web::body::MessageBody;
use actix_web::http::StatusCode;
use linkhub::errors::{AppError, Result};

#[test]
fn test_status_mapping() {
    let cases = [
        (AppError::validation("x"), StatusCode::BAD_REQUEST),
        (AppError::date_parse("x"), StatusCode::BAD_REQUEST),
        (AppError::not_found("x"), StatusCode::NOT_FOUND),
        (AppError::expired("x"), StatusCode::GONE),
        (AppError::forbidden("x"), StatusCode::FORBIDDEN),
        (AppError::quota_exceeded("x"), StatusCode::FORBIDDEN),
        (AppError::account_disabled("x"), StatusCode::FORBIDDEN),
        (AppError::conflict("x"), StatusCode::CONFLICT),
        (AppError::auth_failed("x"), StatusCode::UNAUTHORIZED),
        (AppError::database_operation("x"), StatusCode::INTERNAL_SERVER_ERROR),
        (AppError::file_operation("x"), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (error, status) in cases {
        assert_eq!(error.http_status(), status, "{}", error.code());
        assert_eq!(error.status_code(), status);
    }
}

#[test]
fn test_user_facing_split() {
    assert!(AppError::conflict("taken").is_user_facing());
    assert!(AppError::quota_exceeded("full").is_user_facing());
    assert!(!AppError::database_connection("down").is_user_facing());
    assert!(!AppError::password_hash("argon").is_user_facing());
}

#[test]
fn test_display_and_codes() {
    let error = AppError::not_found("Short URL not found");
    assert_eq!(error.code(), "E006");
    assert_eq!(error.message(), "Short URL not found");
    assert_eq!(error.to_string(), "Resource Not Found: Short URL not found");
    assert!(error.source().is_none());

    let colored = AppError::conflict("dup").format_colored();
    assert!(colored.contains("E009"));
    assert!(colored.contains("dup"));
}

#[test]
fn test_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    assert!(matches!(AppError::from(io), AppError::FileOperation(_)));

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(AppError::from(json), AppError::Serialization(_)));

    fn fails() -> Result<()> {
        let _: serde_json::Value = serde_json::from_str("nope")?;
        Ok(())
    }
    assert!(matches!(fails(), Err(AppError::Serialization(_))));
}

#[test]
fn test_error_page_hides_internal_details() {
    let response = AppError::database_operation("SQLITE_BUSY at table admins").error_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.into_body().try_into_bytes().unwrap_or_default();
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Internal Server Error"));
    assert!(!body.contains("SQLITE_BUSY"));

    let response = AppError::expired("This short URL has expired").error_response();
    assert_eq!(response.status(), StatusCode::GONE);
    let body = response.into_body().try_into_bytes().unwrap_or_default();
    assert!(String::from_utf8_lossy(&body).contains("This short URL has expired"));
}
