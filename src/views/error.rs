use super::e;

fn reason(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        410 => "Gone",
        429 => "Too Many Requests",
        _ => "Error",
    }
}

/// 独立的错误页（不依赖会话）
pub fn render_standalone(site_name: &str, status: u16, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{status} {reason} - {site}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<main class="container error-page">
<h1>{status}</h1>
<h2>{reason}</h2>
<p>{message}</p>
<p><a href="/">{site}</a></p>
</main>
</body>
</html>"#,
        status = status,
        reason = reason(status),
        site = e(site_name),
        message = e(message),
    )
}
