//! Server-rendered HTML pages
//!
//! 所有动态内容都经过 [`escape_html`] 转义后再拼接。

pub mod admin;
pub mod auth;
pub mod error;
pub mod home;

use chrono::{DateTime, Utc};

use crate::api::session::{Flash, FlashKind};
use crate::services::CurrentUser;
pub use crate::utils::escape_html as e;

/// 页面公共上下文
pub struct PageContext<'a> {
    pub site_name: &'a str,
    pub title: &'a str,
    pub user: Option<&'a CurrentUser>,
    pub flashes: &'a [Flash],
}

pub fn layout(ctx: &PageContext<'_>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - {site}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{nav}
<main class="container">
{flashes}
{body}
</main>
</body>
</html>"#,
        title = e(ctx.title),
        site = e(ctx.site_name),
        nav = nav(ctx),
        flashes = render_flashes(ctx.flashes),
        body = body,
    )
}

fn nav(ctx: &PageContext<'_>) -> String {
    let mut links = String::new();
    match ctx.user {
        Some(user) => {
            links.push_str(r#"<a href="/admin/dashboard">Dashboard</a>"#);
            if user.is_superadmin() {
                links.push_str(r#"<a href="/admin/users">Users</a>"#);
                links.push_str(r#"<a href="/admin/domains">Domains</a>"#);
                links.push_str(r#"<a href="/admin/settings">Settings</a>"#);
            }
            links.push_str(&format!(
                r#"<span class="nav-user">{} ({})</span><a href="/logout">Logout</a>"#,
                e(&user.username),
                user.role
            ));
        }
        None => links.push_str(r#"<a href="/login">Login</a>"#),
    }
    format!(
        r#"<nav class="topbar"><a class="brand" href="/">{}</a><div class="nav-links">{}</div></nav>"#,
        e(ctx.site_name),
        links
    )
}

pub fn render_flashes(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| {
            let class = match f.kind {
                FlashKind::Success => "flash flash-success",
                FlashKind::Error => "flash flash-error",
            };
            format!(r#"<div class="{}">{}</div>"#, class, e(&f.message))
        })
        .collect()
}

/// 单条错误/提示框
pub fn alert(message: Option<&str>, kind: FlashKind) -> String {
    match message {
        Some(m) => render_flashes(&[Flash {
            kind,
            message: m.to_string(),
        }]),
        None => String::new(),
    }
}

pub fn format_time(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// datetime-local 输入框的值
pub fn datetime_input_value(t: Option<&DateTime<Utc>>) -> String {
    t.map(|t| t.format("%Y-%m-%dT%H:%M").to_string())
        .unwrap_or_default()
}

pub fn checked(flag: bool) -> &'static str {
    if flag { " checked" } else { "" }
}

pub fn selected(flag: bool) -> &'static str {
    if flag { " selected" } else { "" }
}
