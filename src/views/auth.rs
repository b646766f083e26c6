//! Login and passcode challenge pages

use super::{PageContext, e, layout};

pub struct LoginPage<'a> {
    /// 还没有任何账号：首次登录将创建超级管理员
    pub bootstrap: bool,
    /// 验证码 SVG，未启用时为 None
    pub captcha_svg: Option<&'a str>,
    pub notice: Option<&'a str>,
}

/// 点击验证码图片时从 /captcha 刷新
const CAPTCHA_REFRESH_JS: &str = "fetch('/captcha',{credentials:'same-origin'}).then(function(r){return r.text()}).then(function(s){document.getElementById('captcha-image').innerHTML=s})";

fn captcha_block(svg: Option<&str>, refreshable: bool) -> String {
    let Some(svg) = svg else {
        return String::new();
    };
    let onclick = if refreshable {
        format!(r#" onclick="{}" title="Click to refresh""#, CAPTCHA_REFRESH_JS)
    } else {
        String::new()
    };
    format!(
        r#"<label for="captcha">Captcha</label>
<div class="captcha"><span id="captcha-image"{onclick}>{svg}</span>
<input type="text" id="captcha" name="captcha" autocomplete="off" required></div>"#,
        onclick = onclick,
        svg = svg,
    )
}

pub fn render_login(ctx: &PageContext<'_>, page: &LoginPage<'_>) -> String {
    let bootstrap = if page.bootstrap {
        r#"<div class="flash flash-info">No accounts exist yet. The first login creates the superadmin account with the credentials you enter.</div>"#
    } else {
        ""
    };
    let notice = page
        .notice
        .map(|n| format!(r#"<div class="flash flash-success">{}</div>"#, e(n)))
        .unwrap_or_default();

    layout(
        ctx,
        &format!(
            r#"<section class="card narrow">
<h1>Sign in</h1>
{bootstrap}{notice}
<form method="post" action="/login">
<label for="username">Username</label>
<input type="text" id="username" name="username" autocomplete="username" required autofocus>
<label for="password">Password</label>
<input type="password" id="password" name="password" autocomplete="current-password" required>
{captcha}
<button type="submit">Sign in</button>
</form>
</section>"#,
            bootstrap = bootstrap,
            notice = notice,
            captcha = captcha_block(page.captcha_svg, true),
        ),
    )
}

pub struct VerifyPage<'a> {
    pub short_code: &'a str,
    pub captcha_svg: Option<&'a str>,
    pub error: Option<&'a str>,
}

pub fn render_verify(ctx: &PageContext<'_>, page: &VerifyPage<'_>) -> String {
    let error = page
        .error
        .map(|m| format!(r#"<div class="flash flash-error">{}</div>"#, e(m)))
        .unwrap_or_default();

    layout(
        ctx,
        &format!(
            r#"<section class="card narrow">
<h1>Protected link</h1>
<p>This short URL is protected. Enter the passcode to continue.</p>
{error}
<form method="post" action="/{code}">
<label for="passcode">Passcode</label>
<input type="password" id="passcode" name="passcode" required autofocus>
{captcha}
<button type="submit">Continue</button>
</form>
</section>"#,
            error = error,
            code = e(page.short_code),
            captcha = captcha_block(page.captcha_svg, false),
        ),
    )
}
