use super::{PageContext, layout};

pub fn render(ctx: &PageContext<'_>) -> String {
    let action = if ctx.user.is_some() {
        r#"<a class="button" href="/admin/dashboard">Go to dashboard</a>"#
    } else {
        r#"<a class="button" href="/login">Sign in</a>"#
    };
    layout(
        ctx,
        &format!(
            r#"<section class="hero">
<h1>{}</h1>
<p>Short links with custom domains, passcodes and expiry.</p>
{}
</section>"#,
            super::e(ctx.site_name),
            action
        ),
    )
}
