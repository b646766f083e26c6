use super::super::{PageContext, checked, e, layout, selected};
use crate::config::{CaptchaKind, MAX_CAPTCHA_LENGTH, SiteSettings};

pub fn render(ctx: &PageContext<'_>, settings: &SiteSettings) -> String {
    let kind = settings.captcha.kind;
    layout(
        ctx,
        &format!(
            r#"<h1>Settings</h1>
<section class="card">
<form method="post" action="/admin/settings/update">
<label>Site name<input type="text" name="siteName" value="{site_name}" required></label>
<label>Base URL<input type="url" name="baseUrl" value="{base_url}" required></label>
<fieldset><legend>Captcha</legend>
<label class="checkbox"><input type="checkbox" name="captcha_enabled"{enabled}> Enabled</label>
<label>Type<select name="captcha_type">
<option value="alphanumeric"{alnum}>Letters and digits</option>
<option value="numeric"{numeric}>Digits only</option>
</select></label>
<label>Length<input type="number" name="captcha_length" value="{length}" min="1" max="{max}"></label>
</fieldset>
<button type="submit">Save settings</button>
</form>
</section>"#,
            site_name = e(&settings.site_name),
            base_url = e(&settings.base_url),
            enabled = checked(settings.captcha.enabled),
            alnum = selected(kind == CaptchaKind::Alphanumeric),
            numeric = selected(kind == CaptchaKind::Numeric),
            length = settings.captcha.length,
            max = MAX_CAPTCHA_LENGTH,
        ),
    )
}
