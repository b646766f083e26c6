mod r#impl;
pub mod site_settings;
mod structs;

pub use r#impl::{get_config, init_config, init_config_from};
pub use site_settings::{
    CaptchaKind, CaptchaSettings, DEFAULT_SITE_NAME, MAX_CAPTCHA_LENGTH, SettingsUpdate, SiteSettings,
    SiteSettingsStore, init_site_settings, try_get_site_settings,
};
pub use structs::*;
