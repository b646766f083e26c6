//! 站点设置（JSON 覆盖文件 + 默认值）
//!
//! 与静态配置不同，这些设置可以在管理后台修改，写回 JSON 文件后立即生效。
//! 文件中缺失的字段使用默认值，未知字段在写回时原样保留。

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{AppError, Result};

pub const DEFAULT_SITE_NAME: &str = "Short URL Manager";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_CAPTCHA_LENGTH: usize = 4;
pub const MAX_CAPTCHA_LENGTH: usize = 8;

/// 验证码字符集
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptchaKind {
    #[default]
    Alphanumeric,
    Numeric,
}

impl CaptchaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptchaKind::Alphanumeric => "alphanumeric",
            CaptchaKind::Numeric => "numeric",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "alphanumeric" => Some(CaptchaKind::Alphanumeric),
            "numeric" => Some(CaptchaKind::Numeric),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaSettings {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: CaptchaKind,
    pub length: usize,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for CaptchaSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: CaptchaKind::default(),
            length: DEFAULT_CAPTCHA_LENGTH,
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteSettings {
    pub site_name: String,
    pub base_url: String,
    pub captcha: CaptchaSettings,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            captcha: CaptchaSettings::default(),
            extra: serde_json::Map::new(),
        }
    }
}

impl SiteSettings {
    /// base_url 的主机名（小写），解析失败时返回 localhost
    pub fn base_host(&self) -> String {
        url::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
            .unwrap_or_else(|| "localhost".to_string())
    }

    /// 短链接的展示地址
    pub fn short_link(&self, host: &str, code: &str) -> String {
        let scheme = url::Url::parse(&self.base_url)
            .map(|u| u.scheme().to_string())
            .unwrap_or_else(|_| "http".to_string());
        if host.eq_ignore_ascii_case(&self.base_host()) {
            format!("{}/{}", self.base_url.trim_end_matches('/'), code)
        } else {
            format!("{}://{}/{}", scheme, host, code)
        }
    }
}

/// 管理后台提交的设置
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub site_name: Option<String>,
    pub base_url: Option<String>,
    pub captcha_enabled: bool,
    pub captcha_type: Option<String>,
    pub captcha_length: Option<String>,
}

/// 站点设置存储：内存中的 ArcSwap + 磁盘上的 JSON 文件
#[derive(Debug)]
pub struct SiteSettingsStore {
    path: PathBuf,
    current: ArcSwap<SiteSettings>,
}

impl SiteSettingsStore {
    /// 从文件加载，文件不存在或无法解析时使用默认值
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let settings = Self::read_file(&path).unwrap_or_default();
        Self {
            path,
            current: ArcSwap::from_pointee(settings),
        }
    }

    fn read_file(path: &Path) -> Option<SiteSettings> {
        if !path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read settings file {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<SiteSettings>(&content) {
            Ok(s) => {
                info!("Site settings loaded from {}", path.display());
                Some(s)
            }
            Err(e) => {
                warn!(
                    "Invalid settings file {}, using defaults: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Arc<SiteSettings> {
        self.current.load_full()
    }

    /// 合并表单提交，写回文件后再替换内存中的设置
    pub fn update(&self, update: SettingsUpdate) -> Result<Arc<SiteSettings>> {
        let current = self.get();
        let mut next = (*current).clone();

        if let Some(name) = update.site_name.map(|s| s.trim().to_string())
            && !name.is_empty()
        {
            next.site_name = name;
        }

        if let Some(base) = update.base_url.map(|s| s.trim().to_string())
            && !base.is_empty()
        {
            crate::utils::url_validator::validate_url(&base)
                .map_err(|e| AppError::validation(format!("Invalid base URL: {}", e)))?;
            next.base_url = base.trim_end_matches('/').to_string();
        }

        next.captcha.enabled = update.captcha_enabled;

        if let Some(kind) = update.captcha_type.as_deref().filter(|s| !s.trim().is_empty()) {
            next.captcha.kind = CaptchaKind::parse(kind)
                .ok_or_else(|| AppError::validation(format!("Unknown CAPTCHA type: {}", kind)))?;
        }

        if let Some(length) = update
            .captcha_length
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            if length > MAX_CAPTCHA_LENGTH {
                return Err(AppError::validation(format!(
                    "CAPTCHA length must be between 1 and {}",
                    MAX_CAPTCHA_LENGTH
                )));
            }
            next.captcha.length = length;
        }

        self.write_file(&next)?;
        let next = Arc::new(next);
        self.current.store(next.clone());
        info!("Site settings updated and reloaded");
        Ok(next)
    }

    fn write_file(&self, settings: &SiteSettings) -> Result<()> {
        // 保留文件中已有但当前结构不认识的字段
        let mut value = serde_json::to_value(settings)?;
        if let Some(on_disk) = self.read_raw()
            && let (Some(target), serde_json::Value::Object(source)) =
                (value.as_object_mut(), on_disk)
        {
            for (key, v) in source {
                target.entry(key).or_insert(v);
            }
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&value)?;
        std::fs::write(&self.path, content).map_err(|e| {
            AppError::file_operation(format!(
                "Failed to write settings file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn read_raw(&self) -> Option<serde_json::Value> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }
}

static SITE_SETTINGS: OnceLock<Arc<SiteSettingsStore>> = OnceLock::new();

/// 初始化全局站点设置；重复调用返回第一次初始化的实例
pub fn init_site_settings<P: AsRef<Path>>(path: P) -> Arc<SiteSettingsStore> {
    SITE_SETTINGS
        .get_or_init(|| Arc::new(SiteSettingsStore::load(path)))
        .clone()
}

/// 错误页等无法拿到 app data 的地方使用
pub fn try_get_site_settings() -> Option<Arc<SiteSettings>> {
    SITE_SETTINGS.get().map(|store| store.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SiteSettingsStore::load(dir.path().join("config.json"));
        let s = store.get();
        assert_eq!(s.site_name, DEFAULT_SITE_NAME);
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert!(s.captcha.enabled);
        assert_eq!(s.captcha.length, 4);
        assert_eq!(s.base_host(), "localhost");
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"siteName":"Links","captcha":{"length":6},"dbPath":"/tmp/x.db"}"#,
        )
        .unwrap();

        let store = SiteSettingsStore::load(&path);
        let s = store.get();
        assert_eq!(s.site_name, "Links");
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert!(s.captcha.enabled);
        assert_eq!(s.captcha.kind, CaptchaKind::Alphanumeric);
        assert_eq!(s.captcha.length, 6);
        assert!(s.extra.contains_key("dbPath"));
    }

    #[test]
    fn test_invalid_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = SiteSettingsStore::load(&path);
        assert_eq!(store.get().site_name, DEFAULT_SITE_NAME);
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"custom":{"keep":true}}"#).unwrap();
        let store = SiteSettingsStore::load(&path);

        let updated = store
            .update(SettingsUpdate {
                site_name: Some("My Links".into()),
                base_url: Some("https://s.example.com/".into()),
                captcha_enabled: false,
                captcha_type: Some("numeric".into()),
                captcha_length: Some("5".into()),
            })
            .unwrap();

        assert_eq!(updated.site_name, "My Links");
        assert_eq!(updated.base_url, "https://s.example.com");
        assert_eq!(store.get().base_host(), "s.example.com");
        assert!(!store.get().captcha.enabled);

        let reloaded = SiteSettingsStore::load(&path).get();
        assert_eq!(reloaded.site_name, "My Links");
        assert_eq!(reloaded.captcha.kind, CaptchaKind::Numeric);
        assert_eq!(reloaded.captcha.length, 5);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["custom"]["keep"], serde_json::Value::Bool(true));
        assert_eq!(raw["captcha"]["type"], "numeric");
    }

    #[test]
    fn test_update_blank_fields_keep_current_values() {
        let dir = TempDir::new().unwrap();
        let store = SiteSettingsStore::load(dir.path().join("config.json"));

        let updated = store
            .update(SettingsUpdate {
                site_name: Some("   ".into()),
                captcha_enabled: true,
                captcha_length: Some("abc".into()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(updated.site_name, DEFAULT_SITE_NAME);
        assert_eq!(updated.captcha.length, DEFAULT_CAPTCHA_LENGTH);
    }

    #[test]
    fn test_update_rejects_bad_values() {
        let dir = TempDir::new().unwrap();
        let store = SiteSettingsStore::load(dir.path().join("config.json"));

        let bad_url = store.update(SettingsUpdate {
            base_url: Some("javascript:alert(1)".into()),
            captcha_enabled: true,
            ..Default::default()
        });
        assert!(matches!(bad_url, Err(AppError::Validation(_))));

        let bad_type = store.update(SettingsUpdate {
            captcha_type: Some("emoji".into()),
            captcha_enabled: true,
            ..Default::default()
        });
        assert!(matches!(bad_type, Err(AppError::Validation(_))));

        // 失败的更新不落盘
        assert!(!store.path().exists());
    }

    #[test]
    fn test_short_link() {
        let s = SiteSettings {
            base_url: "https://s.example.com".into(),
            ..Default::default()
        };
        assert_eq!(s.short_link("s.example.com", "abc"), "https://s.example.com/abc");
        assert_eq!(s.short_link("go.example.org", "abc"), "https://go.example.org/abc");
    }
}
