//! 配置管理模块
//!
//! 提供TOML配置文件的读取、写入和自动发现功能。

use crate::error::Result;
use crate::types::TranslationSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// 配置文件的默认查找位置
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = ["wovn.toml", "translation-config.toml", ".wovn.toml"];

/// 翻译客户端配置结构
///
/// # 示例
///
/// ```rust,no_run
/// use wovn_translator::TranslatorConfig;
///
/// // 从默认位置加载配置
/// let config = TranslatorConfig::load_from_default_locations();
///
/// // 从指定文件加载配置
/// let config = TranslatorConfig::from_file("wovn.toml").unwrap();
///
/// // 保存配置到文件
/// config.save_to_file("output.toml").unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// 项目设置
    #[serde(default)]
    pub translation: TranslationSettings,
}

impl TranslatorConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to TOML file
    ///
    /// TOML has no null, so null entries in `extra` are left out of the file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writable = self.clone();
        writable.translation.extra = writable
            .translation
            .extra
            .into_iter()
            .filter_map(|(k, v)| without_nulls(v).map(|v| (k, v)))
            .collect();
        let content = toml::to_string_pretty(&writable)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from multiple possible locations
    pub fn load_from_default_locations() -> Self {
        Self::load_from_locations(&DEFAULT_CONFIG_PATHS)
    }

    /// 依次尝试给定路径，返回第一个可成功解析的配置，否则返回默认配置
    pub fn load_from_locations<P: AsRef<Path>>(paths: &[P]) -> Self {
        for path in paths {
            let path = path.as_ref();
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from: {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Self::default()
    }

    /// Generate example configuration file
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let example_config = Self {
            translation: TranslationSettings {
                project_token: "YOUR_PROJECT_TOKEN".to_string(),
                ..TranslationSettings::default()
            },
        };
        example_config.save_to_file(path)
    }
}

fn without_nulls(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => Some(Value::Object(
            map.into_iter()
                .filter_map(|(k, v)| without_nulls(v).map(|v| (k, v)))
                .collect(),
        )),
        Value::Array(items) => Some(Value::Array(items.into_iter().filter_map(without_nulls).collect())),
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslationError;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wovn-translator-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_full_config() {
        let config = TranslatorConfig::from_toml_str(
            r#"
            [translation]
            project_token = "abc123"
            api_url = "http://localhost:3001/v0/"
            api_timeout_seconds = 2.0
            url_pattern = "path"
            dev_mode = true
            default_lang = "en"

            [translation.custom_lang_aliases]
            ja = "japanese"
            "#,
        )
        .unwrap();

        let s = &config.translation;
        assert_eq!(s.project_token, "abc123");
        assert_eq!(s.api_timeout_seconds, 2.0);
        assert_eq!(s.url_pattern, "path");
        assert!(s.dev_mode);
        assert_eq!(s.custom_lang_aliases.get("ja").map(String::as_str), Some("japanese"));
        assert_eq!(s.extra.get("default_lang"), Some(&serde_json::json!("en")));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = TranslatorConfig::from_toml_str("[translation]\nproject_token = \"t\"\n").unwrap();
        assert_eq!(config.translation.api_url, crate::types::DEFAULT_API_URL);
        assert_eq!(config.translation.api_timeout_seconds, 1.0);
        assert!(!config.translation.dev_mode);

        assert_eq!(TranslatorConfig::from_toml_str("").unwrap(), TranslatorConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_serialization_error() {
        assert!(matches!(
            TranslatorConfig::from_toml_str("[translation\n"),
            Err(TranslationError::Serialization(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_path("roundtrip.toml");
        TranslatorConfig::generate_example_config(&path).unwrap();

        let loaded = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.translation.project_token, "YOUR_PROJECT_TOKEN");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_skips_null_extra_entries() {
        let path = temp_path("nulls.toml");
        let mut config = TranslatorConfig::default();
        config.translation.project_token = "t".to_string();
        config.translation.extra.insert("opt".to_string(), Value::Null);
        config
            .translation
            .extra
            .insert("nested".to_string(), serde_json::json!({"keep": 1, "drop": null, "list": [1, null]}));

        config.save_to_file(&path).unwrap();
        let loaded = TranslatorConfig::from_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert!(!loaded.translation.extra.contains_key("opt"));
        assert_eq!(
            loaded.translation.extra.get("nested"),
            Some(&serde_json::json!({"keep": 1, "list": [1]}))
        );
        assert_eq!(loaded.translation.project_token, "t");
    }

    #[test]
    fn test_load_from_locations_falls_back_to_default() {
        let broken = temp_path("broken.toml");
        fs::write(&broken, "not = [valid").unwrap();

        let config = TranslatorConfig::load_from_locations(&[temp_path("missing.toml"), broken.clone()]);
        assert_eq!(config, TranslatorConfig::default());
        let _ = fs::remove_file(&broken);
    }
}
