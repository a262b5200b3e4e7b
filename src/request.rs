//! 请求构建模块
//!
//! 根据页面上下文、项目设置和HTML正文生成缓存键、请求路径和请求数据。

use crate::compress::form_escape;
use crate::error::{Result, TranslationError};
use crate::types::{md5_hex, PageContext, RequestPayload, TranslationSettings};
use chrono::{DateTime, Local};

/// 请求中携带的产品标识
pub const PRODUCT: &str = "WOVN.rs";

/// 请求中携带的产品版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 请求构建器
///
/// 只借用调用方提供的设置与上下文，不保存跨调用状态，可在多个任务中并行使用。
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    settings: &'a TranslationSettings,
    context: &'a PageContext,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(settings: &'a TranslationSettings, context: &'a PageContext) -> Self {
        Self { settings, context }
    }

    /// 生成缓存键
    ///
    /// 由 token、设置指纹、正文指纹、路径和语言组成；禁用缓存时追加当前时间戳，
    /// 保证每次请求的键都不同。
    pub fn cache_key(&self, body: &str) -> Result<String> {
        self.cache_key_at(body, Local::now())
    }

    /// 以给定时间生成缓存键，时间仅在禁用缓存时使用
    pub fn cache_key_at(&self, body: &str, now: DateTime<Local>) -> Result<String> {
        let mut components = vec![
            ("token", self.settings.project_token.clone()),
            ("settings_hash", self.settings.fingerprint()?),
            ("body_hash", md5_hex(body.as_bytes())),
            ("path", self.context.pathname.clone()),
            ("lang", self.context.lang_code.clone()),
        ];
        if self.context.disable_cache {
            components.push(("disableCache", now.format("%Y%m%d%H%M%S%9f").to_string()));
        }

        let joined = components
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        Ok(form_escape(&format!("({})", joined)))
    }

    /// 生成请求路径：`<api路径去掉结尾斜杠>/translation?cache_key=<缓存键>`
    pub fn request_path(&self, body: &str) -> Result<String> {
        let endpoint = self.settings.endpoint()?;
        let base = endpoint
            .base_path
            .strip_suffix('/')
            .unwrap_or(&endpoint.base_path);
        Ok(format!("{}/translation?cache_key={}", base, self.cache_key(body)?))
    }

    /// 生成请求数据
    pub fn payload(&self, body: &str) -> Result<RequestPayload> {
        let mut payload = RequestPayload::new();
        payload.insert("url", self.context.page_url());
        payload.insert("token", self.settings.project_token.as_str());
        payload.insert("lang_code", self.context.lang_code.as_str());
        payload.insert("url_pattern", self.settings.url_pattern.as_str());
        payload.insert("product", PRODUCT);
        payload.insert("version", VERSION);
        payload.insert("body", body);

        if self.context.debug_mode {
            payload.insert("debug_mode", "true");
            payload.insert("log_html", "true");
        }

        if !self.settings.custom_lang_aliases.is_empty() {
            let aliases = serde_json::to_string(&self.settings.custom_lang_aliases).map_err(|e| {
                TranslationError::Serialization(format!("custom_lang_aliases: {}", e))
            })?;
            payload.insert("custom_lang_aliases", aliases);
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use url::form_urlencoded;

    fn settings() -> TranslationSettings {
        TranslationSettings {
            project_token: "TOKEN".to_string(),
            api_url: "https://api.example.com/v0/".to_string(),
            ..TranslationSettings::default()
        }
    }

    fn context() -> PageContext {
        PageContext {
            protocol: "https".to_string(),
            url: "example.com/docs/".to_string(),
            pathname: "/docs/".to_string(),
            lang_code: "ja".to_string(),
            debug_mode: false,
            disable_cache: false,
        }
    }

    fn decode(key: &str) -> String {
        form_urlencoded::parse(format!("k={}", key).as_bytes())
            .next()
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        let s = settings();
        let c = context();
        let builder = RequestBuilder::new(&s, &c);
        assert_eq!(
            builder.cache_key("<html></html>").unwrap(),
            builder.cache_key("<html></html>").unwrap()
        );
    }

    #[test]
    fn test_cache_key_components() {
        let s = settings();
        let c = context();
        let key = RequestBuilder::new(&s, &c).cache_key("<html></html>").unwrap();

        assert!(key.starts_with("%28token%3DTOKEN%26settings_hash%3D"));
        assert!(key.ends_with("%29"));

        let expected = format!(
            "(token=TOKEN&settings_hash={}&body_hash={}&path=/docs/&lang=ja)",
            s.fingerprint().unwrap(),
            md5_hex(b"<html></html>")
        );
        assert_eq!(decode(&key), expected);
    }

    #[test]
    fn test_cache_key_depends_on_body_and_lang() {
        let s = settings();
        let c = context();
        let mut other = context();
        other.lang_code = "fr".to_string();

        let a = RequestBuilder::new(&s, &c).cache_key("a").unwrap();
        let b = RequestBuilder::new(&s, &c).cache_key("b").unwrap();
        let fr = RequestBuilder::new(&s, &other).cache_key("a").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, fr);
    }

    #[test]
    fn test_disabled_cache_appends_timestamp() {
        let s = settings();
        let mut c = context();
        c.disable_cache = true;
        let builder = RequestBuilder::new(&s, &c);

        let t1 = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        let t2 = t1 + chrono::Duration::nanoseconds(1);

        let k1 = builder.cache_key_at("body", t1).unwrap();
        let k2 = builder.cache_key_at("body", t2).unwrap();
        assert_ne!(k1, k2);
        assert!(decode(&k1).ends_with("&disableCache=20240301123045000000000)"));
    }

    #[test]
    fn test_disabled_cache_keys_differ_between_calls() {
        let s = settings();
        let mut c = context();
        c.disable_cache = true;
        let builder = RequestBuilder::new(&s, &c);

        let k1 = builder.cache_key("body").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let k2 = builder.cache_key("body").unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_cache_key_escapes_like_form_data() {
        let s = settings();
        let mut c = context();
        c.pathname = "/~a*b/".to_string();
        let key = RequestBuilder::new(&s, &c).cache_key("body").unwrap();

        assert!(key.contains("%26path%3D%2F~a%2Ab%2F%26lang%3Dja%29"));
        assert!(decode(&key).contains("&path=/~a*b/&lang=ja)"));
    }

    #[test]
    fn test_enabled_cache_has_no_timestamp() {
        let s = settings();
        let c = context();
        let key = RequestBuilder::new(&s, &c).cache_key("body").unwrap();
        assert!(!decode(&key).contains("disableCache"));
    }

    #[test]
    fn test_request_path_strips_trailing_slash() {
        let s = settings();
        let c = context();
        let builder = RequestBuilder::new(&s, &c);
        let path = builder.request_path("body").unwrap();
        assert_eq!(
            path,
            format!("/v0/translation?cache_key={}", builder.cache_key("body").unwrap())
        );

        let mut bare = settings();
        bare.api_url = "https://api.example.com".to_string();
        let path = RequestBuilder::new(&bare, &c).request_path("body").unwrap();
        assert!(path.starts_with("/translation?cache_key="));
    }

    #[test]
    fn test_payload_fields() {
        let s = settings();
        let c = context();
        let payload = RequestBuilder::new(&s, &c).payload("<p>hi</p>").unwrap();

        let keys: Vec<_> = payload.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["url", "token", "lang_code", "url_pattern", "product", "version", "body"]
        );
        assert_eq!(payload.get("url"), Some("https://example.com/docs/"));
        assert_eq!(payload.get("product"), Some(PRODUCT));
        assert_eq!(payload.get("url_pattern"), Some("query"));
        assert_eq!(payload.get("body"), Some("<p>hi</p>"));
        assert!(!payload.contains_key("debug_mode"));
        assert!(!payload.contains_key("custom_lang_aliases"));
    }

    #[test]
    fn test_payload_debug_and_aliases() {
        let mut s = settings();
        s.custom_lang_aliases.insert("ja".to_string(), "japanese".to_string());
        let mut c = context();
        c.debug_mode = true;

        let payload = RequestBuilder::new(&s, &c).payload("x").unwrap();
        assert_eq!(payload.get("debug_mode"), Some("true"));
        assert_eq!(payload.get("log_html"), Some("true"));
        assert_eq!(payload.get("custom_lang_aliases"), Some(r#"{"ja":"japanese"}"#));
    }
}
