//! 类型定义模块
//!
//! 定义翻译客户端中使用的所有数据结构：项目设置、页面上下文、请求与响应、翻译结果。

use crate::error::{Result, TranslationError};
use md5::{Digest, Md5};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// 默认的翻译API地址
pub const DEFAULT_API_URL: &str = "https://wovn.global.ssl.fastly.net/v0/";

/// 项目设置
///
/// 由外部持有，在一次 translate 调用期间只读。
///
/// # 字段说明
///
/// * `project_token` - 项目令牌
/// * `api_url` - 翻译API基础地址
/// * `api_timeout_seconds` - 连接与读取共用的超时时间（秒）
/// * `url_pattern` - 语言在URL中的表示方式（`query`、`path`、`subdomain`）
/// * `custom_lang_aliases` - 自定义语言别名，例如 `ja => japanese`
/// * `dev_mode` - 开发模式，允许未压缩的响应
/// * `extra` - 其余设置项，参与设置指纹计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub project_token: String,
    pub api_url: String,
    pub api_timeout_seconds: f64,
    pub url_pattern: String,
    pub custom_lang_aliases: BTreeMap<String, String>,
    pub dev_mode: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            project_token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            api_timeout_seconds: 1.0,
            url_pattern: "query".to_string(),
            custom_lang_aliases: BTreeMap::new(),
            dev_mode: false,
            extra: Map::new(),
        }
    }
}

impl TranslationSettings {
    /// 计算设置指纹
    ///
    /// 对整个设置结构做规范化JSON序列化（对象键按字典序排列），再取MD5十六进制摘要。
    /// 相同的设置总是得到相同的指纹，与字段插入顺序无关。
    pub fn fingerprint(&self) -> Result<String> {
        let value = serde_json::to_value(self)?;
        let canonical = serde_json::to_string(&canonicalize(value))?;
        Ok(md5_hex(canonical.as_bytes()))
    }

    /// Parse `api_url` and derive the transport endpoint.
    pub fn endpoint(&self) -> Result<Endpoint> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| TranslationError::Config(format!("invalid api_url {:?}: {}", self.api_url, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| TranslationError::Config(format!("api_url {:?} has no host", self.api_url)))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| TranslationError::Config(format!("api_url {:?} has no port", self.api_url)))?;

        Ok(Endpoint {
            scheme: url.scheme().to_string(),
            host,
            port,
            base_path: url.path().to_string(),
            timeout: self.timeout()?,
        })
    }

    pub fn timeout(&self) -> Result<Duration> {
        if !(self.api_timeout_seconds.is_finite() && self.api_timeout_seconds > 0.0) {
            return Err(TranslationError::Config(format!(
                "api_timeout_seconds must be a positive number, got {}",
                self.api_timeout_seconds
            )));
        }
        Duration::try_from_secs_f64(self.api_timeout_seconds)
            .map_err(|e| TranslationError::Config(format!("invalid api_timeout_seconds: {}", e)))
    }

    /// 校验设置是否可用于发起请求
    pub fn validate(&self) -> Result<()> {
        if self.project_token.trim().is_empty() {
            return Err(TranslationError::Config("project_token must not be empty".to_string()));
        }
        self.endpoint()?;
        Ok(())
    }
}

/// 递归重建JSON值，使所有对象的键按字典序插入。
///
/// 即使 serde_json 启用了 `preserve_order`，输出顺序也保持稳定。
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

pub(crate) fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}

/// 页面上下文
///
/// 每个请求新建一次，只读。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// 协议，例如 `https`
    pub protocol: String,
    /// 主机加路径，不含协议，例如 `example.com/about?lang=ja`
    pub url: String,
    /// 规范化后的路径名（保留原有的结尾斜杠）
    pub pathname: String,
    /// 请求的目标语言代码
    pub lang_code: String,
    pub debug_mode: bool,
    pub disable_cache: bool,
}

impl PageContext {
    pub fn page_url(&self) -> String {
        format!("{}://{}", self.protocol, self.url)
    }
}

/// 翻译API的连接参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// `api_url` 的路径部分，例如 `/v0/`
    pub base_path: String,
    /// 连接和读取阶段共用的超时
    pub timeout: Duration,
}

impl Endpoint {
    /// Absolute URL for a request path such as `/v0/translation?cache_key=...`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, path)
    }
}

/// 请求数据
///
/// 保留插入顺序的键值对集合。键不存在表示对应功能未启用（与空字符串不同）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPayload {
    entries: Vec<(String, String)>,
}

impl RequestPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入键值对；已存在的键会被覆盖并保持原位置
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for RequestPayload {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut payload = RequestPayload::new();
        for (k, v) in iter {
            payload.insert(k, v);
        }
        payload
    }
}

/// 发往翻译API的请求，在一次调用内创建并由传输层消费
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// 请求路径，含 `cache_key` 查询参数
    pub path: String,
    pub headers: HeaderMap,
    /// gzip 压缩后的请求体
    pub body: Vec<u8>,
}

/// 传输层返回的响应
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self { status, headers, body }
    }

    /// 读取响应头，非 UTF-8 的值视为不存在
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.header(reqwest::header::CONTENT_ENCODING.as_str())
    }

    /// 状态描述，例如 `Internal Server Error`
    pub fn message(&self) -> String {
        self.status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string()
    }
}

/// 一次翻译调用的结果：译文或原始HTML，二者必居其一
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Translated(String),
    Fallback(String),
}

impl TranslationOutcome {
    pub fn is_translated(&self) -> bool {
        matches!(self, TranslationOutcome::Translated(_))
    }

    pub fn into_body(self) -> String {
        match self {
            TranslationOutcome::Translated(body) | TranslationOutcome::Fallback(body) => body,
        }
    }
}
