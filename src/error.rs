//! 错误处理模块
//!
//! 定义翻译客户端中使用的错误类型。所有错误在 [`Translator::translate`](crate::Translator::translate)
//! 中都会被收敛为回退（返回原始 HTML），不会抛给调用方。

use thiserror::Error;

/// 翻译错误类型
///
/// # 变体说明
///
/// * `Connection` - 无法完成与翻译API的交互（超时、拒绝连接、DNS等）
/// * `UnsuccessfulResponse` - API返回了非成功状态码
/// * `InvalidEncoding` - 成功响应但 content-encoding 不受支持（非 dev 模式）
/// * `MalformedPayload` - 响应体无法解析，或缺少 `body` 字段
/// * `Config` - 配置无效
/// * `Io` - 压缩/解压或文件读写错误
/// * `Serialization` - JSON/TOML 序列化错误
#[derive(Debug, Error)]
pub enum TranslationError {
    /// 连接失败
    #[error("{0}")]
    Connection(String),
    /// 非成功响应
    #[error("API responded with status {status}: {message}")]
    UnsuccessfulResponse {
        /// HTTP状态码
        status: u16,
        /// 状态描述
        message: String,
    },
    /// 无效的内容编码
    #[error("invalid content encoding: {0}")]
    InvalidEncoding(String),
    /// 响应内容无法使用
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    /// 配置错误
    #[error("configuration error: {0}")]
    Config(String),
    /// IO错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::Connection(format!("request timed out: {}", error))
        } else {
            TranslationError::Connection(error.to_string())
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for TranslationError {
    fn from(error: toml::ser::Error) -> Self {
        TranslationError::Serialization(error.to_string())
    }
}

/// 翻译结果类型别名
///
/// ```rust
/// use wovn_translator::{Result, TranslationError};
///
/// fn example_function() -> Result<String> {
///     Err(TranslationError::Config("missing token".to_string()))
/// }
///
/// assert!(example_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, TranslationError>;
