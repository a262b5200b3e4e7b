//! # WOVN Translator
//!
//! 把渲染完成的HTML页面发送到 WOVN.io 翻译API，成功时替换为译文，失败时原样返回。
//!
//! ## 处理流程
//!
//! - **请求构建**: 根据 token、设置指纹、正文指纹、路径和语言生成确定性的缓存键
//! - **压缩**: 表单编码后 gzip 压缩，附带 `Content-Length` 等请求头
//! - **传输**: 单次 POST，连接与读取共用一个超时，不重试
//! - **响应解释**: 按状态码和 `Content-Encoding` 分派，任何失败都回退为原始HTML
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use wovn_translator::{NoopDiagnostics, PageContext, TranslatorConfig, Translator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TranslatorConfig::load_from_default_locations();
//!     let context = PageContext {
//!         protocol: "https".to_string(),
//!         url: "example.com/about".to_string(),
//!         pathname: "/about".to_string(),
//!         lang_code: "ja".to_string(),
//!         ..PageContext::default()
//!     };
//!
//!     let translator = Translator::new();
//!     let html = translator
//!         .translate("<html>...</html>", &config.translation, &context, &NoopDiagnostics)
//!         .await;
//!     println!("{}", html);
//! }
//! ```
//!
//! ## 配置文件支持
//!
//! ```toml
//! [translation]
//! project_token = "YOUR_PROJECT_TOKEN"
//! api_url = "https://wovn.global.ssl.fastly.net/v0/"
//! api_timeout_seconds = 1.0
//! url_pattern = "query"
//! dev_mode = false
//!
//! [translation.custom_lang_aliases]
//! ja = "japanese"
//! ```

pub mod compress;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod interpreter;
pub mod request;
pub mod translator;
pub mod transport;
pub mod types;

pub use config::TranslatorConfig;
pub use diagnostics::{Diagnostics, ErrorReporter, HeaderCollector, NoopDiagnostics, TracingErrorReporter};
pub use error::{Result, TranslationError};
pub use interpreter::{ResponseInterpreter, ResponseKind};
pub use request::RequestBuilder;
pub use translator::{prepare_request, Translator};
pub use transport::{HttpTransport, Transport};
pub use types::{
    Endpoint, PageContext, RequestPayload, TranslationOutcome, TranslationRequest,
    TranslationSettings, TransportResponse,
};
