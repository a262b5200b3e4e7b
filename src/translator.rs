//! 翻译服务核心模块
//!
//! 把请求构建、压缩、传输和响应解释串联起来。每次调用相互独立，不保存跨请求状态；
//! 任何失败都回退为原始HTML。

use crate::compress::compress;
use crate::diagnostics::{Diagnostics, ErrorReporter, TracingErrorReporter};
use crate::error::Result;
use crate::interpreter::ResponseInterpreter;
use crate::request::RequestBuilder;
use crate::transport::{HttpTransport, Transport};
use crate::types::{Endpoint, PageContext, TranslationOutcome, TranslationRequest, TranslationSettings};
use std::sync::Arc;

/// 翻译服务主类
///
/// # 示例
///
/// ```rust,no_run
/// use wovn_translator::{HeaderCollector, PageContext, TranslationSettings, Translator};
///
/// #[tokio::main]
/// async fn main() {
///     let settings = TranslationSettings {
///         project_token: "TOKEN".to_string(),
///         ..TranslationSettings::default()
///     };
///     let context = PageContext {
///         protocol: "https".to_string(),
///         url: "example.com/".to_string(),
///         pathname: "/".to_string(),
///         lang_code: "ja".to_string(),
///         ..PageContext::default()
///     };
///
///     let translator = Translator::new();
///     let diagnostics = HeaderCollector::new();
///     let html = translator
///         .translate("<html><body>Hello</body></html>", &settings, &context, &diagnostics)
///         .await;
///     println!("{}", html);
/// }
/// ```
#[derive(Clone)]
pub struct Translator {
    transport: Arc<dyn Transport>,
    reporter: Arc<dyn ErrorReporter>,
}

impl Translator {
    /// 使用 reqwest 传输和 tracing 错误上报创建实例
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new())
    }

    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            reporter: Arc::new(TracingErrorReporter),
        }
    }

    pub fn with_reporter<R: ErrorReporter + 'static>(mut self, reporter: R) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// 翻译HTML正文
    ///
    /// 返回译文；连接失败、非成功状态、无效编码或响应内容不可用时原样返回 `body`。
    /// 该方法从不返回错误。
    pub async fn translate(
        &self,
        body: &str,
        settings: &TranslationSettings,
        context: &PageContext,
        diagnostics: &dyn Diagnostics,
    ) -> String {
        self.translate_outcome(body, settings, context, diagnostics)
            .await
            .into_body()
    }

    /// 与 [`translate`](Self::translate) 相同，但保留结果是否为译文的信息
    pub async fn translate_outcome(
        &self,
        body: &str,
        settings: &TranslationSettings,
        context: &PageContext,
        diagnostics: &dyn Diagnostics,
    ) -> TranslationOutcome {
        let (endpoint, request) = match prepare_request(body, settings, context) {
            Ok(prepared) => prepared,
            Err(e) => {
                diagnostics.trace(&format!("API request preparation failed: {}", e));
                self.reporter.report(&e);
                return TranslationOutcome::Fallback(body.to_string());
            }
        };

        tracing::debug!(
            lang = %context.lang_code,
            path = %context.pathname,
            bytes = request.body.len(),
            "sending page to translation API"
        );

        let result = self.transport.send(&endpoint, request).await;

        let interpreter = ResponseInterpreter::new(
            diagnostics,
            self.reporter.as_ref(),
            settings.dev_mode,
            context.debug_mode,
        );
        let outcome = interpreter.interpret(result, body);

        tracing::debug!(translated = outcome.is_translated(), "translation finished");
        outcome
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

/// 生成连接参数和压缩后的请求
pub fn prepare_request(
    body: &str,
    settings: &TranslationSettings,
    context: &PageContext,
) -> Result<(Endpoint, TranslationRequest)> {
    settings.validate()?;
    let endpoint = settings.endpoint()?;
    let builder = RequestBuilder::new(settings, context);
    let path = builder.request_path(body)?;
    let compressed = compress(&builder.payload(body)?)?;

    Ok((
        endpoint,
        TranslationRequest {
            path,
            headers: compressed.headers,
            body: compressed.body,
        },
    ))
}
