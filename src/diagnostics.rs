//! 诊断模块
//!
//! 调用方注入的协作者：记录每个请求的跟踪信息、注册需要回传给浏览器的诊断响应头，
//! 以及上报异常情况。

use crate::error::TranslationError;
use std::sync::Mutex;

/// 单个请求的诊断接收端
pub trait Diagnostics: Send + Sync {
    /// 记录一条跟踪信息
    fn trace(&self, message: &str);

    /// 注册一个需要附加到页面响应上的诊断头
    fn register_header(&self, name: &str, value: &str);
}

/// 异常情况上报接口
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &TranslationError);
}

/// Discards every trace and header.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn trace(&self, _message: &str) {}

    fn register_header(&self, _name: &str, _value: &str) {}
}

/// 收集跟踪信息和诊断头，供调用方在渲染完成后写回响应
#[derive(Debug, Default)]
pub struct HeaderCollector {
    traces: Mutex<Vec<String>>,
    headers: Mutex<Vec<(String, String)>>,
}

impl HeaderCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traces(&self) -> Vec<String> {
        self.traces.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        self.headers.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers()
            .into_iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

impl Diagnostics for HeaderCollector {
    fn trace(&self, message: &str) {
        tracing::debug!(target: "wovn_translator::trace", "{}", message);
        if let Ok(mut traces) = self.traces.lock() {
            traces.push(message.to_string());
        }
    }

    fn register_header(&self, name: &str, value: &str) {
        if let Ok(mut headers) = self.headers.lock() {
            headers.push((name.to_string(), value.to_string()));
        }
    }
}

/// 默认的错误上报实现，通过 `tracing::error!` 输出
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, error: &TranslationError) {
        match error {
            TranslationError::Connection(message) => {
                tracing::error!("\"{}\" error occurred when contacting WOVNio translation API", message)
            }
            TranslationError::UnsuccessfulResponse { status, message } => {
                tracing::error!(status = *status, "Received \"{}\" from WOVNio translation API.", message)
            }
            TranslationError::InvalidEncoding(encoding) => {
                tracing::error!("Received invalid content (\"{}\") from WOVNio translation API.", encoding)
            }
            TranslationError::MalformedPayload(detail) => {
                tracing::warn!("Received malformed payload from WOVNio translation API: {}", detail)
            }
            other => tracing::error!("WOVNio translation failed: {}", other),
        }
    }
}
