//! 响应解释模块
//!
//! 先把传输结果归类为 [`ResponseKind`]，再在一个有序的 match 中决定返回译文还是原始HTML。

use crate::compress::gunzip;
use crate::diagnostics::{Diagnostics, ErrorReporter};
use crate::error::{Result, TranslationError};
use crate::types::{TranslationOutcome, TransportResponse};

/// 调试模式下回传的诊断头：(注册名, 响应头名)
pub const DIAGNOSTIC_HEADERS: [(&str, &str); 3] = [
    ("X-Wovn-Cache", "x-cache"),
    ("X-Wovn-Cache-Hits", "x-cache-hits"),
    ("X-Wovn-Surrogate-Key", "x-wovn-surrogate-key"),
];

/// 传输结果的分类
#[derive(Debug)]
pub enum ResponseKind<'a> {
    /// 传输层失败
    TransportError(&'a TranslationError),
    /// 非 2xx 状态
    NonSuccess(&'a TransportResponse),
    /// 成功且响应体为 gzip
    SuccessGzip(&'a [u8]),
    /// 成功、未压缩，处于 dev 模式
    SuccessRaw(&'a [u8]),
    /// 成功但编码不受支持
    InvalidEncoding(String),
}

/// 按固定顺序归类：传输错误、非成功状态、gzip、dev 模式原文、无效编码
pub fn classify(result: &Result<TransportResponse>, dev_mode: bool) -> ResponseKind<'_> {
    let response = match result {
        Err(e) => return ResponseKind::TransportError(e),
        Ok(response) => response,
    };

    let encoding = response.content_encoding();
    match (response.status.is_success(), encoding) {
        (false, _) => ResponseKind::NonSuccess(response),
        (true, Some(enc)) if enc.trim().eq_ignore_ascii_case("gzip") => {
            ResponseKind::SuccessGzip(&response.body)
        }
        (true, _) if dev_mode => ResponseKind::SuccessRaw(&response.body),
        (true, enc) => ResponseKind::InvalidEncoding(enc.unwrap_or_default().to_string()),
    }
}

/// 从JSON响应中取出 `body` 字段，只接受字符串
pub fn extract_body(json: &[u8]) -> Result<String> {
    let value: serde_json::Value = serde_json::from_slice(json)
        .map_err(|e| TranslationError::MalformedPayload(format!("response is not valid JSON: {}", e)))?;

    match value.get("body") {
        Some(serde_json::Value::String(body)) => Ok(body.clone()),
        Some(serde_json::Value::Null) | None => {
            Err(TranslationError::MalformedPayload("response has no body field".to_string()))
        }
        Some(other) => Err(TranslationError::MalformedPayload(format!(
            "response body field is not a string: {}",
            other
        ))),
    }
}

fn extract_gzip_body(data: &[u8]) -> Result<String> {
    let json = gunzip(data)
        .map_err(|e| TranslationError::MalformedPayload(format!("failed to decompress response: {}", e)))?;
    extract_body(&json)
}

/// 响应解释器
pub struct ResponseInterpreter<'a> {
    diagnostics: &'a dyn Diagnostics,
    reporter: &'a dyn ErrorReporter,
    dev_mode: bool,
    debug_mode: bool,
}

impl<'a> ResponseInterpreter<'a> {
    pub fn new(
        diagnostics: &'a dyn Diagnostics,
        reporter: &'a dyn ErrorReporter,
        dev_mode: bool,
        debug_mode: bool,
    ) -> Self {
        Self {
            diagnostics,
            reporter,
            dev_mode,
            debug_mode,
        }
    }

    /// 解释传输结果；任何失败都回退为 `original`
    pub fn interpret(&self, result: Result<TransportResponse>, original: &str) -> TranslationOutcome {
        if let Ok(response) = &result {
            self.diagnostics.trace("API connection established");
            if self.debug_mode {
                self.register_diagnostic_headers(response);
            }
        }

        let extracted = match classify(&result, self.dev_mode) {
            ResponseKind::TransportError(e) => {
                self.diagnostics.trace(&format!("API connection failure: {}", e));
                self.reporter.report(e);
                return TranslationOutcome::Fallback(original.to_string());
            }
            ResponseKind::NonSuccess(response) => {
                self.diagnostics.trace(&format!(
                    "API response unsuccessful: status {}",
                    response.status.as_u16()
                ));
                self.reporter.report(&TranslationError::UnsuccessfulResponse {
                    status: response.status.as_u16(),
                    message: response.message(),
                });
                return TranslationOutcome::Fallback(original.to_string());
            }
            ResponseKind::InvalidEncoding(encoding) => {
                self.trace_success(&result);
                self.diagnostics
                    .trace(&format!("API response content-encoding invalid: {}", encoding));
                self.reporter.report(&TranslationError::InvalidEncoding(encoding));
                return TranslationOutcome::Fallback(original.to_string());
            }
            ResponseKind::SuccessGzip(data) => {
                self.trace_success(&result);
                extract_gzip_body(data)
            }
            ResponseKind::SuccessRaw(data) => {
                self.trace_success(&result);
                extract_body(data)
            }
        };

        match extracted {
            Ok(body) => TranslationOutcome::Translated(body),
            Err(e) => {
                self.diagnostics.trace(&format!("API response body unusable: {}", e));
                self.reporter.report(&e);
                TranslationOutcome::Fallback(original.to_string())
            }
        }
    }

    fn trace_success(&self, result: &Result<TransportResponse>) {
        if let Ok(response) = result {
            self.diagnostics.trace(&format!(
                "API response successful: status {}",
                response.status.as_u16()
            ));
        }
    }

    fn register_diagnostic_headers(&self, response: &TransportResponse) {
        for (name, source) in DIAGNOSTIC_HEADERS {
            if let Some(value) = response.header(source) {
                self.diagnostics.register_header(name, value);
            }
        }
    }
}
