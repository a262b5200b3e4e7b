//! 压缩模块
//!
//! 将请求数据编码为 `key=value&...` 表单格式并 gzip 压缩，同时生成对应的请求头。

use crate::error::{Result, TranslationError};
use crate::types::RequestPayload;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use std::io::{Read, Write};
use url::form_urlencoded;

/// 压缩后的请求体及其请求头
#[derive(Debug, Clone)]
pub struct CompressedPayload {
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// 表单转义保留的字符：字母数字与 `-._~`，空格另行转为 `+`
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// 表单转义：除字母数字与 `-._~` 外全部百分号编码，空格写作 `+`
pub fn form_escape(value: &str) -> String {
    utf8_percent_encode(value, FORM_ENCODE_SET)
        .to_string()
        .replace("%20", "+")
}

/// Percent-encode every value and join the pairs as `key=value&...`.
pub fn encode_form(payload: &RequestPayload) -> String {
    payload
        .iter()
        .map(|(key, value)| format!("{}={}", key, form_escape(value)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// 压缩请求数据
///
/// 请求头声明接受 gzip，内容类型为 `application/octet-stream`，
/// `Content-Length` 等于压缩后的字节数。
pub fn compress(payload: &RequestPayload) -> Result<CompressedPayload> {
    let body = gzip(encode_form(payload).as_bytes())?;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

    Ok(CompressedPayload { headers, body })
}

/// 解压并解码请求体，得到原始键值对
pub fn decompress(body: &[u8]) -> Result<RequestPayload> {
    let raw = gunzip(body)?;
    let form = String::from_utf8(raw)
        .map_err(|e| TranslationError::MalformedPayload(format!("request body is not UTF-8: {}", e)))?;

    Ok(form_urlencoded::parse(form.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}
