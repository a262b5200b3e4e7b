//! 传输模块
//!
//! 定义与翻译API交互的传输接口，并提供基于 reqwest 的默认实现。

use crate::error::Result;
use crate::types::{Endpoint, TranslationRequest, TransportResponse};
use async_trait::async_trait;
use reqwest::Client;

/// 传输接口
///
/// 执行一次 POST 请求交换。任何网络层面的失败都以
/// [`TranslationError::Connection`](crate::TranslationError::Connection) 返回，调用方不会重试。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, endpoint: &Endpoint, request: TranslationRequest) -> Result<TransportResponse>;
}

/// 基于 reqwest 的HTTP传输
///
/// 不启用自动解压，解释器能看到原始的 `Content-Encoding`。
/// 超时按每个请求设置，同时约束连接和读取阶段。
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .user_agent(concat!("WOVN.rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to create configured client: {}, using default", e);
                Client::new()
            });

        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, endpoint: &Endpoint, request: TranslationRequest) -> Result<TransportResponse> {
        let url = endpoint.url_for(&request.path);
        tracing::debug!(url = %url, bytes = request.body.len(), "POST translation request");

        let response = self
            .client
            .post(&url)
            .headers(request.headers)
            .body(request.body)
            .timeout(endpoint.timeout)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "translation response received");
        Ok(TransportResponse::new(status, headers, body))
    }
}
