use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::AppError;

/// Response relayed from the external crawler service.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: u16,
    pub body: Value,
}

/// Client boundary for the external crawler job service. The dashboard never
/// implements crawling itself; it only relays requests.
#[async_trait]
pub trait CrawlerClient: Send + Sync {
    async fn forward(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<ProxyResponse, AppError>;
}

pub struct HttpCrawlerClient {
    client: Client,
    base_url: String,
}

impl HttpCrawlerClient {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Upstream(format!("failed to build http client: {e}")))?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl CrawlerClient for HttpCrawlerClient {
    async fn forward(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<ProxyResponse, AppError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let method = reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|_| AppError::BadRequest(format!("unsupported method: {method}")))?;

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .json::<Value>()
            .await
            .unwrap_or(Value::Null);

        Ok(ProxyResponse { status, body })
    }
}

/// Crawler client that relays nothing; used in tests.
pub struct NoopCrawlerClient;

#[async_trait]
impl CrawlerClient for NoopCrawlerClient {
    async fn forward(
        &self,
        _method: &str,
        path: &str,
        _body: Option<Value>,
    ) -> Result<ProxyResponse, AppError> {
        Ok(ProxyResponse {
            status: 200,
            body: serde_json::json!({ "proxied": path }),
        })
    }
}
