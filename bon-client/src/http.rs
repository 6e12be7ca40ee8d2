// bon-client/src/http.rs
// HTTP 客户端 - 网络通信

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::error::{ApiErrorBody, AppError, ErrorCategory, ErrorCode};

/// HTTP 客户端 trait
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T>;
    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn put<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T>;

    /// GET where any 2xx counts as success and the body is ignored
    async fn get_ok(&self, path: &str) -> ClientResult<()>;
    /// DELETE where any 2xx counts as success and the body is ignored
    async fn delete_ok(&self, path: &str) -> ClientResult<()>;
}

/// 网络 HTTP 客户端
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// 非 2xx 转换为错误, 成功时返回原始 body
    async fn check_status(response: reqwest::Response) -> ClientResult<String> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        tracing::debug!(status = %status, body = %text, "API request failed");
        // 尝试解析为 API 错误响应
        let body = ApiErrorBody::parse(&text);

        // 404 优先于业务码
        if status == StatusCode::NOT_FOUND {
            let message = body.and_then(|b| b.message).unwrap_or(text);
            return Err(ClientError::NotFound(message));
        }

        if let Some(ApiErrorBody {
            code: Some(code),
            message: Some(message),
        }) = body.clone()
        {
            tracing::debug!(
                code,
                category = ErrorCategory::from_code(code).name(),
                "API returned coded error"
            );
            return Err(ClientError::Api { code, message });
        }
        // 无业务码时按 HTTP 状态归类
        let message = body.and_then(|b| b.message).unwrap_or(text);
        let code = ErrorCode::from_http_status(status);
        Err(AppError::with_message(code, message).into())
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let text = Self::check_status(response).await?;

        // DELETE 等接口可能返回空 body
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| {
            ClientError::InvalidResponse(format!("unexpected response body: {e}"))
        })
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        self.handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        self.handle_response(response).await
    }

    async fn put<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        self.handle_response(response).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.delete(self.url(path)).send().await?;
        self.handle_response(response).await
    }

    async fn get_ok(&self, path: &str) -> ClientResult<()> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::check_status(response).await.map(drop)
    }

    async fn delete_ok(&self, path: &str) -> ClientResult<()> {
        let response = self.client.delete(self.url(path)).send().await?;
        Self::check_status(response).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client =
            NetworkHttpClient::new(&ClientConfig::new("http://localhost:5000/api/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.url("/order/42"), "http://localhost:5000/api/order/42");
        assert_eq!(client.url("drink/all"), "http://localhost:5000/api/drink/all");
    }
}
