use reqwest::{Client, Response};
use std::time::Duration;

/// HTTP 客户端包装器
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// 创建带自定义超时的 HTTP 客户端
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("bioprov/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("创建 HTTP 客户端失败: {}", e))?;

        Ok(Self { client })
    }

    /// HEAD 请求（连通性探测）
    pub async fn head(&self, url: &str) -> Result<Response, String> {
        self.client
            .head(url)
            .send()
            .await
            .map_err(|e| format!("请求失败: {} (URL: {})", e, url))
    }

}
