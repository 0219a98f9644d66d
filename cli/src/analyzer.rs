use anyhow::{Context, Result};

use platewise_core::analysis::{
    CompletionResponse, FoodImageAnalyzer, build_request, parse_completion,
};
use platewise_core::models::FoodAnalysis;

/// HTTP client for the hosted LLM completion endpoint.
pub struct LlmAnalyzerClient {
    client: reqwest::Client,
    url: String,
    rt: tokio::runtime::Handle,
}

impl LlmAnalyzerClient {
    pub fn new(url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "platewise-cli/{} (nutrition tracker)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
            rt: tokio::runtime::Handle::current(),
        })
    }

    pub async fn analyze_async(&self, image_base64: &str) -> Result<FoodAnalysis> {
        tracing::debug!(url = %self.url, bytes = image_base64.len(), "sending analysis request");
        let resp = self
            .client
            .post(&self.url)
            .json(&build_request(image_base64))
            .send()
            .await
            .context("Failed to reach the analysis service")?
            .error_for_status()
            .context("Analysis service returned an error")?;

        let data: CompletionResponse = resp
            .json()
            .await
            .context("Failed to parse analysis response")?;

        Ok(parse_completion(&data.completion))
    }
}

impl FoodImageAnalyzer for LlmAnalyzerClient {
    /// Blocks on the runtime handle; call from `block_in_place` or a blocking thread.
    fn analyze(&self, image_base64: &str) -> Result<FoodAnalysis> {
        self.rt.block_on(self.analyze_async(image_base64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ANALYZER_URL;

    #[tokio::test]
    async fn test_client_builds() {
        let client = LlmAnalyzerClient::new(DEFAULT_ANALYZER_URL).unwrap();
        assert_eq!(client.url, DEFAULT_ANALYZER_URL);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        let client = LlmAnalyzerClient::new("http://127.0.0.1:9/llm").unwrap();
        assert!(client.analyze_async("aGVsbG8=").await.is_err());
    }

    #[tokio::test]
    #[ignore = "hits the hosted analysis API"]
    async fn test_analyze_live() {
        let client = LlmAnalyzerClient::new(DEFAULT_ANALYZER_URL).unwrap();
        // 1x1 transparent PNG
        let png = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";
        let analysis = client.analyze_async(png).await.unwrap();
        assert!(!analysis.name.is_empty());
    }
}
