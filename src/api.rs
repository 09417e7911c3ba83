use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;

// OpenRouter API 响应结构
#[derive(Debug, Deserialize)]
pub struct OpenRouterResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct OpenRouterRequest {
    pub model: String,
    pub messages: Vec<RequestMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct RequestMessage {
    pub role: String,
    pub content: String,
}

// 文本生成服务的统一入口。管线各组件只依赖这个 trait，
// 测试时换成桩实现，不发网络请求
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// 绑定了具体模型的 OpenRouter 客户端
pub struct ApiClient {
    client: Client,
    config: Config,
    model: String,
}

impl ApiClient {
    pub fn new(config: Config, model: &str) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.processing.request_timeout_seconds))
            .build()?;

        Ok(ApiClient {
            client,
            config,
            model: model.to_string(),
        })
    }

    // 带重试机制的API请求函数
    pub async fn make_request_with_retry(&self, request: &OpenRouterRequest) -> Result<OpenRouterResponse> {
        let mut last_error = None;

        for attempt in 0..=self.config.processing.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(self.config.processing.request_delay_ms * (attempt as u64 + 1));
                println!("    ⏳ 重试 {}/{} 次，等待 {:?}...", attempt, self.config.processing.max_retries, delay);
                sleep(delay).await;
            }

            match self.send_once(request).await {
                Ok(api_response) => {
                    if attempt > 0 {
                        println!("    ✅ 重试成功！");
                    }
                    return Ok(api_response);
                }
                Err(e) => {
                    println!("    ❌ 尝试 {}: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("所有重试都失败了")))
    }

    async fn send_once(&self, request: &OpenRouterRequest) -> Result<OpenRouterResponse> {
        let response = self.client
            .post("https://openrouter.ai/api/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.config.api.openrouter_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("网络请求失败: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|e| format!("(读取错误响应失败: {})", e));
            return Err(anyhow::anyhow!("API请求失败 (状态码: {}): {}", status, error_text));
        }

        response
            .json::<OpenRouterResponse>()
            .await
            .map_err(|e| anyhow::anyhow!("JSON解析失败: {}", e))
    }
}

#[async_trait]
impl TextGenerator for ApiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = OpenRouterRequest {
            model: self.model.clone(),
            messages: vec![RequestMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: 16000,
            temperature: 0.2,
        };

        let api_response = self.make_request_with_retry(&request).await?;
        let content = api_response
            .choices
            .first()
            .ok_or_else(|| anyhow::anyhow!("响应中没有 choices"))?
            .message
            .content
            .trim()
            .to_string();

        Ok(content)
    }
}
