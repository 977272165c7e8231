use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{debug, error, info};

use super::types::{ChatRequest, ChatResponse, Message};
use super::ChatModel;
use crate::config::{LlmConfig, RequestConfig};
use crate::error::{LlmError, LlmResult};

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f64>,
    request_config: RequestConfig,
}

impl LlmClient {
    /// Create a new model client
    pub fn new(config: &LlmConfig, request_config: RequestConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(LlmError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            request_config,
        })
    }

    /// Send the ordered messages and return the completion text.
    ///
    /// There is no retry layer: the first failure is returned to the caller.
    pub async fn chat(&self, messages: &[Message]) -> LlmResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request =
            ChatRequest::new(&self.model, messages.to_vec()).with_temperature(self.temperature);

        let start = Instant::now();
        let result = self.execute_request(&url, &request).await.and_then(|response| {
            let completion = response.completion().map(str::to_string).ok_or_else(|| {
                LlmError::InvalidResponse {
                    message: "Response contained no completion text".to_string(),
                }
            })?;
            Ok((completion, response.usage.unwrap_or_default()))
        });

        match result {
            Ok((completion, usage)) => {
                info!(
                    model = %self.model,
                    latency_ms = start.elapsed().as_millis(),
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    total_tokens = usage.total_tokens,
                    "Chat completion succeeded"
                );
                Ok(completion)
            }
            Err(e) => {
                error!(
                    model = %self.model,
                    error = %e,
                    latency_ms = start.elapsed().as_millis(),
                    "Chat completion failed"
                );
                Err(e)
            }
        }
    }

    /// Execute a single request (internal)
    async fn execute_request(&self, url: &str, request: &ChatRequest) -> LlmResult<ChatResponse> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Calling chat completions"
        );

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })
    }

    fn classify(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout {
                timeout_ms: self.request_config.timeout_ms,
            }
        } else {
            LlmError::Http(e)
        }
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model name sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Adapt this client to the synchronous [`ChatModel`] capability.
    pub fn blocking(self, runtime: Handle) -> BlockingLlmClient {
        BlockingLlmClient {
            inner: self,
            runtime,
        }
    }
}

/// [`ChatModel`] backed by an [`LlmClient`].
///
/// Each call blocks the calling thread while the request future is driven
/// on it; the runtime's worker threads service the socket. Must not be
/// called from inside an async context.
#[derive(Clone)]
pub struct BlockingLlmClient {
    inner: LlmClient,
    runtime: Handle,
}

impl BlockingLlmClient {
    /// Access the wrapped async client
    pub fn inner(&self) -> &LlmClient {
        &self.inner
    }
}

impl ChatModel for BlockingLlmClient {
    fn complete(&self, messages: &[Message]) -> LlmResult<String> {
        self.runtime.block_on(self.inner.chat(messages))
    }
}
