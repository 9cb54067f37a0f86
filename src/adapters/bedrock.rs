use crate::adapters::llm::{LLMAdapter, LLMRequest, LLMResponse, ModelConfig, Usage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const MAX_RETRY_ATTEMPTS: u32 = 3;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(300);

pub struct BedrockAdapter {
    client: Client,
    config: ModelConfig,
}

#[derive(Serialize)]
struct BedrockRequest {
    anthropic_version: &'static str,
    max_tokens: usize,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct BedrockResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: String,
    usage: Option<BedrockUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
    #[serde(rename = "type")]
    content_type: String,
}

#[derive(Deserialize)]
struct BedrockUsage {
    input_tokens: usize,
    output_tokens: usize,
}

impl BedrockAdapter {
    pub async fn new(config: ModelConfig) -> Result<Self> {
        let timeouts = TimeoutConfig::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::adaptive().with_max_attempts(MAX_RETRY_ATTEMPTS))
            .timeout_config(timeouts);
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }

        let sdk_config = loader.load().await;
        let client = Client::new(&sdk_config);

        Ok(Self { client, config })
    }
}

#[async_trait]
impl LLMAdapter for BedrockAdapter {
    async fn complete(&self, request: LLMRequest) -> Result<LLMResponse> {
        let body = BedrockRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt,
            }],
        };

        let output = self
            .client
            .invoke_model()
            .model_id(&self.config.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(serde_json::to_vec(&body)?))
            .send()
            .await
            .with_context(|| format!("Bedrock InvokeModel failed for {}", self.config.model_id))?;

        let parsed: BedrockResponse = serde_json::from_slice(output.body().as_ref())
            .context("Failed to parse Bedrock response body")?;

        let content = parsed
            .content
            .first()
            .map(|block| {
                if block.content_type == "text" {
                    block.text.clone()
                } else {
                    format!("Unsupported content type: {}", block.content_type)
                }
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content,
            model: if parsed.model.is_empty() {
                self.config.model_id.clone()
            } else {
                parsed.model
            },
            usage: parsed.usage.map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_envelope_matches_bedrock_contract() {
        let body = BedrockRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: 16384,
            messages: vec![Message {
                role: "user".to_string(),
                content: "refactor this".to_string(),
            }],
        };

        let json: serde_json::Value = serde_json::to_value(&body).unwrap();
        assert_eq!(json["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(json["max_tokens"], 16384);
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "refactor this");
    }

    #[test]
    fn response_first_text_part_is_the_reply() {
        let raw = r#"{
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "model": "claude",
            "content": [{"type": "text", "text": "Renamed a fn.\n\n```clojure\n(ns a)\n```"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 120, "output_tokens": 45}
        }"#;

        let parsed: BedrockResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.content[0].content_type, "text");
        assert!(parsed.content[0].text.contains("```clojure"));
        assert_eq!(parsed.usage.as_ref().unwrap().input_tokens, 120);
        assert_eq!(parsed.usage.as_ref().unwrap().output_tokens, 45);
    }

    #[test]
    fn response_without_usage_still_parses() {
        let raw = r#"{"content": [{"type": "text", "text": "hi"}]}"#;
        let parsed: BedrockResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage.is_none());
        assert!(parsed.model.is_empty());
    }
}
