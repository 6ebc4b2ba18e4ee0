//! GPT-4o through an OpenAI-compatible chat completions endpoint (AI/ML API gateway).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::{build_client, send_json};
use super::{Provider, ProviderError, JSON_ONLY_SYSTEM};

const DEFAULT_BASE_URL: &str = "https://api.aimlapi.com/v1";
pub const MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client()?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI GPT-4o"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: JSON_ONLY_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let url = format!("{}/chat/completions", self.base_url);

        let response: ChatResponse = send_json(self.name(), || {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
        })
        .await?;

        first_choice_text(response).ok_or_else(|| {
            ProviderError::Unknown("No response content received from OpenAI".to_string())
        })
    }
}

fn first_choice_text(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_choice_text() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{}"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_text(response), Some("{}".to_string()));
    }

    #[test]
    fn test_empty_choices_yield_nothing() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(first_choice_text(response), None);

        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(first_choice_text(response), None);
    }
}
