// src/services/vision.rs

//! Vision completion collaborator.
//!
//! The solver only needs "send an instruction and an image, get candidate
//! answers back", so that is the whole trait.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SolverConfig;
use crate::utils::http::decode_body;

/// A vision-capable completion service.
#[async_trait]
pub trait VisionCompletion: Send + Sync {
    /// Ask the model to read `inline_image` following `instruction`.
    ///
    /// Returns every candidate answer, in the order the service ranked them.
    async fn complete(&self, instruction: &str, inline_image: &str) -> Result<Vec<String>>;
}

/// OpenAI chat-completions backend.
pub struct OpenAiVision {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiVision {
    pub fn new(client: Client, api_key: impl Into<String>, config: &SolverConfig) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    fn to_api_request<'a>(&'a self, instruction: &'a str, inline_image: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: vec![ContentPart::Text { text: instruction }],
                },
                ChatMessage {
                    role: "user",
                    content: vec![ContentPart::ImageUrl {
                        image_url: ImageUrl { url: inline_image },
                    }],
                },
            ],
        }
    }
}

#[async_trait]
impl VisionCompletion for OpenAiVision {
    async fn complete(&self, instruction: &str, inline_image: &str) -> Result<Vec<String>> {
        let request = self.to_api_request(instruction, inline_image);

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let completion: ChatResponse = decode_body(&self.endpoint, &bytes)?;
        Ok(completion
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect())
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
