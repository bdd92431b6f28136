//! Request/response payloads for the forwarding boundary.
//!
//! All four capabilities are reached through the same bearer-authenticated
//! HTTP boundary; the JSON shapes here mirror what it accepts and returns.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
pub struct ChatResponseMessage {
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatResponseChoice {
    pub message: ChatResponseMessage,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatResponseChoice>,
}

#[derive(Serialize)]
pub struct AnalyzeImageRequest {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

#[derive(Deserialize)]
pub struct AnalyzeImageResponse {
    pub analysis: String,
}

#[derive(Serialize)]
pub struct OcrRequest {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Deserialize)]
pub struct OcrResponse {
    pub text: String,
}

#[derive(Serialize, Clone)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    #[serde(rename = "negativePrompt", skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(rename = "numInferenceSteps", skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(rename = "guidanceScale", skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f64>,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            steps: None,
            guidance_scale: None,
        }
    }
}

#[derive(Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

pub mod client;
