//! HTTP client for the four remote capabilities.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{
    AnalyzeImageRequest, AnalyzeImageResponse, ChatMessage, ChatRequest, ChatResponse,
    ImageGenerationRequest, ImageGenerationResponse, OcrRequest, OcrResponse,
};
use crate::utils::url::construct_api_url;

/// Failures surfaced by a capability call. The pipeline converts every
/// variant into a single localized apology message; nothing here is retried.
#[derive(Debug)]
pub enum ApiError {
    /// Non-success HTTP status from the forwarding boundary.
    Transport { status: u16, body: String },
    /// A required field was missing before the request was even sent.
    MalformedInput(&'static str),
    /// The transport itself failed (connection, timeout, TLS).
    Http(reqwest::Error),
    /// Success status, but the expected field was absent from the body.
    InvalidResponse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport { status, body } => {
                write!(f, "API request failed with status {status}: {body}")
            }
            ApiError::MalformedInput(field) => write!(f, "missing required field: {field}"),
            ApiError::Http(err) => write!(f, "HTTP error: {err}"),
            ApiError::InvalidResponse(detail) => write!(f, "unexpected API response: {detail}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err)
    }
}

/// Seam between the pipeline and the remote capabilities. Tests substitute a
/// scripted implementation; production uses [`HttpCapabilityClient`].
#[async_trait]
pub trait CapabilityClient: Send + Sync {
    /// Chat completion over the full (role, content) history.
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String, ApiError>;

    /// Vision captioning/analysis for an image, with an optional question.
    async fn analyze_image(
        &self,
        image_url: &str,
        question: Option<&str>,
    ) -> Result<String, ApiError>;

    /// OCR text extraction from an image.
    async fn extract_text(&self, image_url: &str) -> Result<String, ApiError>;

    /// Image generation; returns a URL for the generated image.
    async fn generate_image(&self, request: &ImageGenerationRequest) -> Result<String, ApiError>;
}

pub struct HttpCapabilityClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpCapabilityClient {
    // Advisory ceiling at the transport boundary; image endpoints are the
    // slowest and allow up to a minute upstream.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: &Req,
    ) -> Result<Resp, ApiError> {
        if self.api_key.is_empty() {
            return Err(ApiError::MalformedInput("api key"));
        }

        let url = construct_api_url(&self.base_url, endpoint);
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Transport { status, body });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl CapabilityClient for HttpCapabilityClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String, ApiError> {
        let response: ChatResponse = self.post("chat", &ChatRequest { messages }).await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ApiError::InvalidResponse("empty choices".to_string()))
    }

    async fn analyze_image(
        &self,
        image_url: &str,
        question: Option<&str>,
    ) -> Result<String, ApiError> {
        if image_url.is_empty() {
            return Err(ApiError::MalformedInput("image url"));
        }
        let request = AnalyzeImageRequest {
            image_url: image_url.to_string(),
            question: question.map(str::to_string),
        };
        let response: AnalyzeImageResponse = self.post("analyze-image", &request).await?;
        Ok(response.analysis)
    }

    async fn extract_text(&self, image_url: &str) -> Result<String, ApiError> {
        if image_url.is_empty() {
            return Err(ApiError::MalformedInput("image url"));
        }
        let request = OcrRequest {
            image_url: image_url.to_string(),
        };
        let response: OcrResponse = self.post("ocr", &request).await?;
        Ok(response.text)
    }

    async fn generate_image(&self, request: &ImageGenerationRequest) -> Result<String, ApiError> {
        if request.prompt.is_empty() {
            return Err(ApiError::MalformedInput("prompt"));
        }
        let response: ImageGenerationResponse = self.post("generate-image", request).await?;
        Ok(response.image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_api_key_is_rejected_before_sending() {
        let client = HttpCapabilityClient::new("http://127.0.0.1:9", "").unwrap();
        let result = client.chat_completion(Vec::new()).await;
        assert!(matches!(result, Err(ApiError::MalformedInput("api key"))));
    }

    #[tokio::test]
    async fn missing_image_reference_is_rejected_before_sending() {
        let client = HttpCapabilityClient::new("http://127.0.0.1:9", "sk-test").unwrap();
        assert!(matches!(
            client.extract_text("").await,
            Err(ApiError::MalformedInput("image url"))
        ));
        assert!(matches!(
            client.analyze_image("", None).await,
            Err(ApiError::MalformedInput("image url"))
        ));
    }
}
