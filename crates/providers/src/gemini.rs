use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{AnalysisError, Credential};
use std::time::Duration;

use crate::{VisionProvider, VisionRequest};

#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    #[allow(dead_code)]
    code: Option<i64>,
}

impl GeminiRequest {
    pub fn from_vision(request: &VisionRequest<'_>) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::Text {
                        text: request.prompt.to_string(),
                    },
                    GeminiPart::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.mime_type.to_string(),
                            data: request.image.encoded_data.clone(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }
}

/// Map an HTTP status and body onto the model text or a typed failure.
///
/// 401/403 are auth failures whatever the body says.
pub fn interpret_response(status: u16, body: &str) -> Result<String, AnalysisError> {
    if status == 401 || status == 403 {
        return Err(AnalysisError::Auth);
    }
    if !(200..300).contains(&status) {
        return Err(AnalysisError::provider_status(status));
    }

    let parsed: GeminiResponse = serde_json::from_str(body).map_err(|e| {
        AnalysisError::Unknown(format!("unreadable provider response: {}", e))
    })?;

    if let Some(error) = parsed.error {
        return Err(AnalysisError::provider_message(error.message));
    }

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .ok_or(AnalysisError::EmptyResponse)
}

fn transport_error(err: reqwest::Error) -> AnalysisError {
    if err.is_timeout() {
        return AnalysisError::Unknown("the request timed out".to_string());
    }
    if err.is_connect() {
        return AnalysisError::network();
    }
    // The URL carries the key as a query parameter
    AnalysisError::Unknown(err.without_url().to_string())
}

/// Client for Gemini's `generateContent` endpoint, or anything that speaks
/// the same wire format.
pub struct GeminiVisionClient {
    http: Client,
    endpoint: String,
}

impl GeminiVisionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Unknown(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(http, endpoint))
    }

    pub fn with_client(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl VisionProvider for GeminiVisionClient {
    fn id(&self) -> &'static str {
        "gemini"
    }

    async fn describe(
        &self,
        request: VisionRequest<'_>,
        credential: &Credential,
    ) -> Result<String, AnalysisError> {
        let body = GeminiRequest::from_vision(&request);
        let resp = self
            .http
            .post(&self.endpoint)
            .query(&[("key", credential.expose())])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(transport_error)?;
        tracing::debug!(status, body_len = text.len(), "gemini replied");
        interpret_response(status, &text)
    }
}
