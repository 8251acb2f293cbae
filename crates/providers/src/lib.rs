//! Vision providers that turn an image plus a prompt into free text.

pub mod gemini;
pub mod router;

use shared::{AnalysisError, CompressedImage, Credential};

/// One single-turn multimodal request
#[derive(Debug, Clone, Copy)]
pub struct VisionRequest<'a> {
    pub prompt: &'a str,
    pub image: &'a CompressedImage,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Backend that answers a [`VisionRequest`] with the model's text.
///
/// Implementations map transport and provider failures onto
/// [`AnalysisError`] and must keep the credential out of every message.
#[async_trait::async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider identifier
    fn id(&self) -> &'static str;

    async fn describe(
        &self,
        request: VisionRequest<'_>,
        credential: &Credential,
    ) -> Result<String, AnalysisError>;
}
