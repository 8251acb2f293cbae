//! One analysis: normalize the image, ask the provider, parse the reply.

use providers::{VisionProvider, VisionRequest};
use services::image_normalizer;
use shared::config::LensConfig;
use shared::{AnalysisError, AnalysisRequest, AnalysisResult, Credential};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::prompts::ART_ANALYSIS_PROMPT;
use crate::response_parser;

pub struct Analyzer {
    config: LensConfig,
    provider: Arc<dyn VisionProvider>,
}

impl Analyzer {
    pub fn new(config: LensConfig, provider: Arc<dyn VisionProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    /// Run the full pipeline for one image.
    ///
    /// Callers must not overlap calls for the same view; stale completions
    /// are filtered by the session, not here.
    pub async fn analyze(
        &self,
        image_bytes: Vec<u8>,
        credential: Option<&Credential>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let Some(credential) = credential else {
            warn!("analysis requested without an API key");
            return Err(AnalysisError::MissingCredential);
        };

        self.run(image_bytes, credential)
            .await
            .map_err(|err| scrub(err, credential))
    }

    async fn run(
        &self,
        image_bytes: Vec<u8>,
        credential: &Credential,
    ) -> Result<AnalysisResult, AnalysisError> {
        let request = AnalysisRequest::new(
            image_bytes,
            self.config.max_image_size,
            self.config.image_quality,
        );
        let image = image_normalizer::normalize(&request)?;
        info!(
            provider = self.provider.id(),
            width = image.width,
            height = image.height,
            original_bytes = image.original_byte_size,
            compressed_bytes = image.compressed_byte_size,
            "sending artwork for analysis"
        );

        let text = self
            .provider
            .describe(
                VisionRequest {
                    prompt: ART_ANALYSIS_PROMPT,
                    image: &image,
                    temperature: self.config.temperature,
                    max_output_tokens: self.config.max_output_tokens,
                },
                credential,
            )
            .await?;
        debug!(chars = text.len(), "provider returned analysis text");

        let result = response_parser::parse(&text);
        info!(artist = %result.artist, "analysis complete");
        Ok(result)
    }
}

/// Keep the key out of any message that reaches the UI
fn scrub(err: AnalysisError, credential: &Credential) -> AnalysisError {
    match err {
        AnalysisError::Decode(msg) => AnalysisError::Decode(credential.redact(&msg)),
        AnalysisError::Encode(msg) => AnalysisError::Encode(credential.redact(&msg)),
        AnalysisError::Provider { status, message } => AnalysisError::Provider {
            status,
            message: credential.redact(&message),
        },
        AnalysisError::Unknown(msg) => AnalysisError::Unknown(credential.redact(&msg)),
        other => other,
    }
}
