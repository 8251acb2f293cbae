//! Analysis configuration and user-facing strings.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GEMINI_API_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-flash:generateContent";

/// Fixed knobs for the analysis pipeline. Not exposed to end users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensConfig {
    pub gemini_endpoint: String,
    /// Longest allowed image side before upload, in pixels
    pub max_image_size: u32,
    /// JPEG quality in (0, 1]
    pub image_quality: f32,
    /// Hard cutoff for the provider request
    #[serde(with = "millis")]
    pub analysis_timeout: Duration,
    /// When the "still analyzing" hint appears
    #[serde(with = "millis")]
    pub slow_response_threshold: Duration,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            gemini_endpoint: GEMINI_API_ENDPOINT.to_string(),
            max_image_size: 800,
            image_quality: 0.75,
            analysis_timeout: Duration::from_millis(10_000),
            slow_response_threshold: Duration::from_millis(3_000),
            temperature: 0.4,
            max_output_tokens: 500,
        }
    }
}

impl LensConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_image_size == 0 {
            bail!("max_image_size must be greater than zero");
        }
        if !(self.image_quality > 0.0 && self.image_quality <= 1.0) {
            bail!(
                "image_quality must be in (0, 1], got {}",
                self.image_quality
            );
        }
        if self.slow_response_threshold >= self.analysis_timeout {
            bail!("slow_response_threshold must be shorter than analysis_timeout");
        }
        if self.max_output_tokens == 0 {
            bail!("max_output_tokens must be greater than zero");
        }
        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// UI strings (ready for i18n)
pub mod strings {
    pub mod result {
        pub const ANALYZING: &str = "Analyzing artwork...";
        pub const STILL_ANALYZING: &str = "Still analyzing this artwork…";
        pub const NO_API_KEY: &str = "Please add your API key in Settings to analyze artworks.";
    }

    pub mod errors {
        pub const IMAGE_COMPRESSION: &str = "Failed to process image";
        pub const API_ERROR: &str = "Failed to analyze artwork";
        pub const NETWORK_ERROR: &str = "Network error. Please check your connection.";
        pub const INVALID_API_KEY: &str = "Invalid API key. Please check your settings.";
    }
}
