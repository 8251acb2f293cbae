//! Records that flow through one artwork analysis.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_PERIOD: &str = "Unknown Period";
pub const UNKNOWN_STYLE: &str = "Unknown Style";
pub const TECHNIQUE_NOT_AVAILABLE: &str = "Details not available.";

/// Raw image plus the encoder settings it should be normalized with
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image_bytes: Vec<u8>,
    /// Upper bound for both width and height, in pixels
    pub max_dimension: u32,
    /// Lossy encoder quality in (0, 1]
    pub quality: f32,
}

impl AnalysisRequest {
    pub fn new(image_bytes: impl Into<Vec<u8>>, max_dimension: u32, quality: f32) -> Self {
        Self {
            image_bytes: image_bytes.into(),
            max_dimension,
            quality,
        }
    }
}

/// Upload-ready JPEG produced by the image normalizer.
///
/// `compressed_byte_size` is derived from the base64 length, not measured
/// from the encoder output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    /// Base64 (standard alphabet) of the JPEG bytes
    pub encoded_data: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub original_byte_size: u64,
    pub compressed_byte_size: u64,
}

impl CompressedImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.encoded_data)
    }
}

/// Structured explanation of an artwork. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub artist: String,
    pub period: String,
    pub style: String,
    pub context: String,
    pub meaning: String,
    pub technique: String,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            artist: UNKNOWN_ARTIST.to_string(),
            period: UNKNOWN_PERIOD.to_string(),
            style: UNKNOWN_STYLE.to_string(),
            context: String::new(),
            meaning: String::new(),
            technique: String::new(),
        }
    }
}

/// What the result card shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Loading,
    Success(AnalysisResult),
    Failure(String),
}

impl AnalysisOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AnalysisOutcome::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_result_uses_sentinels() {
        let result = AnalysisResult::default();
        assert_eq!(result.artist, "Unknown Artist");
        assert_eq!(result.period, "Unknown Period");
        assert_eq!(result.style, "Unknown Style");
        assert!(result.context.is_empty());
        assert!(result.meaning.is_empty());
        assert!(result.technique.is_empty());
    }

    #[test]
    fn test_data_url() {
        let image = CompressedImage {
            encoded_data: "AAAA".to_string(),
            mime_type: "image/jpeg",
            width: 1,
            height: 1,
            original_byte_size: 10,
            compressed_byte_size: 3,
        };
        assert_eq!(image.data_url(), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_outcome_terminal() {
        assert!(!AnalysisOutcome::Loading.is_terminal());
        assert!(AnalysisOutcome::Failure("nope".into()).is_terminal());
    }
}
