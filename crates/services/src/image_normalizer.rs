//! Image normalization before upload.
//!
//! Decodes whatever the user picked, bounds the longer side, and re-encodes
//! it as JPEG so every request stays small regardless of camera resolution.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use shared::{AnalysisError, AnalysisRequest, CompressedImage};

pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// Decode, downscale and re-encode `request.image_bytes`.
pub fn normalize(request: &AnalysisRequest) -> Result<CompressedImage, AnalysisError> {
    if request.max_dimension == 0 {
        return Err(AnalysisError::Encode(
            "max dimension must be greater than zero".to_string(),
        ));
    }
    let quality = jpeg_quality(request.quality)?;

    if request.image_bytes.is_empty() {
        return Err(AnalysisError::Decode("image is empty".to_string()));
    }
    let decoded = image::load_from_memory(&request.image_bytes)
        .map_err(|e| AnalysisError::Decode(format!("failed to load image: {}", e)))?;

    let (src_width, src_height) = decoded.dimensions();
    let (width, height) = target_dimensions(src_width, src_height, request.max_dimension);

    let resized = if (width, height) == (src_width, src_height) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };
    // JPEG has no alpha channel
    let rgb = resized.to_rgb8();

    let mut jpeg_bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_bytes, quality)
        .encode(rgb.as_raw(), width, height, image::ColorType::Rgb8)
        .map_err(|e| AnalysisError::Encode(format!("jpeg encoding failed: {}", e)))?;

    let encoded_data = STANDARD.encode(&jpeg_bytes);
    let compressed_byte_size = approximate_decoded_len(encoded_data.len());

    tracing::debug!(
        src_width,
        src_height,
        width,
        height,
        original_bytes = request.image_bytes.len(),
        compressed_bytes = compressed_byte_size,
        "normalized image"
    );

    Ok(CompressedImage {
        encoded_data,
        mime_type: OUTPUT_MIME_TYPE,
        width,
        height,
        original_byte_size: request.image_bytes.len() as u64,
        compressed_byte_size,
    })
}

/// Scale so the longer side equals `max_dimension`; never upscale.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }
    let scale_side = |side: u32, longest: u32| -> u32 {
        let scaled = side as f64 * max_dimension as f64 / longest as f64;
        (scaled.round() as u32).max(1)
    };
    if width > height {
        (max_dimension, scale_side(height, width))
    } else {
        (scale_side(width, height), max_dimension)
    }
}

/// Byte count implied by a base64 string of `encoded_len` characters
pub fn approximate_decoded_len(encoded_len: usize) -> u64 {
    (encoded_len as u64 * 3).div_ceil(4)
}

fn jpeg_quality(quality: f32) -> Result<u8, AnalysisError> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(AnalysisError::Encode(format!(
            "quality must be in (0, 1], got {}",
            quality
        )));
    }
    Ok(((quality * 100.0).round() as u8).clamp(1, 100))
}
