//! Validation of user-supplied dish photos.
//!
//! The MIME type sent to the model is detected from the bytes; whatever the caller
//! claims is ignored.

use std::io::Cursor;

use base64::Engine;
use image::{ImageFormat, ImageReader};

/// Formats the model accepts as inline image data.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum file size for images (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// A validated image ready to be sent inline.
///
/// Only constructible through validation, so the content type always comes from
/// the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    data: Vec<u8>,
    mime_type: String,
}

impl ImageInput {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Detected content type, e.g. "image/jpeg".
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Validate raw bytes and detect their content type.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, String> {
        if data.is_empty() {
            return Err("Image is empty".to_string());
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(format!(
                "Image too large: {} bytes (max {})",
                data.len(),
                MAX_FILE_SIZE
            ));
        }

        let mime_type = validate_image(&data)?;
        Ok(Self { data, mime_type })
    }

    /// Decode a base64 payload, tolerating a `data:image/...;base64,` prefix.
    pub fn from_base64(encoded: &str) -> Result<Self, String> {
        let payload = match encoded.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => encoded,
        };

        let data = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| format!("Invalid base64 image data: {}", e))?;

        Self::from_bytes(data)
    }
}

/// Check the format is allowed and return its content type.
pub fn validate_image(data: &[u8]) -> Result<String, String> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image: {}", e))?;

    let format = reader
        .format()
        .ok_or_else(|| "Could not detect image format".to_string())?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        ));
    }

    Ok(format.to_mime_type().to_string())
}
