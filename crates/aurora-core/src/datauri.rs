//! Data URI encoding and decoding
//!
//! Images travel between Aurora and the generation API as base64 payloads.
//! [`DataUri`] is the `data:<mime>;base64,<payload>` form handed to callers.

use std::fmt;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::{Error, Result};

/// Binary content tagged with its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
    /// Decoded bytes
    pub data: Vec<u8>,
}

impl DataUri {
    /// Create a data URI from raw bytes
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Create a data URI from raw bytes, sniffing the MIME type
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mime_type = detect_mime_type(&data);
        Self::new(mime_type, data)
    }

    /// Create a data URI from an already base64-encoded payload
    pub fn from_base64(mime_type: impl Into<String>, payload: &str) -> Result<Self> {
        let data = BASE64
            .decode(payload.trim())
            .map_err(|e| Error::InvalidDataUri(format!("Invalid base64: {}", e)))?;
        Ok(Self::new(mime_type, data))
    }

    /// Parse a `data:<mime>;base64,<payload>` string
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidDataUri("missing 'data:' prefix".to_string()))?;

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidDataUri("missing ',' separator".to_string()))?;

        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::InvalidDataUri("only base64 payloads are supported".to_string()))?;

        let mime_type = if mime_type.is_empty() {
            "text/plain"
        } else {
            mime_type
        };

        Self::from_base64(mime_type, payload)
    }

    /// Base64 payload without the `data:` header
    pub fn base64_payload(&self) -> String {
        BASE64.encode(&self.data)
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }

    /// Whether the content is an image
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.base64_payload())
    }
}

impl FromStr for DataUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Detect MIME type from image bytes
pub fn detect_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        "image/gif"
    } else if data.starts_with(b"RIFF") && data.get(8..12) == Some(b"WEBP") {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

/// Map a MIME type to a file extension
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "text/plain" => "txt",
        _ => "bin",
    }
}

/// Map a file extension to a MIME type
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
