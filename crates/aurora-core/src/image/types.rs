//! Image generation types
//!
//! Request and response types for image generation.

use serde::{Deserialize, Serialize};

use crate::datauri::DataUri;

/// Aspect ratio presets accepted by the image model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    /// 1:1 square image
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 3:4 portrait image
    #[serde(rename = "3:4")]
    Portrait,
    /// 4:3 landscape image
    #[serde(rename = "4:3")]
    Landscape,
    /// 9:16 tall image
    #[serde(rename = "9:16")]
    Tall,
    /// 16:9 wide image
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    const ALL: [AspectRatio; 5] = [
        Self::Square,
        Self::Portrait,
        Self::Landscape,
        Self::Tall,
        Self::Wide,
    ];

    /// Ratio label as sent to the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "3:4",
            Self::Landscape => "4:3",
            Self::Tall => "9:16",
            Self::Wide => "16:9",
        }
    }

    /// All ratio labels
    pub fn all_labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|r| r.as_str()).collect()
    }

    /// Parse from string (e.g., "1:1", "square", "16:9", "wide")
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1:1" | "square" => Some(Self::Square),
            "3:4" | "portrait" => Some(Self::Portrait),
            "4:3" | "landscape" => Some(Self::Landscape),
            "9:16" | "tall" => Some(Self::Tall),
            "16:9" | "wide" => Some(Self::Wide),
            _ => None,
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request for text-to-image generation
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    /// Text prompt describing the desired image
    pub prompt: String,
    /// Model override; the configured image model is used when `None`
    pub model: Option<String>,
    /// Aspect ratio override; the configured ratio is used when `None`
    pub aspect_ratio: Option<AspectRatio>,
}

impl ImageRequest {
    /// Create a new image request
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            aspect_ratio: None,
        }
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the aspect ratio
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }
}

/// Generated image
#[derive(Debug, Clone)]
pub struct ImageResponse {
    /// Image bytes and MIME type as reported by the service
    pub image: DataUri,
    /// Text the model returned alongside the image (if any)
    pub caption: Option<String>,
    /// Model that generated the image
    pub model_used: String,
    /// Generation time in milliseconds
    pub generation_time_ms: u64,
}

impl ImageResponse {
    /// The image as a `data:` URI string
    pub fn data_uri(&self) -> String {
        self.image.to_string()
    }

    /// Save the image to a file
    pub fn save_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        std::fs::write(path, &self.image.data)
    }

    /// Get the image size in bytes
    pub fn size_bytes(&self) -> usize {
        self.image.data.len()
    }
}
