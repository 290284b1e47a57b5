//! Aurora Core Library
//!
//! This crate provides the client side of Aurora's hosted generative-AI
//! integration:
//! - Text generation (single response and SSE streaming)
//! - Multi-turn chat sessions
//! - Image generation returning data URIs
//! - Image analysis (vision)
//! - Data URI encoding and decoding
//! - Configuration with file persistence

pub mod config;
pub mod datauri;
pub mod error;
pub mod image;
pub mod llm;
pub mod vision;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::datauri::DataUri;
    pub use crate::error::{Error, Result};
    pub use crate::image::ImageClient;
    pub use crate::llm::{GenerationClient, StreamFragment, TextRequest};
    pub use crate::vision::VisionClient;
}

#[cfg(test)]
mod llm_tests;
