//! Image generation module for Aurora
//!
//! Text-to-image generation against image-capable models. Results are
//! returned as data URIs carrying the MIME type the service reported.

mod client;
mod types;

pub use client::{ImageClient, ImageClientBuilder};
pub use types::{AspectRatio, ImageRequest, ImageResponse};
