//! Vision module - image understanding
//!
//! Sends an image and a prompt to a multimodal model and returns the
//! generated description.

mod client;

pub use client::{ANALYSIS_FAILED, VisionClient, VisionClientBuilder};
