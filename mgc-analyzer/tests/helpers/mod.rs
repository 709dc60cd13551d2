//! Test Helper Utilities
//!
//! Shared utilities for testing mgc-analyzer

#![allow(dead_code)]

pub mod audio_generator;
pub mod multipart;

// Re-export commonly used items
pub use audio_generator::{generate_test_wav, wav_bytes, AudioConfig, Signal};
pub use multipart::{multipart_request, Part};
