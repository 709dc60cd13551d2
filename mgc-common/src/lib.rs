//! # MGC Common Library
//!
//! Shared bootstrap code for the music genre classifier services:
//! - TOML configuration model and layered resolution
//! - Logging initialisation
//! - Common error type

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
