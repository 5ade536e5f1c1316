//! # Configuration Module
//!
//! Configuration structures shared by the CLI and library callers.

pub mod config;

pub use config::{DEFAULT_DISPLAY_WIDTH, DEFAULT_JPEG_QUALITY, SnapConfig};
