//! Shared configuration and error types for Linkdrop.
//!
//! This crate provides common types used across all other crates:
//! - Application configuration (server, Dropbox, upload limits)
//! - Application-wide error taxonomy with HTTP status mapping

pub mod config;
pub mod error;


pub use config::{AppConfig, DropboxConfig, ServerConfig, UploadConfig};
pub use error::{AppError, AppResult};
