//! Shared types, errors, and configuration for Akiba.
//!
//! This crate provides common types used across all other crates:
//! - Money rounding and amount validation helpers
//! - Calendar arithmetic (month addition, challenge-year boundaries)
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
