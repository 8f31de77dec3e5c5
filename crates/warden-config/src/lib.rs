//! # Warden Config
//!
//! Configuration management for Warden.
//! Supports layered configuration from files and environment variables.

mod app_config;
mod environment;
mod loader;
mod validation;

pub use app_config::*;
pub use environment::*;
pub use loader::*;
pub use validation::*;
pub use warden_core::telemetry::{LogFormat, ObservabilityConfig};
