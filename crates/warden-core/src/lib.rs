//! # Warden Core
//!
//! Core types, traits, and error definitions for Warden.
//! This crate provides the identity domain and the error taxonomy shared by
//! the cache, security, and service layers.

pub mod clock;
pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use clock::*;
pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use validation::*;
