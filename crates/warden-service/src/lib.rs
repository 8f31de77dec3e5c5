//! # Warden Service
//!
//! Resolution of the authenticated identity through the cache-aside
//! policy, invalidation around identity writes, and the account flows
//! that perform those writes.

pub mod account_service;
pub mod bootstrap;
pub mod dto;
pub mod invalidation;
pub mod mailer;
pub mod repository;
pub mod resolver;
pub mod session;

pub use account_service::*;
pub use bootstrap::*;
pub use dto::*;
pub use invalidation::*;
pub use mailer::*;
pub use repository::*;
pub use resolver::*;
pub use session::*;
