//! # Warden Cache
//!
//! Namespaced key-value cache with per-entry expiration.
//!
//! [`CacheStore`] is the only entry point. It addresses logical
//! [`CacheTable`]s, maps them to per-environment physical tables, and turns
//! every backend failure into a [`CacheOutcome`] so callers can fall back to
//! the relational store without error handling.

pub mod backend;
mod entry;
mod key;
mod outcome;
mod probe;
mod scan;
mod store;
mod table;

pub use backend::{connect, BackendFailure, CacheBackend, MemoryCacheBackend, RedisCacheBackend};
pub use entry::CacheEntry;
pub use key::{CacheKey, SLUG_FIELD};
pub use outcome::CacheOutcome;
pub use probe::{run_probe, spawn_startup_probe, ConnectivityProbe, ProbeReport};
pub use scan::ScanCriteria;
pub use store::CacheStore;
pub use table::{CacheTable, KeyKind};
