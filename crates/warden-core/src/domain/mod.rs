//! Identity domain types.

pub mod email;
pub mod identity;

pub use email::*;
pub use identity::*;
