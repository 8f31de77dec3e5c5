//! Password hashing and strength rules.

mod hasher;

pub use hasher::*;
