//! Shared helpers for plucker crates.
//!
//! Everything here is pure string plumbing; no engine types live in this crate.

pub mod case;
