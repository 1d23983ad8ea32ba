//! Vitrine Core - Shared domain types.
//!
//! This crate provides the types shared across Vitrine components:
//! - `client` - The optimistic state synchronization engine
//! - `integration-tests` - End-to-end scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no timers.
//! Everything here is constructed either from the server-embedded variant
//! snapshot at page load or from a remote mutation response, and the client
//! crate treats it as authoritative.
//!
//! # Modules
//!
//! - [`types`] - Normalized keys, variants, totals, promo state, and the
//!   remote response shapes the engine consumes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
