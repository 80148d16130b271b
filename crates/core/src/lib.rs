//! Campus Market Core - Shared types library.
//!
//! This crate provides common types used across all Campus Market components:
//! - `campus-market` - Record store, order lifecycle and session cache
//! - `cli` - Command-line front end for browsing, selling and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and pure calculations - no I/O, no
//! persistence, no clocks. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, statuses and listing metadata

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
