//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types used across all Bazaar components:
//! - `storefront` - The marketplace web application
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. In particular the text encodings of the shopping cart and
//! the seller notification queue live here, so every reader and writer of those
//! columns goes through the same code.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, e-mail, username, price, cart and notification codecs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
