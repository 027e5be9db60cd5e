//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for the marketplace's domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod notifications;
pub mod price;
pub mod username;

pub use cart::{Cart, CartError};
pub use email::{Email, EmailError};
pub use id::*;
pub use notifications::{NotificationError, Notifications};
pub use price::{Price, PriceError};
pub use username::{Username, UsernameError};

/// Literal stored in a text column to mark it as logically empty.
pub const EMPTY_SENTINEL: &str = "-1";
