//! Core types for Marigold.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod price;

pub use price::{CurrencyCode, ParseCurrencyError, Price};
