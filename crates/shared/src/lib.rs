//! Candle Shared Types and Utilities
//!
//! This crate contains the tenant model and errors shared across the Candle edge services.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
