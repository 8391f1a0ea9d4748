//! Reckon Core - Fundamental types
//!
//! This crate provides the core types used throughout Reckon:
//! - `Number`: Arbitrary precision decimal magnitudes
//! - `ReckonError`: Structured errors with stable codes

mod number;
mod error;

pub use number::{Number, NumberError};
pub use error::{ReckonError, ErrorContext, Severity, codes};
