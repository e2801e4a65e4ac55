//! # Harry Common
//!
//! Shared types, utilities, and common functionality for Harry.
//!
//! This crate provides the foundational types and utilities used across
//! all other crates in the Harry workspace: Discord id newtypes, the
//! workspace error type, log and AI-output sanitization, input validation,
//! retry with exponential backoff, and logging initialisation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod retry;
pub mod sanitize;
pub mod types;
pub mod utils;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::*;
pub use logging::*;
pub use retry::*;
pub use sanitize::*;
pub use types::*;
pub use utils::*;
pub use validation::*;
