//! # Harry Config
//!
//! Type-safe configuration management for Harry.
//!
//! Configuration is read from an optional TOML file, overlaid with
//! environment variables, and validated before the bot starts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
