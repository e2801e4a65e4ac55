//! # Harry Bot
//!
//! Discord bot for a college-football dynasty league, with a hidden
//! trolling easter egg.
//!
//! This is the main binary crate that wires configuration, logging and the
//! Poise framework together and runs the gateway client.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod error;

pub use bot::*;
pub use error::*;
