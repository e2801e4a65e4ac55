//! # Harry Commands
//!
//! Discord command implementations using Poise framework for Harry.
//!
//! This crate provides the `/fun` and `/admin` slash command groups, the
//! bot admin list and channel block list they manage, and the serenity
//! adapters that let the engagement tracker talk to Discord.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod admin;
pub mod channels;
pub mod context;
pub mod framework;
pub mod fun;
pub mod permissions;
pub mod transport;

pub use channels::*;
pub use context::*;
pub use framework::*;
pub use permissions::*;
pub use transport::*;
