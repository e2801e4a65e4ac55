//! # Harry Fun
//!
//! The trolling easter egg: admins mark users in a guild as targets and
//! Harry answers their messages with insults, reactions and, when
//! engagement is on, a capped back-and-forth of comebacks.
//!
//! All state is in memory and owned by an [`EngagementTracker`]. Everything
//! the tracker talks to (Discord, the clock, randomness, text generation,
//! authorization) sits behind a narrow trait in [`traits`] so the decision
//! logic can be exercised without a gateway connection.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bounded;
pub mod classify;
pub mod comeback;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod insult;
pub mod openai;
pub mod pending;
pub mod store;
pub mod target;
pub mod traits;

pub use bounded::*;
pub use classify::*;
pub use comeback::*;
pub use dedup::*;
pub use engine::*;
pub use error::*;
pub use insult::*;
pub use openai::*;
pub use pending::*;
pub use store::*;
pub use target::*;
pub use traits::*;
