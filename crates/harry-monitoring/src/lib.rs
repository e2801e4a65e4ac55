//! # Harry Monitoring
//!
//! Lightweight observability for Harry: per-command performance metrics,
//! monthly API cost and budget tracking, and an error reporter that stands
//! in front of an external error-tracking service.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod costs;
pub mod metrics;
pub mod reporting;

pub use costs::*;
pub use metrics::*;
pub use reporting::*;
