//! # Contracts
//!
//! Interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only, never on each other's internals.
//!
//! ## Metric model
//! - A metric is a named point with ordered tags and typed fields
//! - Timestamps are UTC; an unset timestamp means "now" at encode time

mod config;
mod error;
mod metric;
mod simple_metric;

pub use config::*;
pub use error::*;
pub use metric::*;
pub use simple_metric::SimpleMetric;
