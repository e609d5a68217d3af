//! # Line Protocol
//!
//! Serializes one `Metric` into one InfluxDB line-protocol line.
//!
//! ```text
//! measurement[,tag=value...] field=value[,field=value...] timestamp_ns\n
//! ```

mod encoder;
mod error;
mod escape;

pub use encoder::{Encoder, LineProtocolEncoder};
pub use error::EncodeError;
