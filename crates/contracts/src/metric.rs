//! Metric trait - producer-facing record contract
//!
//! The dispatcher and encoder only see metrics through this trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single metric record
///
/// Implementations are read-only views; the dispatcher never mutates them.
pub trait Metric: Send + Sync {
    /// Measurement name
    fn name(&self) -> &str;

    /// Point in time of the record
    ///
    /// Implementations without an explicit timestamp should return the
    /// current time, which makes the effective time the moment of encoding.
    fn time(&self) -> DateTime<Utc>;

    /// Ordered tag set (duplicates allowed)
    fn tags(&self) -> &[Tag];

    /// Ordered field set
    fn fields(&self) -> &[Field];
}

impl<M: Metric + ?Sized> Metric for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn time(&self) -> DateTime<Utc> {
        (**self).time()
    }

    fn tags(&self) -> &[Tag] {
        (**self).tags()
    }

    fn fields(&self) -> &[Field] {
        (**self).fields()
    }
}

/// Tag key/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Field key/value pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Typed field value
///
/// Untagged so JSON input maps naturally: `true`, `1`, `1.5`, `"text"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl FieldValue {
    /// Short type name (used in logs and error messages)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
