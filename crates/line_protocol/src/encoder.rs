//! Encoder trait and the line-protocol implementation

use std::fmt::Write as _;

use bytes::{BufMut, Bytes, BytesMut};
use contracts::{FieldValue, Metric};

use crate::error::EncodeError;
use crate::escape;

/// Serializes a single metric into wire bytes
pub trait Encoder: Send + Sync {
    /// Append the encoded record to `out`
    ///
    /// # Errors
    /// Returns the encoding failure; `out` is left exactly as it was.
    fn encode_into(&self, metric: &dyn Metric, out: &mut BytesMut) -> Result<(), EncodeError>;

    /// Encode into a fresh buffer
    fn encode(&self, metric: &dyn Metric) -> Result<Bytes, EncodeError> {
        let mut out = BytesMut::new();
        self.encode_into(metric, &mut out)?;
        Ok(out.freeze())
    }
}

/// InfluxDB line-protocol encoder (nanosecond precision, newline terminated)
///
/// Tags are written in the order the metric reports them. Tags with an
/// empty key or value, fields with an empty key and non-finite floats are
/// skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineProtocolEncoder;

impl LineProtocolEncoder {
    pub fn new() -> Self {
        Self
    }

    fn write_line(&self, metric: &dyn Metric, out: &mut BytesMut) -> Result<(), EncodeError> {
        let name = metric.name();
        if name.is_empty() {
            return Err(EncodeError::EmptyName);
        }
        escape::measurement(out, name);

        for tag in metric.tags() {
            if tag.key.is_empty() || tag.value.is_empty() {
                continue;
            }
            out.put_u8(b',');
            escape::key(out, &tag.key);
            out.put_u8(b'=');
            escape::key(out, &tag.value);
        }

        let mut written = 0usize;
        for field in metric.fields() {
            if field.key.is_empty() || !is_encodable(&field.value) {
                continue;
            }
            out.put_u8(if written == 0 { b' ' } else { b',' });
            escape::key(out, &field.key);
            out.put_u8(b'=');
            write_value(out, &field.value);
            written += 1;
        }
        if written == 0 {
            return Err(EncodeError::NoFields {
                name: name.to_string(),
            });
        }

        let nanos = metric
            .time()
            .timestamp_nanos_opt()
            .ok_or_else(|| EncodeError::TimestampOutOfRange {
                name: name.to_string(),
            })?;
        write_display(out, format_args!(" {nanos}\n"));
        Ok(())
    }
}

impl Encoder for LineProtocolEncoder {
    fn encode_into(&self, metric: &dyn Metric, out: &mut BytesMut) -> Result<(), EncodeError> {
        let start = out.len();
        self.write_line(metric, out).inspect_err(|_| out.truncate(start))
    }
}

fn is_encodable(value: &FieldValue) -> bool {
    match value {
        FieldValue::Float(v) => v.is_finite(),
        _ => true,
    }
}

fn write_value(out: &mut BytesMut, value: &FieldValue) {
    match value {
        FieldValue::Integer(v) => write_display(out, format_args!("{v}i")),
        FieldValue::Float(v) => write_display(out, format_args!("{v}")),
        FieldValue::Boolean(true) => out.put_slice(b"true"),
        FieldValue::Boolean(false) => out.put_slice(b"false"),
        FieldValue::String(s) => escape::string_value(out, s),
    }
}

fn write_display(out: &mut BytesMut, args: std::fmt::Arguments<'_>) {
    // BytesMut's fmt::Write grows as needed and never fails
    let _ = out.write_fmt(args);
}
