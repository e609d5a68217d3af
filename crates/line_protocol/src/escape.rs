//! Escaping rules per line-protocol element

use bytes::{BufMut, BytesMut};

/// Characters escaped in measurement names
const MEASUREMENT_SPECIAL: &[char] = &[',', ' '];

/// Characters escaped in tag keys, tag values and field keys
const KEY_SPECIAL: &[char] = &[',', '=', ' '];

/// Characters escaped inside double-quoted string field values
const STRING_SPECIAL: &[char] = &['"', '\\'];

pub fn measurement(out: &mut BytesMut, s: &str) {
    escape_into(out, s, MEASUREMENT_SPECIAL);
}

pub fn key(out: &mut BytesMut, s: &str) {
    escape_into(out, s, KEY_SPECIAL);
}

pub fn string_value(out: &mut BytesMut, s: &str) {
    out.put_u8(b'"');
    escape_into(out, s, STRING_SPECIAL);
    out.put_u8(b'"');
}

fn escape_into(out: &mut BytesMut, s: &str, special: &[char]) {
    // fast path: nothing to escape
    if !s.chars().any(|c| special.contains(&c) || is_control(c)) {
        out.put_slice(s.as_bytes());
        return;
    }

    let mut buf = [0u8; 4];
    for c in s.chars() {
        match c {
            '\n' => out.put_slice(b"\\n"),
            '\r' => out.put_slice(b"\\r"),
            '\t' => out.put_slice(b"\\t"),
            '\x0c' => out.put_slice(b"\\f"),
            c if special.contains(&c) => {
                out.put_u8(b'\\');
                out.put_u8(c as u8);
            }
            c => out.put_slice(c.encode_utf8(&mut buf).as_bytes()),
        }
    }
}

fn is_control(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\t' | '\x0c')
}
