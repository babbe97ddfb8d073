//! Byte-exact rendering of [`Object`] trees into PDF syntax.
//!
//! This is the crate's copy of the "Keep HOW" half of a PDF writer: the
//! same `Vec<u8>`-extension style, `itoa`/`ryu` number formatting, and
//! `#`-hex name-escaping a hand-rolled PDF writer uses, narrowed down to
//! exactly the objects a function dict/stream needs. A full document
//! writer (object allocation, xref tables, compression) is out of scope;
//! this module only answers "what bytes would a producer emit for this
//! one object".

use crate::object::{Dict, ObjRef, Object};

trait BufExt {
    fn push_bytes(&mut self, bytes: &[u8]);
    fn push_int(&mut self, value: i64);
    fn push_float(&mut self, value: f64);
    fn push_hex(&mut self, value: u8);
}

impl BufExt for Vec<u8> {
    #[inline]
    fn push_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    #[inline]
    fn push_int(&mut self, value: i64) {
        self.push_bytes(itoa::Buffer::new().format(value).as_bytes());
    }

    #[inline]
    fn push_float(&mut self, value: f64) {
        // Force a decimal point even for integral values, matching how
        // PDF number objects are conventionally written for real fields.
        if value.fract() == 0.0 && value.abs() < 1e15 {
            self.push_int(value as i64);
            self.push_bytes(b".0");
        } else {
            self.push_bytes(ryu::Buffer::new().format(value).as_bytes());
        }
    }

    #[inline]
    fn push_hex(&mut self, value: u8) {
        fn hex(b: u8) -> u8 {
            if b < 10 { b'0' + b } else { b'A' + (b - 10) }
        }
        self.push(hex(value >> 4));
        self.push(hex(value & 0xF));
    }
}

fn write_name(buf: &mut Vec<u8>, name: &str) {
    buf.push(b'/');
    for &byte in name.as_bytes() {
        if matches!(byte, b'!'..=b'~') && !matches!(byte, b'#' | b'/' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'%') {
            buf.push(byte);
        } else {
            buf.push(b'#');
            buf.push_hex(byte);
        }
    }
}

fn write_string(buf: &mut Vec<u8>, s: &[u8]) {
    if s.iter().any(|&b| matches!(b, b'\\' | b'(' | b')' | b'\r')) {
        buf.push(b'<');
        for &b in s {
            buf.push_hex(b);
        }
        buf.push(b'>');
    } else {
        buf.push(b'(');
        buf.push_bytes(s);
        buf.push(b')');
    }
}

/// Write `obj` (not as an indirect object, just its value) into `buf`.
pub fn write_object(buf: &mut Vec<u8>, obj: &Object) {
    match obj {
        Object::Null => buf.push_bytes(b"null"),
        Object::Boolean(b) => buf.push_bytes(if *b { b"true" } else { b"false" }),
        Object::Integer(i) => buf.push_int(*i),
        Object::Real(r) => buf.push_float(*r),
        Object::Name(n) => write_name(buf, n),
        Object::String(s) => write_string(buf, s),
        Object::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i != 0 {
                    buf.push(b' ');
                }
                write_object(buf, item);
            }
            buf.push(b']');
        }
        Object::Dictionary(dict) => write_dict(buf, dict),
        Object::Stream(dict, data) => {
            write_dict(buf, dict);
            buf.push_bytes(b"\nstream\n");
            buf.push_bytes(data);
            buf.push_bytes(b"\nendstream");
        }
        Object::Reference(r) => {
            buf.push_int(r.num as i64);
            buf.push(b' ');
            buf.push_int(r.gen as i64);
            buf.push_bytes(b" R");
        }
    }
}

fn write_dict(buf: &mut Vec<u8>, dict: &Dict) {
    buf.push_bytes(b"<<");
    for (key, value) in dict.iter() {
        buf.push(b'\n');
        write_name(buf, key);
        buf.push(b' ');
        write_object(buf, value);
    }
    if dict.len() != 0 {
        buf.push(b'\n');
    }
    buf.push_bytes(b">>");
}

/// Render `obj` as the indirect object `r num gen obj ... endobj`.
///
/// A stream's `/Length` is computed here, overwriting (or inserting, if
/// absent) the dict's `Length` entry so it is always correct.
pub fn render_indirect(r: ObjRef, obj: &Object) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push_int(r.num as i64);
    buf.push(b' ');
    buf.push_int(r.gen as i64);
    buf.push_bytes(b" obj\n");

    match obj {
        Object::Stream(dict, data) => {
            let mut dict = dict.clone();
            dict.insert("Length", Object::Integer(data.len() as i64));
            write_object(&mut buf, &Object::Stream(dict, data.clone()));
        }
        other => write_object(&mut buf, other),
    }

    buf.push_bytes(b"\nendobj\n");
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_reals_render_with_decimal_points() {
        let mut buf = Vec::new();
        write_object(&mut buf, &Object::Real(3.0));
        assert_eq!(buf, b"3.0");

        let mut buf = Vec::new();
        write_object(&mut buf, &Object::Real(0.25));
        assert_eq!(buf, b"0.25");
    }

    #[test]
    fn names_escape_delimiters() {
        let mut buf = Vec::new();
        write_name(&mut buf, "A#B");
        assert_eq!(buf, b"/A#23B");
    }

    #[test]
    fn dict_renders_keys_in_insertion_order() {
        let mut d = Dict::new();
        d.insert("FunctionType", Object::Integer(2));
        d.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
        let mut buf = Vec::new();
        write_object(&mut buf, &Object::Dictionary(d));
        assert_eq!(
            buf,
            b"<<\n/FunctionType 2\n/Domain [0.0 1.0]\n>>".to_vec()
        );
    }

    #[test]
    fn stream_includes_computed_length() {
        let mut d = Dict::new();
        d.insert("FunctionType", Object::Integer(4));
        let bytes = render_indirect(ObjRef::new(1, 0), &Object::Stream(d, b"{ add }".to_vec()));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("/Length 7"));
        assert!(text.starts_with("1 0 obj\n"));
        assert!(text.trim_end().ends_with("endobj"));
    }
}
