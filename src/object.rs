//! A minimal stand-in for a host's PDF object graph.
//!
//! The real PDF object model — the lexer, the cross-reference table,
//! encryption, object streams — is out of scope for this crate. What
//! *is* in scope is the small interface the
//! function evaluators read and write through, so this module defines
//! just enough of an `Object` enum, a `Resolve` trait, and an
//! `ObjectWriter` trait to make the rest of the crate independently
//! testable. A host with a real PDF parser implements [`Resolve`] and
//! [`ObjectWriter`] against its own object graph instead of this one.

use std::collections::HashSet;

use crate::error::{ReadError, Version};

/// An indirect object reference: object number + generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef {
    /// The object number.
    pub num: u32,
    /// The generation number.
    pub gen: u16,
}

impl ObjRef {
    /// Create a reference to object `num`, generation `gen`.
    pub fn new(num: u32, gen: u16) -> Self {
        Self { num, gen }
    }
}

/// An insertion-ordered string-keyed dictionary.
///
/// Ordered so that re-embedding a function we just read reproduces the
/// same key order a hand-written PDF producer would use, which is what
/// makes the `embed`/`read` round-trip byte-for-byte reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict {
    entries: Vec<(String, Object)>,
}

impl Dict {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`, preserving the position of an existing
    /// key and appending new ones in call order.
    pub fn insert(&mut self, key: impl Into<String>, value: Object) -> &mut Self {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
        self
    }

    /// Look up `key`.
    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A PDF object, restricted to the variants functions actually need.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// `null`.
    Null,
    /// `true`/`false`.
    Boolean(bool),
    /// An integer numeric object.
    Integer(i64),
    /// A real numeric object.
    Real(f64),
    /// A `/Name`.
    Name(String),
    /// A literal or hex string, stored as raw bytes.
    String(Vec<u8>),
    /// An array.
    Array(Vec<Object>),
    /// A dictionary.
    Dictionary(Dict),
    /// A stream: its dictionary and its (already decoded, per
    /// [`decode_stream`]) body bytes.
    Stream(Dict, Vec<u8>),
    /// An indirect reference, to be followed via [`Resolve::resolve`].
    Reference(ObjRef),
}

impl Object {
    /// This object as an `f64`, accepting both `Integer` and `Real`.
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Object::Integer(i) => Some(i as f64),
            Object::Real(r) => Some(r),
            _ => None,
        }
    }

    /// This object as an `i64`, accepting only `Integer`.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Object::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// This object's array, if it is one.
    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    /// This object's name, if it is one.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    /// This object's dictionary: either a bare dict, or a stream's dict.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream(d, _) => Some(d),
            _ => None,
        }
    }

    /// This object's stream dict and body, if it is a stream.
    pub fn as_stream(&self) -> Option<(&Dict, &[u8])> {
        match self {
            Object::Stream(d, b) => Some((d, b)),
            _ => None,
        }
    }
}

/// Resolves indirect references against a host's object graph.
pub trait Resolve {
    /// Follow one level of indirection. Non-reference objects resolve to
    /// a clone of themselves.
    fn resolve(&self, obj: &Object) -> Result<Object, ReadError>;

    /// The PDF version the host document declares, used by
    /// [`check_version`].
    fn version(&self) -> Version;
}

/// Allocates and stores indirect objects on write.
pub trait ObjectWriter {
    /// Reserve a fresh, unused reference.
    fn alloc(&mut self) -> ObjRef;

    /// Store `obj` at `r`, overwriting anything previously stored there.
    fn put(&mut self, r: ObjRef, obj: Object);
}

/// Tracks indirect references visited while recursively resolving a Type
/// 3 stitching function's children, so a cyclic function graph is caught
/// instead of recursing forever.
#[derive(Debug, Default)]
pub struct CycleChecker {
    seen: HashSet<ObjRef>,
}

impl CycleChecker {
    /// A fresh, empty checker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `r` is being entered. Returns an error if `r` was
    /// already on the current recursion path.
    pub fn enter(&mut self, r: ObjRef) -> Result<(), ReadError> {
        if !self.seen.insert(r) {
            return Err(ReadError::Cycle);
        }
        Ok(())
    }

    /// Record that `r`'s subtree has been fully resolved, so a sibling
    /// branch may reference it without tripping the cycle check.
    pub fn exit(&mut self, r: ObjRef) {
        self.seen.remove(&r);
    }
}

/// Decode a stream's body.
///
/// This crate's own [`Object::Stream`] bodies are stored pre-decoded
/// (filter decoding is squarely a full PDF reader's job and out of
/// scope here), so the default implementation
/// only enforces `limit`. A host with real filters plugs in its own
/// version of this seam.
pub fn decode_stream(body: &[u8], limit: usize) -> Result<&[u8], ReadError> {
    if body.len() > limit {
        return Err(ReadError::ProgramTooLarge);
    }
    Ok(body)
}

/// Require the host document to declare at least `required`.
pub fn check_version(have: Version, required: Version) -> Result<(), ReadError> {
    if have < required {
        return Err(ReadError::VersionTooOld { required, have });
    }
    Ok(())
}

/// `get_integer` from §6: fetch and require an `Integer` field.
pub fn get_integer(dict: &Dict, key: &'static str) -> Result<i64, ReadError> {
    dict.get(key)
        .and_then(Object::as_integer)
        .ok_or(ReadError::MissingKey(key))
}

/// `get_number` from §6: fetch and require a numeric (`Integer` or
/// `Real`) field.
pub fn get_number(dict: &Dict, key: &'static str) -> Result<f64, ReadError> {
    dict.get(key)
        .and_then(Object::as_number)
        .ok_or(ReadError::MissingKey(key))
}

/// `get_name` from §6.
pub fn get_name<'a>(dict: &'a Dict, key: &'static str) -> Result<&'a str, ReadError> {
    dict.get(key)
        .and_then(Object::as_name)
        .ok_or(ReadError::MissingKey(key))
}

/// `get_array` from §6.
pub fn get_array<'a>(dict: &'a Dict, key: &'static str) -> Result<&'a [Object], ReadError> {
    dict.get(key)
        .and_then(Object::as_array)
        .ok_or(ReadError::MissingKey(key))
}

/// `get_float_array` from §6: an array whose elements are all numeric.
pub fn get_float_array(dict: &Dict, key: &'static str) -> Result<Vec<f64>, ReadError> {
    get_array(dict, key)?
        .iter()
        .map(|o| o.as_number().ok_or(ReadError::UnexpectedType {
            expected: "number",
            found: "non-number array element",
        }))
        .collect()
}

/// `get_dict` from §6.
pub fn get_dict(obj: &Object) -> Result<&Dict, ReadError> {
    obj.as_dict().ok_or(ReadError::UnexpectedType { expected: "dict", found: "other" })
}

/// `get_stream` from §6.
pub fn get_stream(obj: &Object) -> Result<(&Dict, &[u8]), ReadError> {
    obj.as_stream().ok_or(ReadError::UnexpectedType { expected: "stream", found: "other" })
}
