//! End-to-end tests exercising `Function::read`/`embed` round trips and
//! the cross-type behaviors unit tests inside each module don't cover.

use pdf_function::{CycleChecker, Dict, Function, Limits, Object, ObjRef, ObjectWriter, ReadError, Resolve, Version};

struct Document {
    objects: std::collections::HashMap<ObjRef, Object>,
    next_id: u32,
}

impl Document {
    fn new() -> Self {
        Self { objects: std::collections::HashMap::new(), next_id: 1 }
    }
}

impl Resolve for Document {
    fn resolve(&self, obj: &Object) -> Result<Object, ReadError> {
        match obj {
            Object::Reference(r) => self.objects.get(r).cloned().ok_or(ReadError::MissingKey("object")),
            other => Ok(other.clone()),
        }
    }

    fn version(&self) -> Version {
        Version(1, 7)
    }
}

impl ObjectWriter for Document {
    fn alloc(&mut self) -> ObjRef {
        let r = ObjRef::new(self.next_id, 0);
        self.next_id += 1;
        r
    }

    fn put(&mut self, r: ObjRef, obj: Object) {
        self.objects.insert(r, obj);
    }
}

fn exponential_dict(n: f64) -> Object {
    let mut dict = Dict::new();
    dict.insert("FunctionType", Object::Integer(2));
    dict.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
    dict.insert("C0", Object::Array(vec![Object::Real(0.0)]));
    dict.insert("C1", Object::Array(vec![Object::Real(1.0)]));
    dict.insert("N", Object::Real(n));
    Object::Dictionary(dict)
}

fn sampled_stream() -> Object {
    let mut dict = Dict::new();
    dict.insert("FunctionType", Object::Integer(0));
    dict.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
    dict.insert("Range", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
    dict.insert("Size", Object::Array(vec![Object::Integer(2)]));
    dict.insert("BitsPerSample", Object::Integer(8));
    Object::Stream(dict, vec![0x00, 0xFF])
}

fn calculator_stream(program: &str) -> Object {
    let mut dict = Dict::new();
    dict.insert("FunctionType", Object::Integer(4));
    dict.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
    dict.insert("Range", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
    Object::Stream(dict, program.as_bytes().to_vec())
}

#[test]
fn exponential_function_round_trips_through_embed_and_read() {
    let limits = Limits::default();
    let mut doc = Document::new();
    let mut checker = CycleChecker::new();

    let original = Function::read(&doc, &exponential_dict(2.0), &limits, &mut checker).unwrap();
    let r = original.embed(&mut doc);
    let stored = doc.objects.get(&r).unwrap().clone();

    let mut checker = CycleChecker::new();
    let round_tripped = Function::read(&doc, &stored, &limits, &mut checker).unwrap();
    assert_eq!(round_tripped.apply(&[0.5], &limits), original.apply(&[0.5], &limits));
}

#[test]
fn sampled_function_round_trips_through_embed_and_read() {
    let limits = Limits::default();
    let mut doc = Document::new();
    let mut checker = CycleChecker::new();

    let original = Function::read(&doc, &sampled_stream(), &limits, &mut checker).unwrap();
    let r = original.embed(&mut doc);
    let stored = doc.objects.get(&r).unwrap().clone();

    let mut checker = CycleChecker::new();
    let round_tripped = Function::read(&doc, &stored, &limits, &mut checker).unwrap();
    assert_eq!(round_tripped.apply(&[0.25], &limits), original.apply(&[0.25], &limits));
}

#[test]
fn calculator_function_round_trips_through_embed_and_read() {
    let limits = Limits::default();
    let mut doc = Document::new();
    let mut checker = CycleChecker::new();

    let original = Function::read(&doc, &calculator_stream("dup mul"), &limits, &mut checker).unwrap();
    let r = original.embed(&mut doc);
    let stored = doc.objects.get(&r).unwrap().clone();

    let mut checker = CycleChecker::new();
    let round_tripped = Function::read(&doc, &stored, &limits, &mut checker).unwrap();
    assert_eq!(round_tripped.apply(&[0.5], &limits), vec![0.25]);
}

#[test]
fn stitching_function_resolves_indirect_children_and_round_trips() {
    let limits = Limits::default();
    let mut doc = Document::new();

    let child_a = doc.alloc();
    doc.put(child_a, exponential_dict(1.0));
    let child_b = doc.alloc();
    doc.put(child_b, exponential_dict(1.0));

    let mut dict = Dict::new();
    dict.insert("FunctionType", Object::Integer(3));
    dict.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
    dict.insert(
        "Functions",
        Object::Array(vec![Object::Reference(child_a), Object::Reference(child_b)]),
    );
    dict.insert("Bounds", Object::Array(vec![Object::Real(0.5)]));
    dict.insert(
        "Encode",
        Object::Array(vec![
            Object::Real(0.0),
            Object::Real(1.0),
            Object::Real(0.0),
            Object::Real(1.0),
        ]),
    );
    let top = Object::Dictionary(dict);

    let mut checker = CycleChecker::new();
    let stitched = Function::read(&doc, &top, &limits, &mut checker).unwrap();
    assert_eq!(stitched.apply(&[0.25], &limits), vec![0.5]);
    assert_eq!(stitched.apply(&[0.75], &limits), vec![0.5]);

    let r = stitched.embed(&mut doc);
    let stored = doc.objects.get(&r).unwrap().clone();
    let mut checker = CycleChecker::new();
    let round_tripped = Function::read(&doc, &stored, &limits, &mut checker).unwrap();
    assert_eq!(round_tripped.apply(&[0.25], &limits), stitched.apply(&[0.25], &limits));
}

#[test]
fn cyclic_stitching_function_is_rejected() {
    let limits = Limits::default();
    let mut doc = Document::new();

    let a = doc.alloc();
    let mut dict = Dict::new();
    dict.insert("FunctionType", Object::Integer(3));
    dict.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
    dict.insert("Functions", Object::Array(vec![Object::Reference(a)]));
    dict.insert("Bounds", Object::Array(vec![]));
    dict.insert("Encode", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
    doc.put(a, Object::Dictionary(dict));

    let mut checker = CycleChecker::new();
    let err = Function::read(&doc, &Object::Reference(a), &limits, &mut checker).unwrap_err();
    assert_eq!(err, ReadError::Cycle);
}

#[test]
fn every_function_type_is_independently_cloneable() {
    let limits = Limits::default();
    let doc = Document::new();
    let mut checker = CycleChecker::new();
    let f = Function::read(&doc, &calculator_stream("dup mul"), &limits, &mut checker).unwrap();
    let cloned = f.clone();
    assert_eq!(f.apply(&[3.0], &limits), cloned.apply(&[3.0], &limits));
}

struct OldDocument;

impl Resolve for OldDocument {
    fn resolve(&self, obj: &Object) -> Result<Object, ReadError> {
        Ok(obj.clone())
    }

    fn version(&self) -> Version {
        Version(1, 1)
    }
}

#[test]
fn old_document_version_rejects_every_function_type() {
    let limits = Limits::default();
    let doc = OldDocument;
    let mut checker = CycleChecker::new();
    let err = Function::read(&doc, &exponential_dict(2.0), &limits, &mut checker).unwrap_err();
    assert_eq!(err, ReadError::VersionTooOld { required: Version(1, 3), have: Version(1, 1) });

    let mut checker = CycleChecker::new();
    let err = Function::read(&doc, &sampled_stream(), &limits, &mut checker).unwrap_err();
    assert_eq!(err, ReadError::VersionTooOld { required: Version(1, 2), have: Version(1, 1) });
}

#[test]
fn limits_default_round_trips_through_field_access() {
    let limits = Limits::default();
    assert_eq!(limits.max_sample_bits, 1 << 23);
    assert_eq!(limits.max_program_size, 16 * 1024);
    assert_eq!(limits.max_nesting_depth, 255);
    assert_eq!(limits.max_stack_depth, 500);
}
