//! The top-level `Function` enum and PDF object-graph orchestration.

use crate::error::{InvalidFunction, ReadError, Version};
use crate::limits::Limits;
use crate::object::{check_version, get_dict, get_integer, CycleChecker, Dict, Object, ObjRef, ObjectWriter, Resolve};
use crate::type0::Type0Function;
use crate::type2::ExponentialFunction;
use crate::type3::StitchingFunction;
use crate::type4::PostScriptFunction;

/// One of the four PDF function types, each reachable as its own variant.
///
/// `apply` takes a `&Limits` because Type 4 recompiles (or reuses its
/// cache) under that budget on every call; the other three variants
/// ignore it at evaluation time; they already baked their ceilings in at
/// `read`/`validate` time.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    /// `FunctionType 0`: a sampled function.
    Type0(Type0Function),
    /// `FunctionType 2`: an exponential interpolation function.
    Type2(ExponentialFunction),
    /// `FunctionType 3`: a stitching function.
    Type3(StitchingFunction),
    /// `FunctionType 4`: a PostScript calculator function.
    Type4(PostScriptFunction),
}

impl Function {
    /// The PDF `FunctionType` integer for this variant.
    pub fn function_type(&self) -> i32 {
        match self {
            Function::Type0(_) => 0,
            Function::Type2(_) => 2,
            Function::Type3(_) => 3,
            Function::Type4(_) => 4,
        }
    }

    /// `(n_in, n_out)`: the number of input and output values this
    /// function expects/produces.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Function::Type0(f) => (f.n_in(), f.n_out()),
            Function::Type2(f) => (1, f.n_out()),
            Function::Type3(f) => (1, f_range_len(f)),
            Function::Type4(f) => (f.n_in(), f.n_out()),
        }
    }

    /// Evaluate this function at `input`.
    ///
    /// `input.len()` must equal `self.shape().0`; the returned vector's
    /// length equals `self.shape().1`.
    pub fn apply(&self, input: &[f64], limits: &Limits) -> Vec<f64> {
        match self {
            Function::Type0(f) => f.apply(input),
            Function::Type2(f) => f.apply(input),
            Function::Type3(f) => f.apply(input),
            Function::Type4(f) => f.apply(input, limits),
        }
    }

    /// Check every structural invariant this function's dictionary must
    /// satisfy (recursing into children for Type 3).
    pub fn validate(&self, limits: &Limits) -> Result<(), InvalidFunction> {
        match self {
            Function::Type0(f) => f.validate(limits),
            Function::Type2(f) => f.validate(),
            Function::Type3(f) => f.validate(limits),
            Function::Type4(f) => f.validate(limits),
        }
    }

    /// Resolve `object` (a dict or stream, following one level of
    /// indirection first) into a [`Function`], dispatching on
    /// `FunctionType`.
    ///
    /// `checker` threads a Type 3 function's recursion path through its
    /// children; callers evaluating a standalone function pass a fresh
    /// [`CycleChecker::new`].
    pub fn read(
        resolver: &impl Resolve,
        object: &Object,
        limits: &Limits,
        checker: &mut CycleChecker,
    ) -> Result<Self, ReadError> {
        let resolved = resolver.resolve(object)?;
        let function_type = get_integer(get_dict(&resolved)?, "FunctionType")? as i32;

        let required = match function_type {
            0 => Some(Version(1, 2)),
            2 | 3 | 4 => Some(Version(1, 3)),
            _ => None,
        };
        if let Some(required) = required {
            check_version(resolver.version(), required)?;
        }

        match (function_type, &resolved) {
            (0, Object::Stream(dict, body)) => Ok(Function::Type0(Type0Function::read(dict, body, limits)?)),
            (2, Object::Dictionary(dict)) => Ok(Function::Type2(ExponentialFunction::read(dict)?)),
            (3, Object::Dictionary(dict)) => {
                Ok(Function::Type3(StitchingFunction::read(resolver, dict, limits, checker)?))
            }
            (4, Object::Stream(dict, body)) => Ok(Function::Type4(PostScriptFunction::read(dict, body, limits)?)),
            (0, _) | (4, _) => Err(ReadError::UnexpectedFunctionType(function_type)),
            (2, _) | (3, _) => Err(ReadError::UnexpectedFunctionType(function_type)),
            (other, _) => Err(ReadError::UnknownFunctionType(other)),
        }
    }

    /// Write this function (and, for Type 3, its children first) through
    /// `writer`, returning the reference it was stored at.
    pub fn embed(&self, writer: &mut impl ObjectWriter) -> ObjRef {
        let object = match self {
            Function::Type0(f) => f.to_object(),
            Function::Type2(f) => f.to_object(),
            Function::Type3(f) => {
                let child_refs: Vec<ObjRef> = f.functions().iter().map(|child| child.embed(writer)).collect();
                f.to_object(&child_refs)
            }
            Function::Type4(f) => f.to_object(),
        };
        let r = writer.alloc();
        writer.put(r, object);
        r
    }
}


fn f_range_len(f: &StitchingFunction) -> usize {
    // A stitching function's own output arity is its first child's, since
    // `Range`, when absent, is inherited rather than independently fixed.
    f.functions().first().map_or(0, |child| child.shape().1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Version;

    struct NullResolver;

    impl Resolve for NullResolver {
        fn resolve(&self, obj: &Object) -> Result<Object, ReadError> {
            Ok(obj.clone())
        }
        fn version(&self) -> Version {
            Version(1, 7)
        }
    }

    fn exponential_dict() -> Object {
        let mut dict = Dict::new();
        dict.insert("FunctionType", Object::Integer(2));
        dict.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
        dict.insert("C0", Object::Array(vec![Object::Real(0.0)]));
        dict.insert("C1", Object::Array(vec![Object::Real(1.0)]));
        dict.insert("N", Object::Real(1.0));
        Object::Dictionary(dict)
    }

    #[test]
    fn reads_and_applies_a_type_2_function() {
        let resolver = NullResolver;
        let mut checker = CycleChecker::new();
        let f = Function::read(&resolver, &exponential_dict(), &Limits::default(), &mut checker).unwrap();
        assert_eq!(f.function_type(), 2);
        assert_eq!(f.shape(), (1, 1));
        assert_eq!(f.apply(&[0.5], &Limits::default()), vec![0.5]);
    }

    #[test]
    fn unknown_function_type_is_rejected() {
        let resolver = NullResolver;
        let mut checker = CycleChecker::new();
        let mut dict = Dict::new();
        dict.insert("FunctionType", Object::Integer(99));
        let err = Function::read(&resolver, &Object::Dictionary(dict), &Limits::default(), &mut checker).unwrap_err();
        assert_eq!(err, ReadError::UnknownFunctionType(99));
    }

    #[test]
    fn dict_typed_object_rejects_stream_only_type() {
        let resolver = NullResolver;
        let mut checker = CycleChecker::new();
        let mut dict = Dict::new();
        dict.insert("FunctionType", Object::Integer(0));
        let err = Function::read(&resolver, &Object::Dictionary(dict), &Limits::default(), &mut checker).unwrap_err();
        assert_eq!(err, ReadError::UnexpectedFunctionType(0));
    }

    #[test]
    fn a_validate_failure_surfaces_as_read_error_invalid() {
        let resolver = NullResolver;
        let mut checker = CycleChecker::new();
        let mut dict = Dict::new();
        dict.insert("FunctionType", Object::Integer(2));
        dict.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
        dict.insert("C0", Object::Array(vec![Object::Real(0.0), Object::Real(0.0)]));
        dict.insert("C1", Object::Array(vec![Object::Real(1.0)]));
        dict.insert("N", Object::Real(1.0));
        let err = Function::read(&resolver, &Object::Dictionary(dict), &Limits::default(), &mut checker).unwrap_err();
        assert!(matches!(err, ReadError::Invalid(_)));
    }
}
