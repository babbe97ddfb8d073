//! Type 3: stitching functions.

use crate::error::{InvalidFunction, ReadError};
use crate::limits::Limits;
use crate::math::{clip, interpolate as affine, is_finite_pair, is_range};
use crate::object::{get_array, get_float_array, CycleChecker, Dict, Object, ObjRef, Resolve};
use crate::Function;

/// A stitching (`FunctionType 3`) function: dispatches a single input
/// across `k` child functions, each owning a subdomain of `Domain`.
#[derive(Debug, Clone, PartialEq)]
pub struct StitchingFunction {
    domain: (f64, f64),
    range: Option<Vec<(f64, f64)>>,
    functions: Vec<Box<Function>>,
    /// `k - 1` interior subdomain boundaries, non-decreasing.
    bounds: Vec<f64>,
    /// One `[min, max]` encode pair per child, mapping its subdomain onto
    /// that child's own `Domain`.
    encode: Vec<(f64, f64)>,
}

impl StitchingFunction {
    /// Number of child functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether this function has no children (always false for a valid
    /// function; kept for the `len`/`is_empty` pair clippy expects).
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn bounds_of(&self, i: usize) -> (f64, f64) {
        let low = if i == 0 { self.domain.0 } else { self.bounds[i - 1] };
        let high = if i == self.functions.len() - 1 { self.domain.1 } else { self.bounds[i] };
        (low, high)
    }

    fn subdomain_index(&self, x: f64) -> usize {
        // Degenerate case: when the domain's lower bound coincides with
        // the first subdomain boundary, interval 0 collapses to the
        // single point `x_min`; the next interval is open on the left.
        // The general `x < b` scan below would otherwise miss `x ==
        // bounds[0] == x_min` entirely (falling through to the last
        // interval), so it is special-cased here.
        if let Some(&first_bound) = self.bounds.first() {
            if self.domain.0 == first_bound && x <= self.domain.0 {
                return 0;
            }
        }
        self.bounds.iter().position(|&b| x < b).unwrap_or(self.functions.len() - 1)
    }

    /// Evaluate at the single input `x`.
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        debug_assert_eq!(input.len(), 1, "input vector must match the declared input shape");
        let x = clip(input[0], self.domain.0, self.domain.1);
        let i = self.subdomain_index(x);
        let (low, high) = self.bounds_of(i);
        let (e_lo, e_hi) = self.encode[i];
        let encoded = affine(x, low, high, e_lo, e_hi);

        let mut out = self.functions[i].apply(&[encoded]);
        if let Some(range) = &self.range {
            for (v, &(lo, hi)) in out.iter_mut().zip(range) {
                *v = clip(*v, lo, hi);
            }
        }
        out
    }

    /// Check every structural invariant a Type 3 dictionary must satisfy,
    /// including that each child function validates in turn.
    pub fn validate(&self, limits: &Limits) -> Result<(), InvalidFunction> {
        let err = |field, message: &str| InvalidFunction::new(3, field, message.to_string());

        if !is_range(self.domain.0, self.domain.1) {
            return Err(err("Domain", "must be a valid [min, max] pair"));
        }
        if self.functions.is_empty() {
            return Err(err("Functions", "must be non-empty"));
        }
        if self.bounds.len() != self.functions.len() - 1 {
            return Err(err("Bounds", "must have exactly one fewer entry than Functions"));
        }
        if self.bounds.iter().any(|b| !b.is_finite()) {
            return Err(err("Bounds", "every entry must be finite"));
        }
        if self.bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(err("Bounds", "must be strictly increasing"));
        }
        if let Some(&first) = self.bounds.first() {
            if first < self.domain.0 {
                return Err(err("Bounds", "must lie within Domain"));
            }
        }
        if let Some(&last) = self.bounds.last() {
            if last > self.domain.1 {
                return Err(err("Bounds", "must lie within Domain"));
            }
        }
        if self.encode.len() != self.functions.len() || self.encode.iter().any(|&(a, b)| !is_finite_pair(a, b)) {
            return Err(err("Encode", "must have one valid [min, max] pair per child function"));
        }
        if let Some(range) = &self.range {
            if range.iter().any(|&(a, b)| !is_range(a, b)) {
                return Err(err("Range", "every entry must be a valid [min, max] pair"));
            }
        }
        let n_out = self.functions[0].shape().1;
        for f in &self.functions {
            f.validate(limits)?;
            if f.shape().0 != 1 {
                return Err(err("Functions", "every child function must take exactly one input"));
            }
            if f.shape().1 != n_out {
                return Err(err("Functions", "every child function must produce the same number of outputs"));
            }
        }
        if let Some(range) = &self.range {
            if range.len() != n_out {
                return Err(err("Range", "must have one entry per child function output"));
            }
        }
        Ok(())
    }

    /// Read a Type 3 function from its dictionary, recursively resolving
    /// and reading each child function.
    ///
    /// `checker` tracks the recursion path so a cyclic function graph
    /// (a child that, transitively, is this same indirect object) is
    /// rejected instead of recursing forever.
    pub fn read(
        resolver: &impl Resolve,
        dict: &Dict,
        limits: &Limits,
        checker: &mut CycleChecker,
    ) -> Result<Self, ReadError> {
        let domain = get_float_array(dict, "Domain")?;
        if domain.len() != 2 {
            return Err(ReadError::UnexpectedType { expected: "2-element Domain", found: "other length" });
        }
        let range = match dict.get("Range") {
            Some(Object::Array(items)) => {
                let flat: Vec<f64> = items.iter().map(|o| o.as_number().unwrap_or(0.0)).collect();
                Some(flat.chunks_exact(2).map(|c| (c[0], c[1])).collect())
            }
            _ => None,
        };
        let fn_refs = get_array(dict, "Functions")?;
        if fn_refs.is_empty() {
            return Err(ReadError::MissingChildFunctions);
        }
        let mut functions = Vec::with_capacity(fn_refs.len());
        for child in fn_refs {
            functions.push(Box::new(read_child(resolver, child, limits, checker)?));
        }
        let k = functions.len();

        let raw_bounds = get_float_array(dict, "Bounds").unwrap_or_default();
        let bounds = crate::repair::truncate(3, "Bounds", raw_bounds, k.saturating_sub(1));
        let encode_flat = get_float_array(dict, "Encode")?;
        let raw_encode: Vec<(f64, f64)> = encode_flat.chunks_exact(2).map(|c| (c[0], c[1])).collect();
        let encode = crate::repair::repair_pairs(3, "Encode", raw_encode, k, |_| (0.0, 1.0));

        let f = StitchingFunction { domain: (domain[0], domain[1]), range, functions, bounds, encode };
        f.validate(limits).map_err(ReadError::Invalid)?;
        Ok(f)
    }

    /// Render this function back into its PDF dictionary form.
    ///
    /// `child_refs` must hold one already-embedded reference per child,
    /// in the same order as [`Self::len`] — `crate::Function::embed`
    /// embeds each child first and passes the resulting references here.
    pub fn to_object(&self, child_refs: &[ObjRef]) -> Object {
        let mut dict = Dict::new();
        dict.insert("FunctionType", Object::Integer(3));
        dict.insert("Domain", Object::Array(vec![Object::Real(self.domain.0), Object::Real(self.domain.1)]));
        if let Some(range) = &self.range {
            dict.insert(
                "Range",
                Object::Array(range.iter().flat_map(|&(a, b)| [Object::Real(a), Object::Real(b)]).collect()),
            );
        }
        dict.insert(
            "Functions",
            Object::Array(child_refs.iter().map(|&r| Object::Reference(r)).collect()),
        );
        dict.insert("Bounds", Object::Array(self.bounds.iter().map(|&b| Object::Real(b)).collect()));
        dict.insert(
            "Encode",
            Object::Array(self.encode.iter().flat_map(|&(a, b)| [Object::Real(a), Object::Real(b)]).collect()),
        );
        Object::Dictionary(dict)
    }

    /// This function's children, in order.
    pub fn functions(&self) -> &[Box<Function>] {
        &self.functions
    }
}

fn read_child(
    resolver: &impl Resolve,
    child: &Object,
    limits: &Limits,
    checker: &mut CycleChecker,
) -> Result<Function, ReadError> {
    match child {
        Object::Reference(r) => {
            checker.enter(*r)?;
            let resolved = resolver.resolve(child)?;
            let result = Function::read(resolver, &resolved, limits, checker);
            checker.exit(*r);
            result
        }
        other => Function::read(resolver, other, limits, checker),
    }
}
