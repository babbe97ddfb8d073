//! Type 2: exponential interpolation functions.

use crate::error::{InvalidFunction, ReadError};
use crate::math::{clip, is_range};
use crate::object::{get_float_array, get_number, Dict, Object};

/// An exponential interpolation (`FunctionType 2`) function:
/// `f(x) = C0 + x^N * (C1 - C0)`, evaluated componentwise over `C0`/`C1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialFunction {
    domain: (f64, f64),
    range: Option<Vec<(f64, f64)>>,
    c0: Vec<f64>,
    c1: Vec<f64>,
    n: f64,
}

impl ExponentialFunction {
    /// Build a function directly from its components, bypassing `read`'s
    /// dictionary parsing. Used by other modules' tests to construct a
    /// child function without a surrounding PDF object graph.
    #[cfg(test)]
    pub(crate) fn new(domain: (f64, f64), range: Option<Vec<(f64, f64)>>, c0: Vec<f64>, c1: Vec<f64>, n: f64) -> Self {
        Self { domain, range, c0, c1, n }
    }

    /// Number of output values (`C0`/`C1`'s shared length).
    pub fn n_out(&self) -> usize {
        self.c0.len()
    }

    /// Evaluate at the single input `x`.
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        debug_assert_eq!(input.len(), 1, "input vector must match the declared input shape");
        let x = clip(input[0], self.domain.0, self.domain.1);
        let mut out: Vec<f64> = self
            .c0
            .iter()
            .zip(&self.c1)
            .map(|(&c0, &c1)| c0 + x.powf(self.n) * (c1 - c0))
            .collect();
        if let Some(range) = &self.range {
            for (v, &(lo, hi)) in out.iter_mut().zip(range) {
                *v = clip(*v, lo, hi);
            }
        }
        out
    }

    /// Check every structural invariant a Type 2 dictionary must satisfy.
    pub fn validate(&self) -> Result<(), InvalidFunction> {
        let err = |field, message: &str| InvalidFunction::new(2, field, message.to_string());

        if !is_range(self.domain.0, self.domain.1) {
            return Err(err("Domain", "must be a valid [min, max] pair"));
        }
        if self.c0.is_empty() || self.c0.len() != self.c1.len() {
            return Err(err("C0", "must be non-empty and the same length as C1"));
        }
        if !self.n.is_finite() {
            return Err(err("N", "must be finite"));
        }
        if self.n < 0.0 && self.domain.0 <= 0.0 {
            return Err(err("Domain", "must be positive when N is negative"));
        }
        if self.n.fract() != 0.0 && self.domain.0 < 0.0 {
            return Err(err("Domain", "must be non-negative when N is not an integer"));
        }
        if let Some(range) = &self.range {
            if range.len() != self.c0.len() || range.iter().any(|&(a, b)| !is_range(a, b)) {
                return Err(err("Range", "must have one valid [min, max] pair per output value"));
            }
        }
        Ok(())
    }

    /// Read a Type 2 function from its dictionary.
    pub fn read(dict: &Dict) -> Result<Self, ReadError> {
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
        let c0 = match dict.get("C0") {
            Some(Object::Array(items)) => items.iter().map(|o| o.as_number().unwrap_or(0.0)).collect(),
            _ => vec![0.0],
        };
        let c1 = match dict.get("C1") {
            Some(Object::Array(items)) => items.iter().map(|o| o.as_number().unwrap_or(0.0)).collect(),
            _ => vec![1.0],
        };
        let n = get_number(dict, "N")?;

        let f = ExponentialFunction { domain: (domain[0], domain[1]), range, c0, c1, n };
        f.validate()?;
        Ok(f)
    }

    /// Render this function back into its PDF dictionary form.
    pub fn to_object(&self) -> Object {
        let mut dict = Dict::new();
        dict.insert("FunctionType", Object::Integer(2));
        dict.insert("Domain", Object::Array(vec![Object::Real(self.domain.0), Object::Real(self.domain.1)]));
        if let Some(range) = &self.range {
            dict.insert(
                "Range",
                Object::Array(range.iter().flat_map(|&(a, b)| [Object::Real(a), Object::Real(b)]).collect()),
            );
        }
        if self.c0 != [0.0] {
            dict.insert("C0", Object::Array(self.c0.iter().map(|&v| Object::Real(v)).collect()));
        }
        if self.c1 != [1.0] {
            dict.insert("C1", Object::Array(self.c1.iter().map(|&v| Object::Real(v)).collect()));
        }
        dict.insert("N", Object::Real(self.n));
        Object::Dictionary(dict)
    }
}
