//! Type 4: PostScript calculator functions.

use std::cell::RefCell;

use crate::error::{InvalidFunction, ReadError, VmError};
use crate::limits::Limits;
use crate::math::{clip, is_range};
use crate::object::{get_float_array, Dict, Object};
use crate::value::Value;
use crate::vm::{self, Instruction};

/// A PostScript calculator (`FunctionType 4`) function.
///
/// Compiled bytecode and the evaluation stack are cached behind a
/// [`RefCell`] rather than recompiled/reallocated on every call — a
/// single-threaded reuse pattern, not a `Mutex`, since a [`Function`] is
/// `Clone`, not `Sync`-shared, across threads.
///
/// [`Function`]: crate::Function
#[derive(Debug, Clone)]
pub struct PostScriptFunction {
    domain: Vec<(f64, f64)>,
    range: Vec<(f64, f64)>,
    program: String,
    cache: RefCell<Option<Vec<Instruction>>>,
}

impl PartialEq for PostScriptFunction {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.range == other.range && self.program == other.program
    }
}

impl PostScriptFunction {
    /// Number of input variables.
    pub fn n_in(&self) -> usize {
        self.domain.len()
    }

    /// Number of output values.
    pub fn n_out(&self) -> usize {
        self.range.len()
    }

    /// Drop the compiled-bytecode cache, forcing the next [`Self::apply`]
    /// to recompile `program` from scratch.
    pub fn reset(&self) {
        *self.cache.borrow_mut() = None;
    }

    fn compiled(&self, limits: &Limits) -> Result<Vec<Instruction>, VmError> {
        if let Some(program) = self.cache.borrow().as_ref() {
            return Ok(program.clone());
        }
        let compiled = vm::compile_program(&self.program, limits)?;
        *self.cache.borrow_mut() = Some(compiled.clone());
        Ok(compiled)
    }

    /// Evaluate at `input`, which must have [`Self::n_in`] entries.
    ///
    /// A VM error (stack underflow, a domain error in `sqrt`/`ln`, ...)
    /// never reaches the caller: per the documented error-swallowing
    /// contract, it is logged and an all-zero output vector of
    /// [`Self::n_out`] entries is returned instead, clipped to `Range`
    /// like any other output.
    pub fn apply(&self, input: &[f64], limits: &Limits) -> Vec<f64> {
        debug_assert_eq!(input.len(), self.n_in(), "input vector must match the declared input shape");
        let clipped: Vec<f64> = input
            .iter()
            .enumerate()
            .map(|(i, &x)| clip(x, self.domain[i].0, self.domain[i].1))
            .collect();

        let result = self
            .compiled(limits)
            .and_then(|program| {
                let mut stack = Vec::new();
                vm::run(&program, &clipped, limits, &mut stack)?;
                Ok(stack)
            })
            .and_then(|stack| self.collect_outputs(stack));

        match result {
            Ok(out) => out,
            Err(e) => {
                log::warn!("Type 4 function evaluation failed, returning zeros: {e}");
                vec![0.0; self.n_out()]
            }
        }
    }

    /// Take the last `n_out` values off `stack`, padding with zero at the
    /// front if fewer than `n_out` remain (the program underflowed its own
    /// output count without the VM itself erroring).
    fn collect_outputs(&self, stack: Vec<Value>) -> Result<Vec<f64>, VmError> {
        let n_out = self.n_out();
        let have = stack.len().min(n_out);
        let missing = n_out - have;
        let start = stack.len() - have;
        let mut out = Vec::with_capacity(n_out);
        out.extend(std::iter::repeat(0.0).take(missing));
        for v in &stack[start..] {
            let x = v.as_f64().ok_or(VmError::TypeMismatch { expected: "number", found: v.tag() })?;
            out.push(x);
        }
        for (v, &(lo, hi)) in out.iter_mut().zip(&self.range) {
            *v = clip(*v, lo, hi);
        }
        Ok(out)
    }

    /// Check every structural invariant a Type 4 dictionary/stream must
    /// satisfy, including that the program compiles.
    pub fn validate(&self, limits: &Limits) -> Result<(), InvalidFunction> {
        let err = |field, message: &str| InvalidFunction::new(4, field, message.to_string());

        if self.domain.is_empty() || self.domain.iter().any(|&(a, b)| !is_range(a, b)) {
            return Err(err("Domain", "must be a non-empty list of valid [min, max] pairs"));
        }
        if self.range.is_empty() || self.range.iter().any(|&(a, b)| !is_range(a, b)) {
            return Err(err("Range", "must be a non-empty list of valid [min, max] pairs"));
        }
        self.compiled(limits).map_err(|e| err("program", &e.to_string()))?;
        Ok(())
    }

    /// Read a Type 4 function from its dictionary and (already-decoded)
    /// stream body.
    pub fn read(dict: &Dict, stream_body: &[u8], limits: &Limits) -> Result<Self, ReadError> {
        let domain = pairs(get_float_array(dict, "Domain")?);
        let range = pairs(get_float_array(dict, "Range")?);
        let body = crate::object::decode_stream(stream_body, limits.max_program_size)?;
        let program = String::from_utf8_lossy(strip_outer_braces(body)).into_owned();

        let f = PostScriptFunction { domain, range, program, cache: RefCell::new(None) };
        f.validate(limits)?;
        Ok(f)
    }

    /// Render this function back into its PDF dictionary/stream form.
    ///
    /// The program text is re-emitted exactly as stored, wrapped in a
    /// single enclosing `{ ... }` — the conventional PDF spelling, and
    /// the form [`Self::read`] accepts back unchanged.
    pub fn to_object(&self) -> Object {
        let mut dict = Dict::new();
        dict.insert("FunctionType", Object::Integer(4));
        dict.insert("Domain", flatten(&self.domain));
        dict.insert("Range", flatten(&self.range));
        let body = format!("{{ {} }}", self.program.trim()).into_bytes();
        Object::Stream(dict, body)
    }
}

fn strip_outer_braces(body: &[u8]) -> &[u8] {
    let trimmed = trim_ascii_whitespace(body);
    if trimmed.first() == Some(&b'{') && trimmed.last() == Some(&b'}') {
        trim_ascii_whitespace(&trimmed[1..trimmed.len() - 1])
    } else {
        trimmed
    }
}

fn trim_ascii_whitespace(mut b: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = b {
        if first.is_ascii_whitespace() {
            b = rest;
        } else {
            break;
        }
    }
    while let [rest @ .., last] = b {
        if last.is_ascii_whitespace() {
            b = rest;
        } else {
            break;
        }
    }
    b
}

fn pairs(flat: Vec<f64>) -> Vec<(f64, f64)> {
    flat.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

fn flatten(pairs: &[(f64, f64)]) -> Object {
    Object::Array(pairs.iter().flat_map(|&(a, b)| [Object::Real(a), Object::Real(b)]).collect())
}
