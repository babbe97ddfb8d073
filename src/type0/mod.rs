//! Type 0: sampled functions.

mod bits;
mod cubic;
mod linear;

use crate::error::{InvalidFunction, ReadError};
use crate::limits::Limits;
use crate::math::{clip, interpolate as affine, is_finite_pair, is_range};
use crate::object::{get_array, get_float_array, get_integer, Dict, Object};

const ALLOWED_BITS_PER_SAMPLE: [u32; 8] = [1, 2, 4, 8, 12, 16, 24, 32];

/// A sampled (`FunctionType 0`) function: an `m`-dimensional lookup table
/// of `n`-dimensional samples, interpolated multilinearly or with a
/// Catmull-Rom cubic spline.
#[derive(Debug, Clone, PartialEq)]
pub struct Type0Function {
    domain: Vec<(f64, f64)>,
    range: Vec<(f64, f64)>,
    size: Vec<u32>,
    bits_per_sample: u32,
    /// `1` (multilinear) or `3` (cubic spline).
    order: u8,
    encode: Vec<(f64, f64)>,
    decode: Vec<(f64, f64)>,
    samples: Vec<u8>,
}

impl Type0Function {
    /// Number of input variables.
    pub fn n_in(&self) -> usize {
        self.domain.len()
    }

    /// Number of output values.
    pub fn n_out(&self) -> usize {
        self.range.len()
    }

    fn max_raw(&self) -> u64 {
        if self.bits_per_sample >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bits_per_sample) - 1
        }
    }

    /// Whether `encode` is the implicit per-dimension default `(0, size[i]
    /// - 1)`, in which case [`Self::to_object`] elides the key.
    fn encode_is_default(&self) -> bool {
        self.encode.iter().zip(&self.size).all(|(&(lo, hi), &s)| lo == 0.0 && hi == (s.saturating_sub(1)) as f64)
    }

    fn flat_index(&self, idx: &[u32]) -> u64 {
        let mut total = 0u64;
        let mut stride = 1u64;
        for (d, &i) in idx.iter().enumerate() {
            total += i as u64 * stride;
            stride *= self.size[d] as u64;
        }
        total
    }

    /// The decoded output vector at one grid corner.
    fn corner(&self, idx: &[u32]) -> Vec<f64> {
        let n_out = self.n_out();
        let base = self.flat_index(idx) * n_out as u64;
        let max_raw = self.max_raw() as f64;
        (0..n_out)
            .map(|k| {
                let raw = bits::extract_sample(&self.samples, base + k as u64, self.bits_per_sample);
                let (lo, hi) = self.decode[k];
                affine(raw as f64, 0.0, max_raw, lo, hi)
            })
            .collect()
    }

    /// Evaluate the function at `input`, which must have [`Self::n_in`]
    /// entries.
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        debug_assert_eq!(input.len(), self.n_in(), "input vector must match the declared input shape");
        let e: Vec<f64> = input
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let (d_lo, d_hi) = self.domain[i];
                let x = clip(x, d_lo, d_hi);
                let (e_lo, e_hi) = self.encode[i];
                let max_index = (self.size[i] - 1) as f64;
                clip(affine(x, d_lo, d_hi, e_lo, e_hi), 0.0, max_index)
            })
            .collect();

        let n_out = self.n_out();
        let mut out = if self.order == 3 {
            cubic::interpolate(&e, &self.size, n_out, &|idx| self.corner(idx))
        } else {
            linear::interpolate(&e, &self.size, n_out, |idx| self.corner(idx))
        };

        for (k, v) in out.iter_mut().enumerate() {
            let (r_lo, r_hi) = self.range[k];
            *v = clip(*v, r_lo, r_hi);
        }
        out
    }

    /// Check every structural invariant a Type 0 dictionary/stream must
    /// satisfy.
    pub fn validate(&self, limits: &Limits) -> Result<(), InvalidFunction> {
        let err = |field, message: &str| InvalidFunction::new(0, field, message.to_string());

        if self.domain.is_empty() || self.domain.iter().any(|&(a, b)| !is_range(a, b)) {
            return Err(err("Domain", "must be a non-empty list of valid [min, max] pairs"));
        }
        if self.range.is_empty() || self.range.iter().any(|&(a, b)| !is_range(a, b)) {
            return Err(err("Range", "must be a non-empty list of valid [min, max] pairs"));
        }
        if self.size.len() != self.domain.len() {
            return Err(err("Size", "must have one entry per input variable"));
        }
        if self.size.iter().any(|&s| s == 0) {
            return Err(err("Size", "every entry must be at least 1"));
        }
        if !ALLOWED_BITS_PER_SAMPLE.contains(&self.bits_per_sample) {
            return Err(err("BitsPerSample", "must be one of 1, 2, 4, 8, 12, 16, 24, or 32"));
        }
        if self.order != 1 && self.order != 3 {
            return Err(err("Order", "must be 1 or 3"));
        }
        if self.encode.len() != self.domain.len() || self.encode.iter().any(|&(a, b)| !is_finite_pair(a, b)) {
            return Err(err("Encode", "must have one valid [min, max] pair per input variable"));
        }
        if self.decode.len() != self.range.len() || self.decode.iter().any(|&(a, b)| !is_finite_pair(a, b)) {
            return Err(err("Decode", "must have one valid [min, max] pair per output value"));
        }

        let sample_count: u128 = self.size.iter().map(|&s| s as u128).product();
        let total_bits = sample_count
            .saturating_mul(self.range.len() as u128)
            .saturating_mul(self.bits_per_sample as u128);
        if total_bits > limits.max_sample_bits as u128 {
            return Err(err("Size", "sample table exceeds the configured size limit"));
        }

        Ok(())
    }

    /// Read a Type 0 function from its dictionary and (already-decoded)
    /// stream body.
    pub fn read(dict: &Dict, stream_body: &[u8], limits: &Limits) -> Result<Self, ReadError> {
        let domain = pairs(get_float_array(dict, "Domain")?);
        let range = pairs(get_float_array(dict, "Range")?);
        let raw_size: Vec<f64> = get_array(dict, "Size")?
            .iter()
            .map(|o| o.as_integer().map(|i| i as f64).ok_or(ReadError::UnexpectedType { expected: "integer", found: "other" }))
            .collect::<Result<_, _>>()?;
        let size: Vec<u32> = crate::repair::truncate(0, "Size", raw_size, domain.len()).into_iter().map(|s| s as u32).collect();
        let bits_per_sample = get_integer(dict, "BitsPerSample")? as u32;
        let order = dict.get("Order").and_then(Object::as_integer).unwrap_or(1) as u8;

        let encode = match dict.get("Encode") {
            Some(Object::Array(items)) => {
                let raw = pairs(items.iter().map(|o| o.as_number().unwrap_or(0.0)).collect());
                crate::repair::repair_pairs(0, "Encode", raw, domain.len(), |i| {
                    (0.0, (size.get(i).copied().unwrap_or(1).saturating_sub(1)) as f64)
                })
            }
            _ => size.iter().map(|&s| (0.0, (s.saturating_sub(1)) as f64)).collect(),
        };
        let decode = match dict.get("Decode") {
            Some(Object::Array(items)) => {
                let raw = pairs(items.iter().map(|o| o.as_number().unwrap_or(0.0)).collect());
                crate::repair::repair_pairs(0, "Decode", raw, range.len(), |i| range.get(i).copied().unwrap_or((0.0, 0.0)))
            }
            _ => range.clone(),
        };

        let byte_limit = (limits.max_sample_bits as usize + 7) / 8;
        let mut samples = crate::object::decode_stream(stream_body, byte_limit)?.to_vec();

        // A producer that zero-pads the sample stream past its declared
        // bit accounting (e.g. to a round byte/word boundary) is common;
        // repair drops the padding rather than carrying it forward into
        // this function's own re-embedded stream.
        let declared_sample_count: u128 = size.iter().map(|&s| s as u128).product();
        let declared_bits = declared_sample_count.saturating_mul(range.len() as u128).saturating_mul(bits_per_sample as u128);
        let declared_bytes = ((declared_bits + 7) / 8) as usize;
        if samples.len() > declared_bytes {
            log::debug!(
                "type 0 function: field `samples`: truncating {} trailing padding byte(s) past the declared {declared_bytes}-byte sample table",
                samples.len() - declared_bytes
            );
            samples.truncate(declared_bytes);
        }

        let f = Type0Function { domain, range, size, bits_per_sample, order, encode, decode, samples };
        f.validate(limits)?;
        Ok(f)
    }

    /// Render this function back into its PDF dictionary/stream form.
    pub fn to_object(&self) -> Object {
        let mut dict = Dict::new();
        dict.insert("FunctionType", Object::Integer(0));
        dict.insert("Domain", flatten(&self.domain));
        dict.insert("Range", flatten(&self.range));
        dict.insert("Size", Object::Array(self.size.iter().map(|&s| Object::Integer(s as i64)).collect()));
        dict.insert("BitsPerSample", Object::Integer(self.bits_per_sample as i64));
        if self.order != 1 {
            dict.insert("Order", Object::Integer(self.order as i64));
        }
        if !self.encode_is_default() {
            dict.insert("Encode", flatten(&self.encode));
        }
        if self.decode != self.range {
            dict.insert("Decode", flatten(&self.decode));
        }
        Object::Stream(dict, self.samples.clone())
    }
}

fn pairs(flat: Vec<f64>) -> Vec<(f64, f64)> {
    flat.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

fn flatten(pairs: &[(f64, f64)]) -> Object {
    Object::Array(pairs.iter().flat_map(|&(a, b)| [Object::Real(a), Object::Real(b)]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(size: Vec<u32>, bits: u32, samples: Vec<u8>, range: Vec<(f64, f64)>) -> Type0Function {
        let domain = vec![(0.0, 1.0); size.len()];
        let encode = size.iter().map(|&s| (0.0, (s - 1) as f64)).collect();
        let decode = range.clone();
        Type0Function { domain, range, size, bits_per_sample: bits, order: 1, encode, decode, samples }
    }

    #[test]
    fn one_d_linear_lookup() {
        let f = make(vec![2], 8, vec![0, 255], vec![(0.0, 1.0)]);
        assert_eq!(f.apply(&[0.0]), vec![0.0]);
        assert_eq!(f.apply(&[1.0]), vec![1.0]);
        let mid = f.apply(&[0.5]);
        assert!((mid[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn clips_input_outside_domain() {
        let f = make(vec![2], 8, vec![0, 255], vec![(0.0, 1.0)]);
        assert_eq!(f.apply(&[5.0]), f.apply(&[1.0]));
        assert_eq!(f.apply(&[-5.0]), f.apply(&[0.0]));
    }

    #[test]
    fn validate_rejects_bad_bits_per_sample() {
        let f = make(vec![2], 7, vec![0, 255], vec![(0.0, 1.0)]);
        assert!(f.validate(&Limits::default()).is_err());
    }

    #[test]
    fn cubic_order_is_allowed_with_multiple_inputs() {
        let mut f = make(vec![4, 4], 8, vec![0; 16], vec![(0.0, 1.0)]);
        f.order = 3;
        assert!(f.validate(&Limits::default()).is_ok());
    }

    #[test]
    fn validate_rejects_oversized_sample_table() {
        let f = make(vec![1 << 20], 32, vec![], vec![(0.0, 1.0); 16]);
        let limits = Limits::default();
        assert!(f.validate(&limits).is_err());
    }

    #[test]
    fn short_stream_zero_pads_instead_of_erroring() {
        let f = make(vec![4], 8, vec![0], vec![(0.0, 1.0)]);
        // Only the first of four samples is present; the rest read as 0.
        assert_eq!(f.apply(&[1.0]), vec![0.0]);
    }

    #[test]
    fn read_truncates_trailing_padding_past_the_declared_sample_table() {
        let mut dict = Dict::new();
        dict.insert("FunctionType", Object::Integer(0));
        dict.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
        dict.insert("Range", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
        dict.insert("Size", Object::Array(vec![Object::Integer(2)]));
        dict.insert("BitsPerSample", Object::Integer(8));
        // Declared table is 2 bytes (Size=2, 1 output, 8 bits); the
        // stream was zero-padded to 4 bytes by its producer.
        let f = Type0Function::read(&dict, &[0x00, 0xFF, 0x00, 0x00], &Limits::default()).unwrap();
        assert_eq!(f.samples, vec![0x00, 0xFF]);
    }

    #[test]
    fn read_repairs_an_overlong_encode_array() {
        let mut dict = Dict::new();
        dict.insert("FunctionType", Object::Integer(0));
        dict.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
        dict.insert("Range", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
        dict.insert("Size", Object::Array(vec![Object::Integer(2)]));
        dict.insert("BitsPerSample", Object::Integer(8));
        // Three pairs where only one (m=1) is expected; repair truncates
        // to the first.
        dict.insert(
            "Encode",
            Object::Array(vec![
                Object::Real(0.0),
                Object::Real(1.0),
                Object::Real(9.0),
                Object::Real(9.0),
                Object::Real(9.0),
                Object::Real(9.0),
            ]),
        );
        let f = Type0Function::read(&dict, &[0, 255], &Limits::default()).unwrap();
        assert_eq!(f.encode, vec![(0.0, 1.0)]);
    }

    #[test]
    fn to_object_elides_default_encode_and_decode() {
        let f = make(vec![2], 8, vec![0, 255], vec![(0.0, 1.0)]);
        let obj = f.to_object();
        let dict = obj.as_dict().unwrap();
        assert!(dict.get("Encode").is_none());
        assert!(dict.get("Decode").is_none());
    }

    #[test]
    fn to_object_keeps_nondefault_encode_and_decode() {
        let mut f = make(vec![2], 8, vec![0, 255], vec![(0.0, 1.0)]);
        f.encode = vec![(1.0, 0.0)];
        f.decode = vec![(1.0, 0.0)];
        let obj = f.to_object();
        let dict = obj.as_dict().unwrap();
        assert!(dict.get("Encode").is_some());
        assert!(dict.get("Decode").is_some());
    }

    #[test]
    fn cubic_spline_matches_documented_quarter_step_values() {
        let mut f = make(vec![4], 8, vec![0, 10, 40, 100], vec![(0.0, 255.0)]);
        f.order = 3;
        f.decode = vec![(0.0, 255.0)];
        let expect = [(0.0, 0.0), (0.5, 3.125), (1.0, 10.0), (1.5, 21.875), (2.0, 40.0), (2.5, 71.875), (3.0, 100.0)];
        for (x, want) in expect {
            let got = f.apply(&[x / 3.0])[0];
            assert!((got - want).abs() < 1e-6, "x={x}: got {got}, want {want}");
        }
    }
}
