//! The `repair` half of the read pipeline: truncating over-long arrays to
//! their expected length and filling in missing trailing defaults, before
//! `validate` ever sees the result.
//!
//! `repair` never grows data beyond what a correct producer would have
//! written and never invents values `validate` couldn't otherwise accept
//! — it only drops what's superfluous and fills what's absent, logging
//! each adjustment at `debug` so a host tailing logs can spot a
//! malformed producer without `read` itself failing.

/// Truncate `pairs` to `expected` entries if it is too long, then pad any
/// shortfall with `default(i)` for each missing trailing index.
pub fn repair_pairs(
    function_type: i32,
    field: &'static str,
    mut pairs: Vec<(f64, f64)>,
    expected: usize,
    default: impl Fn(usize) -> (f64, f64),
) -> Vec<(f64, f64)> {
    if pairs.len() > expected {
        log::debug!(
            "type {function_type} function: field `{field}`: truncating {} entries down to {expected}",
            pairs.len()
        );
        pairs.truncate(expected);
    }
    if pairs.len() < expected {
        log::debug!(
            "type {function_type} function: field `{field}`: filling {} missing default entries",
            expected - pairs.len()
        );
        for i in pairs.len()..expected {
            pairs.push(default(i));
        }
    }
    pairs
}

/// Truncate `values` to `expected` entries if it is too long. Unlike
/// [`repair_pairs`], a missing entry has no sensible default (there is no
/// canonical "default bound" or "default size"), so a too-short input is
/// left alone for `validate` to reject.
pub fn truncate(function_type: i32, field: &'static str, mut values: Vec<f64>, expected: usize) -> Vec<f64> {
    if values.len() > expected {
        log::debug!(
            "type {function_type} function: field `{field}`: truncating {} entries down to {expected}",
            values.len()
        );
        values.truncate(expected);
    }
    values
}
