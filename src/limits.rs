//! Configurable resource limits.
//!
//! A host embedding this crate with untrusted PDFs can tighten these
//! without forking us; every test and example uses [`Limits::default`],
//! which matches the ceilings the PDF specification itself imposes on
//! function dictionaries.

/// Resource ceilings enforced before any type-specific work is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Upper bound on `Π size · n · bits_per_sample` for a Type 0 function.
    pub max_sample_bits: u64,
    /// Upper bound on the byte length of a Type 4 `program` string.
    pub max_program_size: usize,
    /// Upper bound on `{ ... }` nesting depth in a Type 4 program.
    pub max_nesting_depth: u32,
    /// Upper bound on the Type 4 VM operand stack depth.
    pub max_stack_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_sample_bits: 1 << 23,
            max_program_size: 16 * 1024,
            max_nesting_depth: 255,
            max_stack_depth: 500,
        }
    }
}
