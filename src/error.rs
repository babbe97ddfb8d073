//! The crate's error taxonomy: one family per concern.
//!
//! [`InvalidFunction`] covers every structural rejection from `validate`.
//! [`VmError`] covers Type 4's runtime execution failures, which never
//! escape [`crate::type4::PostScriptFunction::apply`] (see its docs) but
//! are surfaced directly from the raw VM for testing and logging.
//! [`ReadError`] is the orchestrator-level error: object-model shape
//! mismatches, missing children, and [`ReadError::Cycle`].

use std::fmt;

/// A function dict/stream failed a structural invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("type {function_type} function: field `{field}`: {message}")]
pub struct InvalidFunction {
    /// The PDF `FunctionType` integer (0, 2, 3, or 4).
    pub function_type: i32,
    /// The dict/stream key this violation concerns, e.g. `"BitsPerSample"`.
    pub field: &'static str,
    /// Human-readable detail.
    pub message: String,
}

impl InvalidFunction {
    pub(crate) fn new(function_type: i32, field: &'static str, message: impl Into<String>) -> Self {
        Self { function_type, field, message: message.into() }
    }
}

/// A Type 4 PostScript calculator compile- or run-time failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VmError {
    /// An operator needed more operands than the stack held.
    #[error("stack underflow")]
    StackUnderflow,
    /// The operand stack grew past [`crate::Limits::max_stack_depth`].
    #[error("stack overflow")]
    StackOverflow,
    /// An operator received an operand of the wrong tag.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// What the operator required, e.g. `"Int"` or `"number"`.
        expected: &'static str,
        /// The tag name of the offending value.
        found: &'static str,
    },
    /// Integer division or `mod` by zero.
    #[error("division by zero")]
    DivByZero,
    /// `sqrt` of a negative number, `ln`/`log` of a non-positive number,
    /// or `atan(0, 0)`.
    #[error("{op}: {message}")]
    DomainError {
        /// The offending operator name, e.g. `"sqrt"`.
        op: &'static str,
        /// Human-readable detail.
        message: &'static str,
    },
    /// A token in the program is not a number, boolean, or known operator.
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
    /// `{`/`}` do not balance.
    #[error("unbalanced braces")]
    UnbalancedBraces,
    /// `{ ... }` nesting exceeded [`crate::Limits::max_nesting_depth`].
    #[error("procedure nesting too deep")]
    NestingTooDeep,
    /// The program text exceeded [`crate::Limits::max_program_size`].
    #[error("program too large")]
    ProgramTooLarge,
    /// A `{...}` block was never consumed by `if`/`ifelse`.
    #[error("unused procedure body")]
    UnusedProcedureBody,
    /// `cvi` on a real outside the range of `i64`.
    #[error("integer conversion out of range")]
    IntegerOutOfRange,
    /// `index`/`copy`/`roll` argument refers outside the current stack.
    #[error("index out of range")]
    IndexOutOfRange,
}

/// A failure while resolving a PDF object into a [`crate::Function`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadError {
    /// A validation invariant was violated.
    #[error(transparent)]
    Invalid(#[from] InvalidFunction),
    /// The object was not the kind (dict, stream, array, ...) expected.
    #[error("unexpected object type: expected {expected}, found {found}")]
    UnexpectedType {
        /// What was expected, e.g. `"stream"`.
        expected: &'static str,
        /// What was found instead.
        found: &'static str,
    },
    /// A required dictionary key was absent.
    #[error("missing required key `{0}`")]
    MissingKey(&'static str),
    /// `FunctionType` named a type inconsistent with dict-vs-stream kind,
    /// e.g. `FunctionType=0` on a bare dictionary (Type 0 requires a
    /// stream).
    #[error("unexpected function type {0} for this object kind")]
    UnexpectedFunctionType(i32),
    /// `FunctionType` was present but not one of 0, 2, 3, 4.
    #[error("unknown function type {0}")]
    UnknownFunctionType(i32),
    /// A Type 3 stitching function is missing one or more child functions.
    #[error("missing child functions")]
    MissingChildFunctions,
    /// Re-visited an already-seen indirect reference while resolving a
    /// Type 3 function's children: the file describes a cyclic function
    /// graph.
    #[error("cyclic function reference")]
    Cycle,
    /// The document version is older than this function type requires.
    #[error("requires PDF version {required}, document declares {have}")]
    VersionTooOld {
        /// `(major, minor)` required by this function type.
        required: Version,
        /// `(major, minor)` declared by the document.
        have: Version,
    },
    /// A stream body exceeded the configured size limit while being read
    /// (a Type 4 `program`, or a Type 0 sample table).
    #[error("stream body too large")]
    ProgramTooLarge,
}

/// A `major.minor` PDF version, e.g. `Version(1, 3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(pub u8, pub u8);

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0, self.1)
    }
}
