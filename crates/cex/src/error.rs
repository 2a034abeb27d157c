use std::fmt;
use std::path::PathBuf;

/// Errors from loading formulas and decoding counterexamples.
///
/// An unsatisfiable or unknown solver outcome is not an error; see
/// [`SolverResult`](crate::result::SolverResult).
#[derive(Debug, Clone, PartialEq)]
pub enum CexError {
    /// The SMT2 file could not be read.
    Io { path: PathBuf, message: String },
    /// Z3 rejected the SMT2 text.
    Parse { origin: String, message: String },
    /// The input did not contain exactly one `assert`.
    AssertionCount { origin: String, found: usize },
    /// Body negation was requested on a formula that is not a quantifier.
    NotAQuantifier(String),
    /// A bound variable is not integer sorted.
    UnsupportedSort { name: String, sort: String },
    /// A model interpretation is not an integer (real, bool, function).
    NonIntegerValue { name: String, value: String },
    /// An integer model value does not fit in `i64`. Z3 integers are
    /// unbounded; Sketch inputs are bit-ranged, so this signals a malformed
    /// query rather than a real counterexample.
    ValueOutOfRange { name: String, value: String },
    /// A Z3 API call failed outside of parsing user input.
    Z3(String),
}

impl fmt::Display for CexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CexError::Io { path, message } => {
                write!(f, "Failed to read {}: {message}", path.display())
            }
            CexError::Parse { origin, message } => {
                write!(f, "Failed to parse SMT2 from {origin}: {message}")
            }
            CexError::AssertionCount { origin, found } => write!(
                f,
                "{origin} contains {found} asserts, expected exactly 1"
            ),
            CexError::NotAQuantifier(formula) => {
                write!(f, "Formula is not a quantifier:\n{formula}")
            }
            CexError::UnsupportedSort { name, sort } => write!(
                f,
                "Bound variable {name} has sort {sort}, only Int is supported"
            ),
            CexError::NonIntegerValue { name, value } => {
                write!(f, "Model value of {name} is not an integer: {value}")
            }
            CexError::ValueOutOfRange { name, value } => {
                write!(f, "Model value of {name} does not fit in i64: {value}")
            }
            CexError::Z3(msg) => write!(f, "Z3 error: {msg}"),
        }
    }
}

impl std::error::Error for CexError {}
