use std::ffi::CString;
use std::path::Path;

use z3::ast::{Ast, Bool};
use z3::{Context, Solver};

use crate::error::CexError;
use crate::sys::ScratchContext;

/// Read an SMT2 file and return its single assertion.
///
/// Sketch emits exactly one `assert` per file; anything else is rejected
/// with [`CexError::AssertionCount`].
pub fn parse_smt2_file<'ctx>(ctx: &'ctx Context, path: &Path) -> Result<Bool<'ctx>, CexError> {
    let text = std::fs::read_to_string(path).map_err(|e| CexError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_smt2_str(ctx, &text, &path.display().to_string())
}

/// Parse SMT2 text and return its single assertion.
///
/// `origin` names the input in error messages.
pub fn parse_smt2_str<'ctx>(
    ctx: &'ctx Context,
    text: &str,
    origin: &str,
) -> Result<Bool<'ctx>, CexError> {
    let parse_error = |message: String| CexError::Parse {
        origin: origin.to_string(),
        message,
    };
    let script = CString::new(text).map_err(|_| parse_error("input contains a NUL byte".to_string()))?;

    // `Solver::from_string` swallows parse errors, so the text is checked
    // in a scratch context first.
    let scratch = ScratchContext::new().map_err(CexError::Z3)?;
    let found = scratch.parse_assertions(&script).map_err(parse_error)?.len();
    tracing::debug!("Parsed {found} assertion(s) from {origin}");
    if found != 1 {
        return Err(CexError::AssertionCount {
            origin: origin.to_string(),
            found,
        });
    }

    let solver = Solver::new(ctx);
    solver.from_string(script);
    let mut formulas = solver.get_assertions();
    match formulas.pop() {
        // `get_assertions` ties the result to the solver borrow; the AST
        // itself lives in `ctx`, so re-anchor it to `'ctx`.
        Some(formula) if formulas.is_empty() => Ok(unsafe { Bool::wrap(ctx, formula.get_z3_ast()) }),
        popped => Err(CexError::AssertionCount {
            origin: origin.to_string(),
            found: formulas.len() + usize::from(popped.is_some()),
        }),
    }
}
