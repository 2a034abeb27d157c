//! Z3 C API calls the `z3` crate does not expose.
//!
//! The `z3` crate keeps its `Z3_context` private, so these calls run in a
//! [`ScratchContext`] this module creates and owns. Terms move between the
//! two contexts as SMT2 text, printed and parsed by Z3 itself.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::ptr;

use z3_sys::*;

fn z3_string_to_owned(raw: Z3_string) -> String {
    if raw.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
}

/// A short-lived Z3 context for quantifier introspection.
///
/// Created with `Z3_mk_context`, so every AST stays alive until the context
/// is dropped and no per-AST reference counting is needed.
pub(crate) struct ScratchContext {
    z3_ctx: Z3_context,
}

/// An AST owned by the [`ScratchContext`] it was created in.
#[derive(Clone, Copy)]
pub(crate) struct ScratchAst<'s> {
    z3_ast: Z3_ast,
    _ctx: PhantomData<&'s ScratchContext>,
}

impl ScratchContext {
    pub(crate) fn new() -> Result<Self, String> {
        let z3_ctx = unsafe {
            let cfg = Z3_mk_config();
            let z3_ctx = Z3_mk_context(cfg);
            Z3_del_config(cfg);
            z3_ctx
        };
        if z3_ctx.is_null() {
            return Err("could not create a Z3 context".to_string());
        }
        // Errors are read back through `Z3_get_error_code` instead of aborting.
        unsafe { Z3_set_error_handler(z3_ctx, None) };
        Ok(ScratchContext { z3_ctx })
    }

    /// The error Z3 recorded for the last API call, if any.
    fn last_error(&self) -> Option<String> {
        let code = unsafe { Z3_get_error_code(self.z3_ctx) };
        if code == ErrorCode::OK {
            return None;
        }
        Some(z3_string_to_owned(unsafe { Z3_get_error_msg(self.z3_ctx, code) }))
    }

    fn ast(&self, z3_ast: Z3_ast) -> Result<ScratchAst<'_>, String> {
        if let Some(message) = self.last_error() {
            return Err(message);
        }
        if z3_ast.is_null() {
            return Err("Z3 returned a null term".to_string());
        }
        Ok(ScratchAst {
            z3_ast,
            _ctx: PhantomData,
        })
    }

    /// Parse SMT2 text and return its assertions in file order.
    pub(crate) fn parse_assertions(&self, text: &CStr) -> Result<Vec<ScratchAst<'_>>, String> {
        let vector = unsafe {
            Z3_parse_smtlib2_string(
                self.z3_ctx,
                text.as_ptr(),
                0,
                ptr::null(),
                ptr::null(),
                0,
                ptr::null(),
                ptr::null(),
            )
        };
        if let Some(message) = self.last_error() {
            return Err(message);
        }
        if vector.is_null() {
            return Err("Z3 parser returned no assertions".to_string());
        }

        unsafe { Z3_ast_vector_inc_ref(self.z3_ctx, vector) };
        let len = unsafe { Z3_ast_vector_size(self.z3_ctx, vector) };
        let assertions = (0..len)
            .map(|i| self.ast(unsafe { Z3_ast_vector_get(self.z3_ctx, vector, i) }))
            .collect();
        unsafe { Z3_ast_vector_dec_ref(self.z3_ctx, vector) };
        assertions
    }

    pub(crate) fn is_quantifier(&self, ast: ScratchAst<'_>) -> bool {
        unsafe { Z3_get_ast_kind(self.z3_ctx, ast.z3_ast) == AstKind::Quantifier }
    }

    pub(crate) fn is_forall(&self, quantifier: ScratchAst<'_>) -> bool {
        unsafe { Z3_is_quantifier_forall(self.z3_ctx, quantifier.z3_ast) }
    }

    /// Number of variables bound by `quantifier`.
    pub(crate) fn num_bound(&self, quantifier: ScratchAst<'_>) -> u32 {
        unsafe { Z3_get_quantifier_num_bound(self.z3_ctx, quantifier.z3_ast) }
    }

    /// Name of bound variable `i`, in declaration order.
    pub(crate) fn bound_name(&self, quantifier: ScratchAst<'_>, i: u32) -> String {
        unsafe {
            let symbol = Z3_get_quantifier_bound_name(self.z3_ctx, quantifier.z3_ast, i);
            match Z3_get_symbol_kind(self.z3_ctx, symbol) {
                SymbolKind::Int => Z3_get_symbol_int(self.z3_ctx, symbol).to_string(),
                SymbolKind::String => z3_string_to_owned(Z3_get_symbol_string(self.z3_ctx, symbol)),
            }
        }
    }

    /// Whether bound variable `i` is `Int` sorted, with the sort's SMT2 name.
    pub(crate) fn bound_sort(&self, quantifier: ScratchAst<'_>, i: u32) -> (bool, String) {
        unsafe {
            let sort = Z3_get_quantifier_bound_sort(self.z3_ctx, quantifier.z3_ast, i);
            let is_int = Z3_get_sort_kind(self.z3_ctx, sort) == SortKind::Int;
            (is_int, z3_string_to_owned(Z3_sort_to_string(self.z3_ctx, sort)))
        }
    }

    /// The body of `quantifier`, still referring to its bound variables.
    pub(crate) fn quantifier_body<'s>(&'s self, quantifier: ScratchAst<'s>) -> Result<ScratchAst<'s>, String> {
        self.ast(unsafe { Z3_get_quantifier_body(self.z3_ctx, quantifier.z3_ast) })
    }

    /// A free `Int` constant called `name`.
    pub(crate) fn int_const(&self, name: &str) -> Result<ScratchAst<'_>, String> {
        let name = CString::new(name).map_err(|e| e.to_string())?;
        self.ast(unsafe {
            let symbol = Z3_mk_string_symbol(self.z3_ctx, name.as_ptr());
            Z3_mk_const(self.z3_ctx, symbol, Z3_mk_int_sort(self.z3_ctx))
        })
    }

    /// Replace de Bruijn variable `i` in `body` with `to[i]`.
    pub(crate) fn substitute_vars<'s>(
        &'s self,
        body: ScratchAst<'s>,
        to: &[ScratchAst<'s>],
    ) -> Result<ScratchAst<'s>, String> {
        let count = u32::try_from(to.len())
            .map_err(|_| format!("{} substitutions exceed the Z3 API limit", to.len()))?;
        let raw_to: Vec<Z3_ast> = to.iter().map(|t| t.z3_ast).collect();
        self.ast(unsafe { Z3_substitute_vars(self.z3_ctx, body.z3_ast, count, raw_to.as_ptr()) })
    }

    pub(crate) fn not<'s>(&'s self, ast: ScratchAst<'s>) -> Result<ScratchAst<'s>, String> {
        self.ast(unsafe { Z3_mk_not(self.z3_ctx, ast.z3_ast) })
    }

    /// `ast` as an SMT2 script: declarations of its free constants followed
    /// by one `assert`.
    pub(crate) fn to_smt2(&self, ast: ScratchAst<'_>) -> Result<String, String> {
        unsafe {
            let solver = Z3_mk_simple_solver(self.z3_ctx);
            if solver.is_null() {
                return Err("could not create a Z3 solver".to_string());
            }
            Z3_solver_inc_ref(self.z3_ctx, solver);
            Z3_solver_assert(self.z3_ctx, solver, ast.z3_ast);
            let text = z3_string_to_owned(Z3_solver_to_string(self.z3_ctx, solver));
            Z3_solver_dec_ref(self.z3_ctx, solver);
            match self.last_error() {
                Some(message) => Err(message),
                None => Ok(text),
            }
        }
    }
}

impl Drop for ScratchContext {
    fn drop(&mut self) {
        unsafe { Z3_del_context(self.z3_ctx) };
    }
}
