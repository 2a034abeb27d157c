//! Quantifier elimination by instantiation with free constants.
//!
//! A property `forall xs. body` is turned into the search problem
//! `not body[xs := free Int constants]`: any model of the latter is an input
//! violating the property.

use std::ffi::CString;

use z3::ast::{forall_const, Ast, Bool, Int};
use z3::{Context, Solver};
use z3_sys::AstKind;

use crate::error::CexError;
use crate::loader::parse_smt2_str;
use crate::sys::{ScratchAst, ScratchContext};

fn require_quantifier(formula: &Bool<'_>) -> Result<(), CexError> {
    if formula.kind() != AstKind::Quantifier {
        return Err(CexError::NotAQuantifier(formula.to_string()));
    }
    Ok(())
}

/// Run `f` on a copy of the quantified `formula` in a scratch context.
fn with_scratch_quantifier<T>(
    formula: &Bool<'_>,
    f: impl FnOnce(&ScratchContext, ScratchAst<'_>) -> Result<T, CexError>,
) -> Result<T, CexError> {
    require_quantifier(formula)?;

    // The solver's SMT2 rendering declares every free constant of `formula`.
    let solver = Solver::new(formula.get_ctx());
    solver.assert(formula);
    let script = CString::new(solver.to_string()).map_err(|e| CexError::Z3(e.to_string()))?;

    let scratch = ScratchContext::new().map_err(CexError::Z3)?;
    let assertions = scratch.parse_assertions(&script).map_err(CexError::Z3)?;
    match assertions.as_slice() {
        [quantifier] if scratch.is_quantifier(*quantifier) => f(&scratch, *quantifier),
        _ => Err(CexError::Z3(format!(
            "quantifier did not survive SMT2 rendering:\n{}",
            script.to_string_lossy()
        ))),
    }
}

/// Names of the variables bound by `formula`, in declaration order.
pub fn bound_var_names(formula: &Bool<'_>) -> Result<Vec<String>, CexError> {
    with_scratch_quantifier(formula, |scratch, quantifier| {
        Ok((0..scratch.num_bound(quantifier))
            .map(|i| scratch.bound_name(quantifier, i))
            .collect())
    })
}

/// The body of `formula` with each bound variable replaced by a free `Int`
/// constant of the same name.
pub fn instantiated_body<'ctx>(formula: &Bool<'ctx>) -> Result<Bool<'ctx>, CexError> {
    let script = with_scratch_quantifier(formula, |scratch, quantifier| {
        if !scratch.is_forall(quantifier) {
            tracing::debug!("Instantiating the body of a non-universal quantifier");
        }

        let mut free_vars = Vec::new();
        for i in 0..scratch.num_bound(quantifier) {
            let name = scratch.bound_name(quantifier, i);
            let (is_int, sort) = scratch.bound_sort(quantifier, i);
            if !is_int {
                return Err(CexError::UnsupportedSort { name, sort });
            }
            free_vars.push(scratch.int_const(&name).map_err(CexError::Z3)?);
        }

        // Var(0) is the last declared variable.
        free_vars.reverse();
        let body = scratch.quantifier_body(quantifier).map_err(CexError::Z3)?;
        let instantiated = scratch.substitute_vars(body, &free_vars).map_err(CexError::Z3)?;
        tracing::debug!("Instantiated quantifier body over {} variables", free_vars.len());
        scratch.to_smt2(instantiated).map_err(CexError::Z3)
    })?;
    parse_smt2_str(formula.get_ctx(), &script, "instantiated quantifier body")
}

/// Negation of the instantiated body of a quantified formula.
pub fn negated_body<'ctx>(formula: &Bool<'ctx>) -> Result<Bool<'ctx>, CexError> {
    Ok(instantiated_body(formula)?.not())
}

/// Universally quantify `body` over the free `Int` constants named `names`.
pub fn requantify<'ctx, S: AsRef<str>>(ctx: &'ctx Context, names: &[S], body: &Bool<'ctx>) -> Bool<'ctx> {
    let vars: Vec<Int<'ctx>> = names.iter().map(|n| Int::new_const(ctx, n.as_ref())).collect();
    let bounds: Vec<&dyn Ast<'ctx>> = vars.iter().map(|v| v as &dyn Ast<'ctx>).collect();
    forall_const(ctx, &bounds, &[], body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::ast::BV;
    use z3::{Config, SatResult};

    fn equivalent<'ctx>(ctx: &'ctx Context, a: &Bool<'ctx>, b: &Bool<'ctx>) -> bool {
        let solver = Solver::new(ctx);
        solver.assert(&a._eq(b).not());
        solver.check() == SatResult::Unsat
    }

    #[test]
    fn bound_names_in_declaration_order() {
        let ctx = Context::new(&Config::new());
        let x = Int::new_const(&ctx, "pkt_0");
        let y = Int::new_const(&ctx, "state_group_0_state_0");
        let formula = requantify(&ctx, &["pkt_0", "state_group_0_state_0"], &x.gt(&y));

        assert_eq!(
            bound_var_names(&formula).expect("quantifier"),
            vec!["pkt_0".to_string(), "state_group_0_state_0".to_string()]
        );
    }

    #[test]
    fn instantiation_respects_variable_order() {
        let ctx = Context::new(&Config::new());
        let x = Int::new_const(&ctx, "x");
        let y = Int::new_const(&ctx, "y");
        let body = x.gt(&y);
        let formula = requantify(&ctx, &["x", "y"], &body);

        let instantiated = instantiated_body(&formula).expect("quantifier");
        assert!(equivalent(&ctx, &instantiated, &body));
        assert!(!equivalent(&ctx, &instantiated, &y.gt(&x)));
    }

    #[test]
    fn negated_body_is_satisfiable_for_false_property() {
        let ctx = Context::new(&Config::new());
        let x = Int::new_const(&ctx, "pkt_0");
        let formula = requantify(&ctx, &["pkt_0"], &x.gt(&Int::from_i64(&ctx, 10)));

        let negated = negated_body(&formula).expect("quantifier");
        let solver = Solver::new(&ctx);
        solver.assert(&negated);
        assert_eq!(solver.check(), SatResult::Sat);

        let model = solver.get_model().expect("model");
        let value = model.eval(&x, true).and_then(|v| v.as_i64()).expect("int");
        assert!(value <= 10);
    }

    #[test]
    fn non_quantifier_is_rejected() {
        let ctx = Context::new(&Config::new());
        let x = Int::new_const(&ctx, "x");
        let formula = x.gt(&Int::from_i64(&ctx, 0));

        let err = negated_body(&formula).unwrap_err();
        assert!(matches!(err, CexError::NotAQuantifier(ref text) if text.contains('x')));
        assert!(bound_var_names(&formula).is_err());
    }

    #[test]
    fn non_integer_bound_variable_is_rejected() {
        let ctx = Context::new(&Config::new());
        let b = BV::new_const(&ctx, "pkt_bits", 8);
        let body = b.bvugt(&BV::from_u64(&ctx, 0, 8));
        let bounds: [&dyn Ast<'_>; 1] = [&b];
        let formula = forall_const(&ctx, &bounds, &[], &body);

        let err = negated_body(&formula).unwrap_err();
        assert!(matches!(err, CexError::UnsupportedSort { ref name, .. } if name == "pkt_bits"));
    }

    #[test]
    fn free_constants_outside_the_binder_are_kept() {
        let ctx = Context::new(&Config::new());
        let x = Int::new_const(&ctx, "pkt_0");
        let limit = Int::new_const(&ctx, "state_group_limit");
        let body = x.lt(&limit);
        let formula = requantify(&ctx, &["pkt_0"], &body);

        let instantiated = instantiated_body(&formula).expect("quantifier");
        assert!(equivalent(&ctx, &instantiated, &body));
    }

    #[test]
    fn double_negation_round_trip() {
        let ctx = Context::new(&Config::new());
        let a = Int::new_const(&ctx, "pkt_a");
        let b = Int::new_const(&ctx, "state_group_b");
        let body = Bool::or(&ctx, &[&a.lt(&b), &a._eq(&Int::from_i64(&ctx, 3))]);
        let names = ["pkt_a", "state_group_b"];

        let once = negated_body(&requantify(&ctx, &names, &body)).expect("quantifier");
        let twice = negated_body(&requantify(&ctx, &names, &once)).expect("quantifier");
        assert!(equivalent(&ctx, &twice, &body));
    }
}
