//! Counterexample search and the plain satisfiability check.
//!
//! Each call builds its own `z3::Context` from a [`SolverConfig`], so no
//! solver state survives between calls.

use std::path::Path;

use z3::ast::Bool;
use z3::{Context, SatResult, Solver};

use crate::config::SolverConfig;
use crate::error::CexError;
use crate::loader::parse_smt2_file;
use crate::model::Counterexample;
use crate::quantifier::negated_body;
use crate::result::SolverResult;

/// Search for an input violating the universally quantified property in `path`.
///
/// Returns `Sat(Some(cex))` with the decoded counterexample, or `Unsat` /
/// `Unknown` when none was found.
pub fn find_counterexample(path: &Path, config: &SolverConfig) -> Result<SolverResult, CexError> {
    let ctx = Context::new(&config.z3_config());
    let formula = parse_smt2_file(&ctx, path)?;
    let negated = negated_body(&formula)?;

    let solver = config.solver(&ctx);
    solver.assert(&negated);
    match check(&solver) {
        SolverResult::Sat(_) => {
            let Some(model) = solver.get_model() else {
                return Ok(SolverResult::Unknown("no model after sat".to_string()));
            };
            let cex = Counterexample::from_z3_model(&model)?;
            Ok(SolverResult::Sat(Some(cex)))
        }
        other => Ok(other),
    }
}

/// Counterexample values for packet fields and state group variables.
///
/// When Z3 finds no counterexample the status is reported as a warning and
/// an empty [`Counterexample`] is returned.
pub fn generate_counter_examples(path: &Path) -> Result<Counterexample, CexError> {
    generate_counter_examples_with(path, &SolverConfig::counterexample().apply_env())
}

/// [`generate_counter_examples`] with an explicit solver configuration.
pub fn generate_counter_examples_with(
    path: &Path,
    config: &SolverConfig,
) -> Result<Counterexample, CexError> {
    let result = find_counterexample(path, config)?;
    if let Some(message) = no_counterexample_message(&result) {
        tracing::warn!("{message}");
    }
    Ok(result.into_counterexample())
}

/// Check the formula in `path` as-is, without model extraction.
pub fn check_file(path: &Path, config: &SolverConfig) -> Result<SolverResult, CexError> {
    let ctx = Context::new(&config.z3_config());
    let formula = parse_smt2_file(&ctx, path)?;
    Ok(check_formula(&ctx, config, &formula))
}

/// Whether the formula in `path` is satisfiable.
///
/// Sketch writes these as `(=> ranges property)`. Satisfiability only says
/// some assignment makes the implication true, which includes assignments
/// outside the ranges.
pub fn simple_check(path: &Path) -> Result<bool, CexError> {
    simple_check_with(path, &SolverConfig::from_env())
}

/// [`simple_check`] with an explicit solver configuration. An unknown
/// outcome counts as unsatisfiable.
pub fn simple_check_with(path: &Path, config: &SolverConfig) -> Result<bool, CexError> {
    Ok(check_file(path, config)?.is_sat())
}

fn no_counterexample_message(result: &SolverResult) -> Option<String> {
    if result.counterexample().is_some() {
        return None;
    }
    Some(format!("Failed to generate counterexamples, z3 returned {result}"))
}

fn check_formula<'ctx>(ctx: &'ctx Context, config: &SolverConfig, formula: &Bool<'ctx>) -> SolverResult {
    let solver = config.solver(ctx);
    solver.assert(formula);
    check(&solver)
}

fn check(solver: &Solver<'_>) -> SolverResult {
    let start = std::time::Instant::now();
    let status = solver.check();
    tracing::debug!("Z3 returned {status:?} in {:?}", start.elapsed());
    if status == SatResult::Sat {
        return SolverResult::Sat(None);
    }
    SolverResult::from_status(status, || solver.get_reason_unknown())
}
