use std::fmt;

use z3::SatResult;

use crate::model::Counterexample;

/// Result of one solver check.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    /// Formula is satisfiable. Carries the decoded counterexample when the
    /// caller asked for model extraction.
    Sat(Option<Counterexample>),
    /// Formula is unsatisfiable (for a negated property: the property holds).
    Unsat,
    /// Solver couldn't determine (timeout, incomplete quantifier reasoning, etc.).
    Unknown(String),
}

impl SolverResult {
    /// Returns `true` if the result is `Sat`.
    pub fn is_sat(&self) -> bool {
        matches!(self, SolverResult::Sat(_))
    }

    /// Returns `true` if the result is `Unsat`.
    pub fn is_unsat(&self) -> bool {
        matches!(self, SolverResult::Unsat)
    }

    /// Returns `true` if the result is `Unknown`.
    pub fn is_unknown(&self) -> bool {
        matches!(self, SolverResult::Unknown(_))
    }

    /// Returns the counterexample if the result is `Sat` with one.
    pub fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            SolverResult::Sat(Some(cex)) => Some(cex),
            _ => None,
        }
    }

    /// Consume the result, yielding the counterexample or an empty one.
    pub fn into_counterexample(self) -> Counterexample {
        match self {
            SolverResult::Sat(Some(cex)) => cex,
            _ => Counterexample::default(),
        }
    }

    /// Map a bare Z3 status; `Sat` carries no counterexample.
    pub(crate) fn from_status(status: SatResult, reason: impl FnOnce() -> Option<String>) -> Self {
        match status {
            SatResult::Sat => SolverResult::Sat(None),
            SatResult::Unsat => SolverResult::Unsat,
            SatResult::Unknown => {
                SolverResult::Unknown(reason().unwrap_or_else(|| "unknown".to_string()))
            }
        }
    }
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverResult::Sat(_) => write!(f, "sat"),
            SolverResult::Unsat => write!(f, "unsat"),
            SolverResult::Unknown(reason) => write!(f, "unknown ({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sat_predicates() {
        let sat = SolverResult::Sat(None);
        assert!(sat.is_sat());
        assert!(!sat.is_unsat());
        assert!(!sat.is_unknown());
    }

    #[test]
    fn unknown_predicates() {
        let unknown = SolverResult::Unknown("timeout".to_string());
        assert!(!unknown.is_sat());
        assert!(!unknown.is_unsat());
        assert!(unknown.is_unknown());
    }

    #[test]
    fn counterexample_accessor() {
        let mut cex = Counterexample::default();
        cex.pkt_fields.insert("pkt_0".to_string(), 5);
        let sat_with = SolverResult::Sat(Some(cex.clone()));
        assert_eq!(sat_with.counterexample(), Some(&cex));
        assert_eq!(sat_with.into_counterexample(), cex);

        assert_eq!(SolverResult::Sat(None).counterexample(), None);
        assert!(SolverResult::Unsat.into_counterexample().is_empty());
    }

    #[test]
    fn from_status_uses_reason() {
        let result = SolverResult::from_status(SatResult::Unknown, || Some("timeout".into()));
        assert_eq!(result, SolverResult::Unknown("timeout".to_string()));

        let result = SolverResult::from_status(SatResult::Unknown, || None);
        assert_eq!(result, SolverResult::Unknown("unknown".to_string()));

        assert_eq!(SolverResult::from_status(SatResult::Unsat, || None), SolverResult::Unsat);
    }

    #[test]
    fn display_status() {
        assert_eq!(SolverResult::Sat(None).to_string(), "sat");
        assert_eq!(SolverResult::Unsat.to_string(), "unsat");
        assert_eq!(
            SolverResult::Unknown("canceled".into()).to_string(),
            "unknown (canceled)"
        );
    }
}
