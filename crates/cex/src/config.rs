use z3::{Config, Context, Params, Solver};

/// Environment variable overriding [`SolverConfig::timeout_ms`].
pub const TIMEOUT_ENV: &str = "CHIPC_CEX_TIMEOUT_MS";

/// Per-call solver configuration.
///
/// Each operation builds its own `z3::Context` and `Solver` from this value;
/// nothing is written to Z3's global parameter table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Keep proof objects for the check.
    pub proof: bool,
    /// Track assertions for unsat core extraction.
    pub unsat_core: bool,
    /// Timeout in milliseconds (0 = no timeout).
    pub timeout_ms: u64,
}

impl SolverConfig {
    /// Configuration used for counterexample search: proofs and unsat cores retained.
    pub fn counterexample() -> Self {
        Self {
            proof: true,
            unsat_core: true,
            timeout_ms: 0,
        }
    }

    pub fn with_proof(mut self, proof: bool) -> Self {
        self.proof = proof;
        self
    }

    pub fn with_unsat_core(mut self, unsat_core: bool) -> Self {
        self.unsat_core = unsat_core;
        self
    }

    /// Create config with a specific timeout (in milliseconds).
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Apply overrides from the process environment.
    ///
    /// Unparseable values are ignored.
    pub fn apply_env(self) -> Self {
        match std::env::var(TIMEOUT_ENV) {
            Ok(raw) => self.apply_timeout_override(&raw),
            Err(_) => self,
        }
    }

    fn apply_timeout_override(self, raw: &str) -> Self {
        match raw.trim().parse::<u64>() {
            Ok(timeout_ms) => self.with_timeout(timeout_ms),
            Err(e) => {
                tracing::warn!("Ignoring {TIMEOUT_ENV}={raw:?}: {e}");
                self
            }
        }
    }

    /// Build the `z3::Config` for a fresh context.
    pub fn z3_config(&self) -> Config {
        let mut cfg = Config::new();
        cfg.set_model_generation(true);
        cfg.set_proof_generation(self.proof);
        if self.timeout_ms > 0 {
            cfg.set_timeout_msec(self.timeout_ms);
        }
        cfg
    }

    /// Create a solver in `ctx` with this configuration's solver parameters.
    pub fn solver<'ctx>(&self, ctx: &'ctx Context) -> Solver<'ctx> {
        let solver = Solver::new(ctx);
        let mut params = Params::new(ctx);
        params.set_bool("unsat_core", self.unsat_core);
        if self.timeout_ms > 0 {
            params.set_u32("timeout", u32::try_from(self.timeout_ms).unwrap_or(u32::MAX));
        }
        solver.set_params(&params);
        solver
    }
}
