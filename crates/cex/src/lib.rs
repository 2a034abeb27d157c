//! # chipc-cex
//!
//! Counterexample extraction for SMT2 formulas generated by Sketch.
//!
//! A Sketch verification condition is a single universally quantified
//! assertion over integer inputs. Negating its body and solving with Z3
//! yields an input that violates it; the model is decoded into packet field
//! and state group assignments.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use chipc_cex::{generate_counter_examples, simple_check};
//!
//! let cex = generate_counter_examples(Path::new("sketch_out.smt2")).unwrap();
//! for (field, value) in &cex.pkt_fields {
//!     println!("{field} = {value}");
//! }
//!
//! let holds_somewhere = simple_check(Path::new("sketch_range.smt2")).unwrap();
//! println!("satisfiable: {holds_somewhere}");
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod loader;
pub mod model;
pub mod names;
pub mod quantifier;
pub mod result;
mod sys;

// Re-export primary types for ergonomic use
pub use config::SolverConfig;
pub use error::CexError;
pub use extract::{
    check_file, find_counterexample, generate_counter_examples, generate_counter_examples_with,
    simple_check, simple_check_with,
};
pub use loader::{parse_smt2_file, parse_smt2_str};
pub use model::Counterexample;
pub use names::VarCategory;
pub use quantifier::negated_body;
pub use result::SolverResult;
