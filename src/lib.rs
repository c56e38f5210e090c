//! # kernelcast
//!
//! Conflict-directed A* model-based diagnosis over a propositional model in
//! conjunctive normal form.
//!
//! Given a CNF model of a hardware system's normal/faulty behavior together with
//! observed values at its inputs and outputs, [`diagnosis::return_consistent_configurations`]
//! enumerates the `N` most probable component-mode assignments consistent with the
//! model. Inconsistent candidates are turned into conflicts, conflicts are inverted
//! (De Morgan) into *kernel* fault hypotheses, and the kernel frontier is expanded in
//! best-first, highest-prior-probability order until `N` consistent configurations are
//! found or the frontier is exhausted.
//!
//! ## Architecture
//!
//! The crate is organized into four layers mirroring the data flow of the search:
//!
//! - **Domain model** ([`model`]): components, propositions, clauses, and the model
//!   they compose.
//! - **Evaluator** ([`evaluator`]): CNF satisfaction checking, conflict extraction, and
//!   completion of partial assignments over intermediate variables.
//! - **Diagnosis** ([`diagnosis`]): conflict inversion, kernel-frontier maintenance
//!   under subset minimality, and the best-first driver.
//! - **Utilities** ([`util`]): likelihood aggregation, candidate filtering, and the
//!   `bias_mode1` tie-break helper.
//!
//! ## Quick start
//!
//! ```
//! use kernelcast::model::{Component, Model, Clause, ClauseId, Proposition};
//! use kernelcast::diagnosis::{return_consistent_configurations, SearchLimits};
//! use std::collections::HashSet;
//!
//! // A single power relay P gates input A through to output V.
//! let p = Component::new("P", vec![0, 1], vec![0.015, 0.985], true).unwrap();
//! let a = Component::new("A", vec![1], vec![1.0], false).unwrap();
//! let v = Component::new("V", vec![1], vec![1.0], false).unwrap();
//!
//! let not_p = Proposition::given(p.clone(), 0);
//! let not_a = Proposition::given(a.clone(), 0); // A's domain excludes 0: a dead disjunct
//! let out_v = Proposition::given(v.clone(), 1);
//!
//! let clause = Clause::new(ClauseId(0), "Pb", [not_p, not_a, out_v]);
//! let model = Model::new(vec![clause]);
//!
//! let known_inputs = HashSet::from([a]);
//! let known_outputs = HashSet::from([v]);
//!
//! let outcome = return_consistent_configurations(
//!     &model,
//!     &known_inputs,
//!     &known_outputs,
//!     1,
//!     &SearchLimits::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(outcome.configurations.len(), 1);
//! assert!((outcome.likelihoods[0] - 0.985).abs() < 1e-9);
//! ```

pub mod diagnosis;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod util;

pub use diagnosis::{return_consistent_configurations, DiagnosisOutcome, SearchLimits};
pub use error::DiagnosisError;
pub use model::{Assignment, Clause, ClauseId, Component, Kernel, Model, Proposition, Support};
