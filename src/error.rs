//! Error taxonomy for the diagnosis engine.
//!
//! Only *structural* and *assignment* failures (see the crate's design notes) are
//! represented here. Search-exhausted and model-inconsistent are normal, non-error
//! return paths: [`crate::diagnosis::DiagnosisOutcome`] carries a diagnostic message
//! instead.

use thiserror::Error;

/// Failures that abort the current call rather than being reported as part of the
/// ordinary search outcome.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiagnosisError {
    /// A component's `domain`/`priors` vectors violate one of its construction
    /// invariants (mismatched lengths, empty domain, duplicate modes, or a prior
    /// outside `(0, 1]`).
    #[error("component `{name}` is malformed: {reason}")]
    MalformedComponent { name: String, reason: String },

    /// A clause mentions a component that has no corresponding proposition in the
    /// assignment under test.
    #[error(
        "clause `{clause}` references component `{component}`, which is absent from \
         the assignment under test"
    )]
    IncompleteAssignment { clause: String, component: String },

    /// Two propositions in the same candidate assignment bind the same component.
    #[error("candidate assignment binds component `{component}` to more than one mode")]
    DuplicateAssignment { component: String },
}
