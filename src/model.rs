//! Domain model: [`Component`], [`Proposition`], [`Clause`], and [`Model`].
//!
//! Components are interned behind an [`Rc`] so that identity follows the recommendation
//! in the design notes: two distinct `Component` instances with identical names are
//! distinct entities. [`Proposition`] hashes and compares by `(Component, mode)` only;
//! its `support` field is provenance, not identity.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::DiagnosisError;

/// A component's mode is a small integer drawn from its `domain`.
pub type Mode = i64;

/// A candidate or complete assignment: at most one proposition per component.
pub type Assignment = HashSet<Proposition>;

/// A conjunctive fault hypothesis: a set of propositions, each fixing one component to
/// one mode.
pub type Kernel = HashSet<Proposition>;

struct ComponentInner {
    name: String,
    domain: Vec<Mode>,
    priors: Vec<f64>,
    assignable: bool,
}

/// A named entity with a finite ordered domain of modes and a prior probability for
/// each. Cloning a `Component` clones a handle to the same entity; two components
/// built separately, even with the same name and domain, are distinct.
#[derive(Clone)]
pub struct Component(Rc<ComponentInner>);

impl Component {
    /// Builds a component, validating its construction invariants.
    ///
    /// If `domain` has exactly one mode, `assignable` is forced to `false` regardless
    /// of what is passed: single-mode components are fixed inputs/outputs, never fault
    /// hypotheses.
    pub fn new(
        name: impl Into<String>,
        domain: Vec<Mode>,
        priors: Vec<f64>,
        assignable: bool,
    ) -> Result<Component, DiagnosisError> {
        let name = name.into();
        if domain.is_empty() {
            return Err(DiagnosisError::MalformedComponent {
                name,
                reason: "domain must not be empty".to_string(),
            });
        }
        if domain.len() != priors.len() {
            return Err(DiagnosisError::MalformedComponent {
                name,
                reason: format!(
                    "domain has {} mode(s) but priors has {} entry(ies)",
                    domain.len(),
                    priors.len()
                ),
            });
        }
        let mut seen = HashSet::with_capacity(domain.len());
        for &mode in &domain {
            if !seen.insert(mode) {
                return Err(DiagnosisError::MalformedComponent {
                    name,
                    reason: format!("domain value {mode} is repeated"),
                });
            }
        }
        for &prior in &priors {
            if !(prior > 0.0 && prior <= 1.0) {
                return Err(DiagnosisError::MalformedComponent {
                    name,
                    reason: format!("prior {prior} is not in (0, 1]"),
                });
            }
        }
        let assignable = if domain.len() == 1 { false } else { assignable };
        Ok(Component(Rc::new(ComponentInner {
            name,
            domain,
            priors,
            assignable,
        })))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn domain(&self) -> &[Mode] {
        &self.0.domain
    }

    pub fn priors(&self) -> &[f64] {
        &self.0.priors
    }

    /// Whether this component's mode is a free variable of the diagnosis problem.
    /// Fixed inputs/outputs and intermediate variables are never assignable.
    pub fn assignable(&self) -> bool {
        self.0.assignable
    }

    /// The prior for `mode`, or `0.0` if `mode` is outside this component's domain.
    pub fn prior_of(&self, mode: Mode) -> f64 {
        self.domain()
            .iter()
            .position(|&m| m == mode)
            .map(|i| self.priors()[i])
            .unwrap_or(0.0)
    }

    /// The maximum prior in this component's domain, excluding the modes in `exclude`.
    ///
    /// Panics if every mode is excluded.
    pub fn max_prior_excluding(&self, exclude: &[Mode]) -> f64 {
        self.domain()
            .iter()
            .zip(self.priors())
            .filter(|(mode, _)| !exclude.contains(mode))
            .map(|(_, &prior)| prior)
            .fold(f64::MIN, f64::max)
    }

    /// The proposition with the maximum prior, excluding the modes in `exclude`.
    ///
    /// Panics if every mode is excluded.
    pub fn max_proposition_excluding(&self, exclude: &[Mode]) -> Proposition {
        let max_prior = self.max_prior_excluding(exclude);
        let mode = self
            .domain()
            .iter()
            .zip(self.priors())
            .find(|(mode, &prior)| !exclude.contains(mode) && prior == max_prior)
            .map(|(&mode, _)| mode)
            .expect("domain minus exclusions must be non-empty");
        Proposition::new(self.clone(), mode, Support::Given)
    }

    /// The proposition with the maximum prior over the full domain.
    pub fn max_proposition(&self) -> Proposition {
        self.max_proposition_excluding(&[])
    }

    /// All propositions over the modes remaining after excluding `exclude` — the
    /// building block of conflict inversion.
    pub fn remaining_propositions(&self, exclude: &[Mode]) -> HashSet<Proposition> {
        self.domain()
            .iter()
            .filter(|mode| !exclude.contains(mode))
            .map(|&mode| Proposition::new(self.clone(), mode, Support::Given))
            .collect()
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name())
    }
}

/// Provenance of a [`Proposition`]. Informational only — it does not participate in
/// equality or hashing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Support {
    /// Supplied directly by the caller (a known input/output, or a seed assignment).
    Given,
    /// Introduced by applying a kernel (fault hypothesis) to a candidate assignment.
    Kernel,
    /// Supported by membership in the named clause.
    FromClause(ClauseId),
}

/// Stable handle to a [`Clause`] within a [`Model`]'s clause arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClauseId(pub usize);

/// A pair (component, mode) asserting the component is in that mode.
///
/// Identity is `(Component, mode)`; `prob` and `support` are cached/informational and
/// do not participate in equality or hashing.
#[derive(Clone)]
pub struct Proposition {
    pub component: Component,
    pub mode: Mode,
    pub prob: f64,
    pub support: Support,
}

impl Proposition {
    pub fn new(component: Component, mode: Mode, support: Support) -> Proposition {
        let prob = component.prior_of(mode);
        Proposition {
            component,
            mode,
            prob,
            support,
        }
    }

    /// A proposition supplied directly by the caller.
    pub fn given(component: Component, mode: Mode) -> Proposition {
        Proposition::new(component, mode, Support::Given)
    }

    /// A proposition introduced by applying a kernel to a candidate assignment.
    pub fn kernel(component: Component, mode: Mode) -> Proposition {
        Proposition::new(component, mode, Support::Kernel)
    }
}

impl PartialEq for Proposition {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && self.component == other.component
    }
}

impl Eq for Proposition {}

impl Hash for Proposition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mode.hash(state);
        self.component.hash(state);
    }
}

impl fmt::Debug for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}={})", self.component.name(), self.mode)
    }
}

/// A named disjunction over a set of propositions, satisfied by a complete assignment
/// iff at least one member matches it.
#[derive(Clone, Debug)]
pub struct Clause {
    pub id: ClauseId,
    pub name: String,
    pub props: HashSet<Proposition>,
}

impl Clause {
    /// Builds a clause, tagging every proposition's support as `FromClause(id)` —
    /// overwriting whatever support they were constructed with, matching the source
    /// model's behavior of a clause claiming its propositions on construction.
    pub fn new(
        id: ClauseId,
        name: impl Into<String>,
        props: impl IntoIterator<Item = Proposition>,
    ) -> Clause {
        let props = props
            .into_iter()
            .map(|prop| Proposition {
                support: Support::FromClause(id),
                ..prop
            })
            .collect();
        Clause {
            id,
            name: name.into(),
            props,
        }
    }
}

/// A set of clauses joined by conjunction, plus the derived set of all components
/// referenced by any proposition in any clause.
pub struct Model {
    clauses: Vec<Clause>,
    components: HashSet<Component>,
}

impl Model {
    pub fn new(clauses: Vec<Clause>) -> Model {
        let mut components = HashSet::new();
        for clause in &clauses {
            for prop in &clause.props {
                components.insert(prop.component.clone());
            }
        }
        Model { clauses, components }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Every component referenced by a proposition in some clause of this model.
    pub fn components(&self) -> &HashSet<Component> {
        &self.components
    }
}
