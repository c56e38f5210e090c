//! CNF satisfaction checking, conflict extraction, and completion of partial
//! assignments over components the caller did not bind.

use std::collections::{HashMap, HashSet};

use log::{trace, warn};

use crate::error::DiagnosisError;
use crate::model::{Assignment, Clause, Component, Model, Proposition};

/// Tests one clause against `assignment`.
///
/// Returns `Ok(HashSet::new())` if the clause is satisfied. Otherwise returns the set
/// of propositions *from `assignment`* that stand in the way of satisfaction: for
/// every assignable component the clause mentions whose disjunct `assignment` does not
/// match, the proposition `assignment` actually bound it to (not the clause's own
/// disjunct) — this is what conflict inversion must flip away from. A clause that
/// mentions a component absent entirely from `assignment` is only an error if the
/// clause is not already satisfied by some other disjunct — a clause can be vacuously
/// true without every component it mentions being bound.
pub fn test_clause(
    clause: &Clause,
    assignment: &Assignment,
) -> Result<HashSet<Proposition>, DiagnosisError> {
    let mut bound: HashMap<&Component, &Proposition> = HashMap::new();
    for prop in assignment {
        if let Some(existing) = bound.get(&prop.component) {
            if existing.mode != prop.mode {
                return Err(DiagnosisError::DuplicateAssignment {
                    component: prop.component.name().to_string(),
                });
            }
        }
        bound.insert(&prop.component, prop);
    }

    if clause
        .props
        .iter()
        .any(|p| bound.get(&p.component).map(|b| b.mode) == Some(p.mode))
    {
        trace!("clause `{}` satisfied", clause.name);
        return Ok(HashSet::new());
    }

    for prop in &clause.props {
        if !bound.contains_key(&prop.component) {
            return Err(DiagnosisError::IncompleteAssignment {
                clause: clause.name.clone(),
                component: prop.component.name().to_string(),
            });
        }
    }

    let conflict: HashSet<Proposition> = clause
        .props
        .iter()
        .filter(|p| p.component.assignable())
        .map(|p| (*bound[&p.component]).clone())
        .collect();
    trace!(
        "clause `{}` unsatisfied, conflict has {} proposition(s)",
        clause.name,
        conflict.len()
    );
    Ok(conflict)
}

/// Tests every clause of `model` against every assignment in `assignments` (one of the
/// completions of a candidate fault hypothesis).
///
/// Returns `Ok(None)` the moment any assignment satisfies the whole model. Otherwise
/// returns `Ok(Some(conflict))`, the union of every clause's conflict across every
/// assignment tried.
pub fn check_model(
    model: &Model,
    assignments: &[Assignment],
) -> Result<Option<HashSet<Proposition>>, DiagnosisError> {
    let mut conflict: HashSet<Proposition> = HashSet::new();
    for assignment in assignments {
        let mut satisfied_all = true;
        for clause in model.clauses() {
            let partial = test_clause(clause, assignment)?;
            if !partial.is_empty() {
                satisfied_all = false;
                conflict.extend(partial);
            }
        }
        if satisfied_all {
            return Ok(None);
        }
    }
    Ok(Some(conflict))
}

/// Completes `partial` over every component of `model` that `partial` leaves unbound,
/// returning one assignment per combination of modes for those components (their
/// Cartesian product).
///
/// An assignable component left unbound is unusual enough to `warn!` about — ordinary
/// calls bind every assignable component via a kernel before completing — but it is
/// not an error: its full domain is enumerated like any other free component.
pub fn complete(model: &Model, partial: &Assignment) -> Vec<Assignment> {
    let bound: std::collections::HashSet<&Component> =
        partial.iter().map(|p| &p.component).collect();
    let missing: Vec<&Component> = model
        .components()
        .iter()
        .filter(|c| !bound.contains(c))
        .collect();

    for component in &missing {
        if component.assignable() {
            warn!(
                "completing assignment with assignable component `{}` left unbound",
                component.name()
            );
        }
    }

    if missing.is_empty() {
        return vec![partial.clone()];
    }

    let domains: Vec<Vec<Proposition>> = missing
        .iter()
        .map(|c| {
            c.domain()
                .iter()
                .map(|&mode| Proposition::given((*c).clone(), mode))
                .collect()
        })
        .collect();

    domains.into_iter().fold(vec![partial.clone()], |acc, props| {
        acc.into_iter()
            .flat_map(|assignment| {
                props.iter().map(move |prop| {
                    let mut next = assignment.clone();
                    next.insert(prop.clone());
                    next
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClauseId;
    use std::collections::HashSet;

    /// A single power relay clause: not_P OR not_in (dead, A's domain excludes 0) OR
    /// out. Satisfied whenever the relay is open (P=0) or the output reads high.
    fn relay_model() -> (Model, Component, Component, Component) {
        let p = Component::new("P", vec![0, 1], vec![0.015, 0.985], true).unwrap();
        let a = Component::new("A", vec![1], vec![1.0], false).unwrap();
        let v = Component::new("V", vec![0, 1], vec![1.0, 1.0], false).unwrap();
        let clause = Clause::new(
            ClauseId(0),
            "Pb",
            [
                Proposition::given(p.clone(), 0),
                Proposition::given(a.clone(), 0),
                Proposition::given(v.clone(), 1),
            ],
        );
        (Model::new(vec![clause]), p, a, v)
    }

    #[test]
    fn satisfied_clause_has_no_conflict() {
        let (model, p, a, v) = relay_model();
        let assignment: Assignment = HashSet::from([
            Proposition::given(p, 1),
            Proposition::given(a, 1),
            Proposition::given(v, 1),
        ]);
        let conflict = test_clause(&model.clauses()[0], &assignment).unwrap();
        assert!(conflict.is_empty());
    }

    #[test]
    fn unsatisfied_clause_yields_assignable_conflict() {
        let (model, p, a, v) = relay_model();
        let assignment: Assignment = HashSet::from([
            Proposition::given(p.clone(), 1),
            Proposition::given(a, 1),
            Proposition::given(v, 0),
        ]);
        let conflict = test_clause(&model.clauses()[0], &assignment).unwrap();
        assert_eq!(conflict.len(), 1);
        assert_eq!(conflict.iter().next().unwrap().component, p);
    }

    #[test]
    fn missing_component_on_unsatisfied_clause_is_incomplete() {
        let (model, _p, a, v) = relay_model();
        let assignment: Assignment = HashSet::from([Proposition::given(a, 1), Proposition::given(v, 0)]);
        let err = test_clause(&model.clauses()[0], &assignment).unwrap_err();
        assert!(matches!(err, DiagnosisError::IncompleteAssignment { .. }));
    }

    #[test]
    fn missing_component_on_satisfied_clause_is_not_an_error() {
        let (model, _p, a, v) = relay_model();
        let assignment: Assignment = HashSet::from([Proposition::given(a, 1), Proposition::given(v, 1)]);
        let conflict = test_clause(&model.clauses()[0], &assignment).unwrap();
        assert!(conflict.is_empty());
    }

    #[test]
    fn duplicate_assignment_is_an_error() {
        let (model, p, a, v) = relay_model();
        let assignment: Assignment = HashSet::from([
            Proposition::given(p.clone(), 0),
            Proposition::given(p, 1),
            Proposition::given(a, 1),
            Proposition::given(v, 1),
        ]);
        let err = test_clause(&model.clauses()[0], &assignment).unwrap_err();
        assert!(matches!(err, DiagnosisError::DuplicateAssignment { .. }));
    }

    #[test]
    fn complete_enumerates_cartesian_product_of_missing_components() {
        let (model, p, _a, _v) = relay_model();
        let partial: Assignment = HashSet::new();
        let completed = complete(&model, &partial);
        // P has 2 modes, A and V have 1 each: 2 * 1 * 1 = 2 completions.
        assert_eq!(completed.len(), 2);
        for assignment in &completed {
            assert!(assignment.iter().any(|p2| p2.component == p));
        }
    }

    #[test]
    fn check_model_returns_none_when_some_assignment_satisfies() {
        let (model, p, a, v) = relay_model();
        let assignments = vec![HashSet::from([
            Proposition::given(p, 1),
            Proposition::given(a, 1),
            Proposition::given(v, 1),
        ])];
        assert!(check_model(&model, &assignments).unwrap().is_none());
    }

    #[test]
    fn check_model_returns_conflict_when_no_assignment_satisfies() {
        let (model, p, a, v) = relay_model();
        let assignments = vec![HashSet::from([
            Proposition::given(p.clone(), 1),
            Proposition::given(a, 1),
            Proposition::given(v, 0),
        ])];
        let conflict = check_model(&model, &assignments).unwrap().unwrap();
        assert_eq!(conflict.len(), 1);
        assert_eq!(conflict.iter().next().unwrap().component, p);
    }
}
