//! Likelihood aggregation, candidate filtering, and the `bias_mode1` tie-break helper.

use std::collections::HashSet;

use crate::model::{Assignment, Proposition, Support};

/// The unnormalized probability of an assignment: the product of its propositions'
/// priors.
pub fn likelihood(assignment: &Assignment) -> f64 {
    assignment.iter().map(|p| p.prob).product()
}

/// Filters `assignment` down to the propositions bound to an assignable component.
pub fn assignable_propositions(assignment: &Assignment) -> HashSet<Proposition> {
    assignment
        .iter()
        .filter(|p| p.component.assignable())
        .cloned()
        .collect()
}

/// Applies `kernel` to `candidate`: every proposition in `candidate` that binds a
/// component also bound by `kernel` is replaced by `kernel`'s binding, tagged
/// [`Support::Kernel`].
pub fn apply_kernel(candidate: &Assignment, kernel: &HashSet<Proposition>) -> Assignment {
    let mut updated: Assignment = candidate
        .iter()
        .filter(|p| !kernel.iter().any(|k| k.component == p.component))
        .cloned()
        .collect();
    for prop in kernel {
        updated.insert(Proposition {
            support: Support::Kernel,
            ..prop.clone()
        });
    }
    updated
}

/// Picks the proposition(s) with the highest prior from `propositions`.
///
/// If one proposition is uniquely maximal, it alone is returned. On a tie, every
/// tied proposition is returned, unless `bias_mode1` is set and at least one tied
/// proposition is for mode `1` — in that case only the mode-`1` tied proposition(s)
/// are returned.
pub fn find_highest_probability_proposition(
    propositions: &[Proposition],
    bias_mode1: bool,
) -> Vec<Proposition> {
    let max_prob = propositions
        .iter()
        .map(|p| p.prob)
        .fold(f64::MIN, f64::max);
    let tied: Vec<&Proposition> = propositions.iter().filter(|p| p.prob == max_prob).collect();

    if tied.len() == 1 {
        return vec![tied[0].clone()];
    }
    if !bias_mode1 {
        return tied.into_iter().cloned().collect();
    }

    let mode1: Vec<&Proposition> = tied.iter().filter(|p| p.mode == 1).copied().collect();
    if mode1.is_empty() {
        tied.into_iter().cloned().collect()
    } else {
        mode1.into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Component;

    #[test]
    fn likelihood_multiplies_priors() {
        let a = Component::new("A", vec![0, 1], vec![0.2, 0.8], true).unwrap();
        let b = Component::new("B", vec![0, 1], vec![0.1, 0.9], true).unwrap();
        let assignment: Assignment =
            HashSet::from([Proposition::given(a, 1), Proposition::given(b, 1)]);
        assert!((likelihood(&assignment) - 0.72).abs() < 1e-12);
    }

    #[test]
    fn assignable_propositions_drops_fixed_components() {
        let a = Component::new("A", vec![0, 1], vec![0.2, 0.8], true).unwrap();
        let v = Component::new("V", vec![1], vec![1.0], false).unwrap();
        let assignment: Assignment =
            HashSet::from([Proposition::given(a.clone(), 1), Proposition::given(v, 1)]);
        let filtered = assignable_propositions(&assignment);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.iter().next().unwrap().component, a);
    }

    #[test]
    fn apply_kernel_replaces_bound_component() {
        let a = Component::new("A", vec![0, 1], vec![0.2, 0.8], true).unwrap();
        let candidate: Assignment = HashSet::from([Proposition::given(a.clone(), 1)]);
        let kernel = HashSet::from([Proposition::given(a.clone(), 0)]);
        let updated = apply_kernel(&candidate, &kernel);
        assert_eq!(updated.len(), 1);
        let prop = updated.iter().next().unwrap();
        assert_eq!(prop.mode, 0);
        assert_eq!(prop.support, Support::Kernel);
    }

    #[test]
    fn find_highest_probability_proposition_unique_max() {
        let a = Component::new("A", vec![0, 1], vec![0.2, 0.8], true).unwrap();
        let props = vec![Proposition::given(a.clone(), 0), Proposition::given(a, 1)];
        let best = find_highest_probability_proposition(&props, false);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].mode, 1);
    }

    #[test]
    fn find_highest_probability_proposition_bias_mode1_breaks_tie() {
        let a = Component::new("A", vec![0, 1], vec![0.5, 0.5], true).unwrap();
        let b = Component::new("B", vec![0, 1], vec![0.5, 0.5], true).unwrap();
        let props = vec![Proposition::given(a, 0), Proposition::given(b, 1)];
        let best = find_highest_probability_proposition(&props, true);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].mode, 1);
    }

    #[test]
    fn find_highest_probability_proposition_no_bias_returns_all_tied() {
        let a = Component::new("A", vec![0, 1], vec![0.5, 0.5], true).unwrap();
        let b = Component::new("B", vec![0, 1], vec![0.5, 0.5], true).unwrap();
        let props = vec![Proposition::given(a, 0), Proposition::given(b, 1)];
        let best = find_highest_probability_proposition(&props, false);
        assert_eq!(best.len(), 2);
    }
}
