//! Conflict inversion (De Morgan) and kernel-frontier maintenance under subset
//! minimality.

use std::collections::{HashMap, HashSet};

use crate::model::{Component, Mode, Proposition};

/// Inverts a conflict (a conjunction of propositions that cannot all hold) into the
/// disjunction of alternatives that would resolve it: for every component mentioned in
/// `conflict`, every proposition over a mode the conflict did *not* pin it to.
pub fn invert(conflict: &HashSet<Proposition>) -> HashSet<Proposition> {
    let mut modes_by_component: HashMap<&Component, Vec<Mode>> = HashMap::new();
    for prop in conflict {
        modes_by_component
            .entry(&prop.component)
            .or_default()
            .push(prop.mode);
    }
    let mut diagnoses = HashSet::new();
    for (component, modes) in modes_by_component {
        diagnoses.extend(component.remaining_propositions(&modes));
    }
    diagnoses
}

/// Folds a new `conflict` into the kernel frontier `kernels`, producing the updated
/// frontier.
///
/// A kernel already in `kernels` that is a subset of the inverted conflict is kept
/// as-is (it already explains this conflict too) and its propositions are consumed
/// from the candidate diagnoses so they are not also fused into a superset. Every
/// remaining candidate diagnosis is then fused with every remaining kernel that does
/// not already bind the same component, producing new, larger kernels. The result
/// never contains one kernel that is a proper superset of another.
pub fn extend(kernels: &[HashSet<Proposition>], conflict: &HashSet<Proposition>) -> Vec<HashSet<Proposition>> {
    let mut candidate_diagnoses = invert(conflict);

    if kernels.is_empty() {
        return candidate_diagnoses
            .into_iter()
            .map(|prop| HashSet::from([prop]))
            .collect();
    }

    let mut output = Vec::new();
    let mut remaining_kernels: Vec<&HashSet<Proposition>> = Vec::new();
    for kernel in kernels {
        if kernel.is_subset(&candidate_diagnoses) {
            for prop in kernel {
                candidate_diagnoses.remove(prop);
            }
            output.push(kernel.clone());
        } else {
            remaining_kernels.push(kernel);
        }
    }

    for elem in &candidate_diagnoses {
        for kernel in &remaining_kernels {
            let shares_component = kernel.iter().any(|p| p.component == elem.component);
            if !shares_component {
                let mut fused = (*kernel).clone();
                fused.insert(elem.clone());
                output.push(fused);
            }
        }
    }
    output
}

/// Folds [`extend`] over a sequence of conflicts, starting from `kernels`.
pub fn all_kernels(
    kernels: Vec<HashSet<Proposition>>,
    conflicts: impl IntoIterator<Item = HashSet<Proposition>>,
) -> Vec<HashSet<Proposition>> {
    conflicts
        .into_iter()
        .fold(kernels, |acc, conflict| extend(&acc, &conflict))
}

/// The unnormalized probability of a kernel: the product of its propositions' priors.
pub fn score(kernel: &HashSet<Proposition>) -> f64 {
    kernel.iter().map(|p| p.prob).product()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Component;

    fn relay() -> Component {
        Component::new("P", vec![0, 1], vec![0.015, 0.985], true).unwrap()
    }

    #[test]
    fn invert_excludes_conflicted_modes() {
        let p = relay();
        let conflict = HashSet::from([Proposition::given(p.clone(), 1)]);
        let diagnoses = invert(&conflict);
        assert_eq!(diagnoses, HashSet::from([Proposition::given(p, 0)]));
    }

    #[test]
    fn extend_from_empty_frontier_singletons_each_diagnosis() {
        let p = relay();
        let q = Component::new("Q", vec![0, 1], vec![0.02, 0.98], true).unwrap();
        let conflict = HashSet::from([Proposition::given(p.clone(), 1), Proposition::given(q.clone(), 1)]);
        let kernels = extend(&[], &conflict);
        assert_eq!(kernels.len(), 2);
        assert!(kernels.contains(&HashSet::from([Proposition::given(p, 0)])));
        assert!(kernels.contains(&HashSet::from([Proposition::given(q, 0)])));
    }

    #[test]
    fn extend_keeps_subsuming_kernel_and_consumes_its_element() {
        let p = relay();
        let q = Component::new("Q", vec![0, 1], vec![0.02, 0.98], true).unwrap();
        let existing = vec![HashSet::from([Proposition::given(p.clone(), 0)])];
        let conflict = HashSet::from([Proposition::given(p.clone(), 1), Proposition::given(q.clone(), 1)]);
        let kernels = extend(&existing, &conflict);
        // the existing {P=0} kernel already resolves this conflict, so it is kept,
        // and P's diagnosis is not separately fused with anything.
        assert!(kernels.contains(&HashSet::from([Proposition::given(p, 0)])));
        assert_eq!(kernels.len(), 1);
    }

    #[test]
    fn extend_fuses_remaining_kernels_with_remaining_diagnoses() {
        let p = relay();
        let q = Component::new("Q", vec![0, 1], vec![0.02, 0.98], true).unwrap();
        let r = Component::new("R", vec![0, 1], vec![0.01, 0.99], true).unwrap();
        let existing = vec![HashSet::from([Proposition::given(r.clone(), 0)])];
        let conflict = HashSet::from([Proposition::given(p.clone(), 1), Proposition::given(q.clone(), 1)]);
        let kernels = extend(&existing, &conflict);
        assert!(kernels.contains(&HashSet::from([
            Proposition::given(r.clone(), 0),
            Proposition::given(p, 0),
        ])));
        assert!(kernels.contains(&HashSet::from([Proposition::given(r, 0), Proposition::given(q, 0)])));
        assert_eq!(kernels.len(), 2);
    }

    #[test]
    fn score_is_product_of_priors() {
        let p = relay();
        let q = Component::new("Q", vec![0, 1], vec![0.02, 0.98], true).unwrap();
        let kernel = HashSet::from([Proposition::given(p, 0), Proposition::given(q, 0)]);
        assert!((score(&kernel) - 0.015 * 0.02).abs() < 1e-12);
    }
}
