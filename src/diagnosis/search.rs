//! Best-first kernel-frontier expansion: the conflict-directed A* driver.

use std::collections::HashSet;

use log::{debug, warn};

use crate::diagnosis::kernel;
use crate::error::DiagnosisError;
use crate::evaluator::{check_model, complete};
use crate::model::{Assignment, Component, Model, Proposition};
use crate::util::likelihood;

/// Caps on how much of the kernel frontier a single search may expand, to bound
/// pathological models that never converge to `N` configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLimits {
    /// Stop expanding once this many kernels have been tested against the model,
    /// even if fewer than the requested number of configurations have been found.
    /// `None` means expand until the frontier is exhausted.
    pub max_kernels_expanded: Option<usize>,
}

/// The result of a search: as many configurations as were found (up to the number
/// requested), their likelihoods in the same order, and a short human-readable summary
/// of how the search ended.
#[derive(Debug, Clone)]
pub struct DiagnosisOutcome {
    /// Consistent configurations, most probable tested first.
    pub configurations: Vec<Assignment>,
    /// `likelihoods[i]` is the unnormalized probability of `configurations[i]`.
    pub likelihoods: Vec<f64>,
    /// A summary of how the search concluded — found `N`, found fewer and exhausted
    /// the frontier, hit a configured limit, or required no faults at all.
    pub frontier_log: String,
}

fn best_kernel_index(kernels: &[HashSet<Proposition>]) -> Option<usize> {
    let mut max_prob = 0.0;
    let mut best = None;
    for (i, kernel) in kernels.iter().enumerate() {
        let prob = kernel::score(kernel);
        if prob > max_prob {
            max_prob = prob;
            best = Some(i);
        }
    }
    best
}

/// Enumerates the `n_wanted` most probable component-mode assignments consistent with
/// `model`, given fixed `known_inputs` and `known_outputs`.
///
/// Starts from the highest-probability mode for every known input/output and every
/// assignable component. If that configuration already satisfies the model, it is
/// returned alone — the most probable diagnosis is that nothing is broken. Otherwise
/// the conflicts it raises are inverted into a frontier of candidate fault kernels,
/// which are tested in best-first (highest-prior) order; a kernel that still conflicts
/// contributes its own children to the next round of the frontier. The search ends
/// when `n_wanted` configurations have been found, the frontier is exhausted, or
/// `limits.max_kernels_expanded` is reached.
pub fn return_consistent_configurations(
    model: &Model,
    known_inputs: &HashSet<Component>,
    known_outputs: &HashSet<Component>,
    n_wanted: usize,
    limits: &SearchLimits,
) -> Result<DiagnosisOutcome, DiagnosisError> {
    let mut candidate_props: Assignment = HashSet::new();
    for component in known_inputs.iter().chain(known_outputs.iter()) {
        candidate_props.insert(component.max_proposition());
    }
    for component in model.components() {
        if component.assignable() {
            candidate_props.insert(component.max_proposition());
        }
    }

    let can_prop_list = complete(model, &candidate_props);
    let conflict = check_model(model, &can_prop_list)?;

    let Some(conflict) = conflict else {
        debug!("the best diagnosis is that all hardware is functioning normally");
        return Ok(DiagnosisOutcome {
            configurations: vec![candidate_props.clone()],
            likelihoods: vec![likelihood(&candidate_props)],
            frontier_log: "initial configuration satisfies the model; no faults required"
                .to_string(),
        });
    };

    let mut used_kernels: Vec<HashSet<Proposition>> = Vec::new();
    let mut kernel_children: Vec<Option<Vec<HashSet<Proposition>>>> = Vec::new();
    let mut consistent_configs: Vec<Assignment> = Vec::new();
    let mut config_likelihoods: Vec<f64> = Vec::new();
    let mut n: isize = -1;

    let mut seed_kernels = kernel::all_kernels(Vec::new(), std::iter::once(conflict));
    let frontier_log;

    'rounds: loop {
        let mut kernels_to_test: Vec<HashSet<Proposition>> = seed_kernels
            .into_iter()
            .filter(|k| !used_kernels.contains(k))
            .collect();

        while !kernels_to_test.is_empty() && consistent_configs.len() < n_wanted {
            if let Some(limit) = limits.max_kernels_expanded {
                if used_kernels.len() >= limit {
                    warn!("kernel expansion limit of {limit} reached");
                    frontier_log = format!(
                        "stopped after the configured limit of {limit} kernel(s); found {} of {n_wanted} requested",
                        consistent_configs.len()
                    );
                    break 'rounds;
                }
            }
            let Some(best_idx) = best_kernel_index(&kernels_to_test) else {
                break;
            };
            let best_kernel = kernels_to_test.remove(best_idx);

            let can_props = crate::util::apply_kernel(&candidate_props, &best_kernel);
            used_kernels.push(best_kernel.clone());

            let can_prop_list = complete(model, &can_props);
            let conflict = check_model(model, &can_prop_list)?;

            match conflict {
                None => {
                    kernel_children.push(None);
                    consistent_configs.push(can_props.clone());
                    config_likelihoods.push(likelihood(&can_props));
                    debug!(
                        "kernel {} yields configuration {}/{n_wanted}",
                        used_kernels.len() - 1,
                        consistent_configs.len()
                    );
                }
                Some(conflict) => {
                    let kids = kernel::extend(std::slice::from_ref(&best_kernel), &conflict);
                    kernel_children.push(Some(kids));
                }
            }
        }

        if consistent_configs.len() >= n_wanted {
            frontier_log = format!("returning the {n_wanted} most likely satisfiable configurations");
            break 'rounds;
        }

        let mut next_seeds: Vec<HashSet<Proposition>> = Vec::new();
        while (n + 1) < kernel_children.len() as isize {
            n += 1;
            if let Some(kids) = &kernel_children[n as usize] {
                for kid in kids {
                    if !next_seeds.contains(kid) {
                        next_seeds.push(kid.clone());
                    }
                }
            }
        }
        if next_seeds.is_empty() {
            warn!(
                "exhausted the kernel frontier with {} of {n_wanted} requested configurations found",
                consistent_configs.len()
            );
            frontier_log = format!(
                "exhausted the kernel frontier; found {} of {n_wanted} requested",
                consistent_configs.len()
            );
            break 'rounds;
        }
        seed_kernels = next_seeds;
    }

    Ok(DiagnosisOutcome {
        configurations: consistent_configs,
        likelihoods: config_likelihoods,
        frontier_log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Clause, ClauseId, Proposition};

    fn relay_model() -> (Model, Component, Component, Component) {
        let p = Component::new("P", vec![0, 1], vec![0.015, 0.985], true).unwrap();
        let a = Component::new("A", vec![1], vec![1.0], false).unwrap();
        let v = Component::new("V", vec![1], vec![1.0], false).unwrap();
        let clause = Clause::new(
            ClauseId(0),
            "Pa",
            [
                Proposition::given(p.clone(), 0),
                Proposition::given(a.clone(), 1),
                Proposition::given(v.clone(), 1),
            ],
        );
        (Model::new(vec![clause]), p, a, v)
    }

    #[test]
    fn trivial_model_needs_no_faults() {
        let (model, _p, a, v) = relay_model();
        let known_inputs = HashSet::from([a]);
        let known_outputs = HashSet::from([v]);
        let outcome = return_consistent_configurations(
            &model,
            &known_inputs,
            &known_outputs,
            1,
            &SearchLimits::default(),
        )
        .unwrap();
        assert_eq!(outcome.configurations.len(), 1);
        assert!((outcome.likelihoods[0] - 0.985).abs() < 1e-9);
    }

    #[test]
    fn single_fault_diagnosis_finds_the_relay_off() {
        // The output reads low (V=0) with the input high (A=1): the relay must be
        // open (P=0) to satisfy the clause.
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
        let model = Model::new(vec![clause]);
        let known_inputs = HashSet::from([a]);
        let known_outputs = HashSet::from([v.clone()]);
        let outcome = return_consistent_configurations(
            &model,
            &known_inputs,
            &known_outputs,
            1,
            &SearchLimits::default(),
        )
        .unwrap();
        assert_eq!(outcome.configurations.len(), 1);
        let config = &outcome.configurations[0];
        assert!(config.contains(&Proposition::given(p, 0)));
    }

    #[test]
    fn limit_stops_expansion_before_n_is_reached() {
        let p = Component::new("P", vec![0, 1], vec![0.015, 0.985], true).unwrap();
        let a = Component::new("A", vec![1], vec![1.0], false).unwrap();
        let v = Component::new("V", vec![0, 1], vec![1.0, 1.0], false).unwrap();
        let clause = Clause::new(
            ClauseId(0),
            "Pb",
            [
                Proposition::given(p, 0),
                Proposition::given(a.clone(), 0),
                Proposition::given(v.clone(), 1),
            ],
        );
        let model = Model::new(vec![clause]);
        let known_inputs = HashSet::from([a]);
        let mut known_outputs = HashSet::new();
        known_outputs.insert(v);
        let limits = SearchLimits {
            max_kernels_expanded: Some(0),
        };
        let outcome =
            return_consistent_configurations(&model, &known_inputs, &known_outputs, 5, &limits)
                .unwrap();
        assert!(outcome.configurations.is_empty());
        assert!(outcome.frontier_log.contains("limit"));
    }
}
