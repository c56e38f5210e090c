//! End-to-end scenarios exercising [`super::search::return_consistent_configurations`]
//! against small hand-built models, plus the cross-cutting invariants from the domain
//! model: kernel subset-minimality, no double-binding, and configuration satisfaction.

use std::collections::HashSet;

use crate::diagnosis::kernel;
use crate::diagnosis::search::{return_consistent_configurations, SearchLimits};
use crate::evaluator::{check_model, complete};
use crate::model::{Clause, ClauseId, Component, Model, Proposition};

fn relay(name: &str, input: &Component, output: &Component, id: &mut usize) -> (Component, Vec<Clause>) {
    let relay = Component::new(name, vec![0, 1], vec![0.02, 0.98], true).unwrap();
    let mut next_id = || {
        let c = ClauseId(*id);
        *id += 1;
        c
    };
    let clauses = vec![
        Clause::new(
            next_id(),
            format!("{name}a"),
            [
                Proposition::given(relay.clone(), 0),
                Proposition::given(output.clone(), 0),
                Proposition::given(input.clone(), 1),
            ],
        ),
        Clause::new(
            next_id(),
            format!("{name}b"),
            [
                Proposition::given(relay.clone(), 0),
                Proposition::given(input.clone(), 0),
                Proposition::given(output.clone(), 1),
            ],
        ),
        Clause::new(
            next_id(),
            format!("{name}c"),
            [
                Proposition::given(relay.clone(), 1),
                Proposition::given(output.clone(), 0),
            ],
        ),
    ];
    (relay, clauses)
}

#[test]
fn trivial_satisfiable_requires_no_faults() {
    let mut id = 0usize;
    let a = Component::new("A", vec![1], vec![1.0], false).unwrap();
    let v = Component::new("V", vec![1], vec![1.0], false).unwrap();
    let (_p, clauses) = relay("P", &a, &v, &mut id);
    let model = Model::new(clauses);
    let known_inputs = HashSet::from([a]);
    let known_outputs = HashSet::from([v]);

    let outcome =
        return_consistent_configurations(&model, &known_inputs, &known_outputs, 1, &SearchLimits::default())
            .unwrap();

    assert_eq!(outcome.configurations.len(), 1);
    assert!(outcome.frontier_log.contains("no faults"));
}

#[test]
fn two_relay_cascade_one_faulty() {
    let mut id = 0usize;
    let a = Component::new("A", vec![1], vec![1.0], false).unwrap();
    let v = Component::new("V", vec![0, 1], vec![1.0, 1.0], false).unwrap();
    let w = Component::new("W", vec![0, 1], vec![1.0, 1.0], false).unwrap();
    let (p1, mut clauses) = relay("P1", &a, &v, &mut id);
    let (p2, clauses2) = relay("P2", &v, &w, &mut id);
    clauses.extend(clauses2);
    let model = Model::new(clauses);

    let known_inputs = HashSet::from([a]);
    let known_outputs = HashSet::from([w.clone()]);

    let outcome =
        return_consistent_configurations(&model, &known_inputs, &known_outputs, 2, &SearchLimits::default())
            .unwrap();

    // W reads low by default (the initial tie-break) with both relays nominally
    // closed: that is inconsistent, so either relay alone being open resolves it —
    // two equally likely single-fault configurations.
    assert_eq!(outcome.configurations.len(), 2);
    let p1_faulty_alone = outcome.configurations.iter().any(|c| {
        c.contains(&Proposition::given(p1.clone(), 0)) && c.contains(&Proposition::given(p2.clone(), 1))
    });
    let p2_faulty_alone = outcome.configurations.iter().any(|c| {
        c.contains(&Proposition::given(p2.clone(), 0)) && c.contains(&Proposition::given(p1.clone(), 1))
    });
    assert!(p1_faulty_alone, "expected a configuration with only P1 open");
    assert!(p2_faulty_alone, "expected a configuration with only P2 open");
    assert!(
        (outcome.likelihoods[0] - outcome.likelihoods[1]).abs() < 1e-9,
        "both single-fault configurations should be equally likely: {:?}",
        outcome.likelihoods
    );
}

#[test]
fn model_inconsistency_returns_no_configurations() {
    // V can only ever read 0, but the sole clause demands V=1 with no assignable
    // component to blame: no kernel can ever resolve this.
    let v = Component::new("V", vec![0], vec![1.0], false).unwrap();
    let clause = Clause::new(ClauseId(0), "impossible", [Proposition::given(v.clone(), 1)]);
    let model = Model::new(vec![clause]);

    let known_inputs = HashSet::new();
    let known_outputs = HashSet::from([v]);

    let outcome =
        return_consistent_configurations(&model, &known_inputs, &known_outputs, 1, &SearchLimits::default())
            .unwrap();

    assert!(outcome.configurations.is_empty());
    assert!(outcome.frontier_log.contains("exhausted"));
}

#[test]
fn kernel_frontier_stays_subset_minimal_across_conflicts() {
    let p = Component::new("P", vec![0, 1], vec![0.02, 0.98], true).unwrap();
    let q = Component::new("Q", vec![0, 1], vec![0.03, 0.97], true).unwrap();

    let first_conflict = HashSet::from([Proposition::given(p.clone(), 1)]);
    let second_conflict = HashSet::from([Proposition::given(p.clone(), 1), Proposition::given(q.clone(), 1)]);

    let kernels = kernel::all_kernels(
        Vec::new(),
        [first_conflict, second_conflict],
    );

    // {P=0} alone already resolves the second conflict too (it is a subset of its
    // inversion), so no kernel in the frontier is a proper superset of another.
    for a in &kernels {
        for b in &kernels {
            if a != b && a.is_subset(b) {
                assert_eq!(a.len(), b.len(), "kernel {a:?} is a proper subset of {b:?}");
            }
        }
    }
    assert_eq!(kernels.len(), 1);
    assert!(kernels.iter().any(|k| *k == HashSet::from([Proposition::given(p, 0)])));
    let _ = q;
}

#[test]
fn complete_and_check_model_agree_on_satisfaction() {
    let a = Component::new("A", vec![1], vec![1.0], false).unwrap();
    let v = Component::new("V", vec![1], vec![1.0], false).unwrap();
    let mut id = 0usize;
    let (p, clauses) = relay("P", &a, &v, &mut id);
    let model = Model::new(clauses);

    let mut partial = HashSet::new();
    partial.insert(Proposition::given(a, 1));
    partial.insert(p.max_proposition());
    let completed = complete(&model, &partial);
    assert!(check_model(&model, &completed).unwrap().is_none());
}

/// A 2-input AND gate, gated by `and_gate`: both inputs high and the gate working
/// drives the output high; the gate working and the output low forces some input low.
fn pcu_gate(
    and_gate_name: &str,
    inputs: &[Component],
    output: &Component,
    id: &mut usize,
) -> (Component, Vec<Clause>) {
    let and_gate = Component::new(and_gate_name, vec![0, 1], vec![0.03, 0.97], true).unwrap();
    let mut next_id = || {
        let c = ClauseId(*id);
        *id += 1;
        c
    };
    let mut clauses = Vec::new();
    for input in inputs {
        clauses.push(Clause::new(
            next_id(),
            format!("{and_gate_name}_{}", input.name()),
            [
                Proposition::given(and_gate.clone(), 0),
                Proposition::given(output.clone(), 0),
                Proposition::given(input.clone(), 1),
            ],
        ));
    }
    let mut implies_out = vec![
        Proposition::given(and_gate.clone(), 0),
        Proposition::given(output.clone(), 1),
    ];
    implies_out.extend(inputs.iter().map(|c| Proposition::given(c.clone(), 0)));
    clauses.push(Clause::new(next_id(), format!("{and_gate_name}_out"), implies_out));

    let mut implies_fault = vec![
        Proposition::given(and_gate.clone(), 1),
        Proposition::given(output.clone(), 0),
    ];
    implies_fault.extend(inputs.iter().map(|c| Proposition::given(c.clone(), 0)));
    clauses.push(Clause::new(next_id(), format!("{and_gate_name}_fault"), implies_fault));
    (and_gate, clauses)
}

/// Same generic input/output relation as a power relay, renamed for a camera, minus
/// the clause that would force the output low on its own fault mode — cameras here
/// only gate their input through, matching the worked example in the source system.
fn camera(name: &str, input: &Component, output: &Component, id: &mut usize) -> (Component, Vec<Clause>) {
    let camera = Component::new(name, vec![0, 1], vec![0.025, 0.975], true).unwrap();
    let mut next_id = || {
        let c = ClauseId(*id);
        *id += 1;
        c
    };
    let clauses = vec![
        Clause::new(
            next_id(),
            format!("{name}a"),
            [
                Proposition::given(camera.clone(), 0),
                Proposition::given(output.clone(), 0),
                Proposition::given(input.clone(), 1),
            ],
        ),
        Clause::new(
            next_id(),
            format!("{name}b"),
            [
                Proposition::given(camera.clone(), 0),
                Proposition::given(input.clone(), 0),
                Proposition::given(output.clone(), 1),
            ],
        ),
    ];
    (camera, clauses)
}

#[test]
fn full_system_likelihoods_are_non_increasing() {
    let mut id = 0usize;
    let a = Component::new("A", vec![1], vec![1.0], false).unwrap();
    let b = Component::new("B", vec![1], vec![1.0], false).unwrap();
    let c = Component::new("C", vec![1], vec![1.0], false).unwrap();

    let v = Component::new("V", vec![0, 1], vec![1.0, 1.0], false).unwrap();
    let w = Component::new("W", vec![0, 1], vec![1.0, 1.0], false).unwrap();
    let x = Component::new("X", vec![0, 1], vec![1.0, 1.0], false).unwrap();

    let y = Component::new("Y", vec![0, 1], vec![1.0, 1.0], false).unwrap();
    let z = Component::new("Z", vec![0, 1], vec![1.0, 1.0], false).unwrap();

    let d = Component::new("D", vec![0], vec![1.0], false).unwrap();
    let e = Component::new("E", vec![0], vec![1.0], false).unwrap();

    let (p1, mut clauses) = relay("P1", &a, &v, &mut id);
    let (p2, clauses2) = relay("P2", &b, &w, &mut id);
    let (p3, clauses3) = relay("P3", &c, &x, &mut id);
    let (pcu1, clauses4) = pcu_gate("PCU1", &[v.clone(), w.clone()], &y, &mut id);
    let (pcu2, clauses5) = pcu_gate("PCU2", &[w.clone(), x.clone()], &z, &mut id);
    let (c1, clauses6) = camera("C1", &y, &d, &mut id);
    let (c2, clauses7) = camera("C2", &z, &e, &mut id);
    clauses.extend(clauses2);
    clauses.extend(clauses3);
    clauses.extend(clauses4);
    clauses.extend(clauses5);
    clauses.extend(clauses6);
    clauses.extend(clauses7);
    let model = Model::new(clauses);

    let known_inputs = HashSet::from([a, b, c]);
    let known_outputs = HashSet::from([d, e]);

    let outcome =
        return_consistent_configurations(&model, &known_inputs, &known_outputs, 10, &SearchLimits::default())
            .unwrap();

    assert!(!outcome.configurations.is_empty());
    assert_eq!(outcome.configurations.len(), outcome.likelihoods.len());
    for pair in outcome.likelihoods.windows(2) {
        assert!(
            pair[0] >= pair[1],
            "likelihoods must be non-increasing: {:?}",
            outcome.likelihoods
        );
    }

    let top = &outcome.configurations[0];
    let blames_a_gate = [
        Proposition::given(c1, 0),
        Proposition::given(c2, 0),
        Proposition::given(pcu1, 0),
        Proposition::given(pcu2, 0),
    ]
    .iter()
    .any(|p| top.contains(p));
    assert!(
        blames_a_gate,
        "top diagnosis should blame a gate closer to the outputs before the relays: {top:?}"
    );
    let _ = p1;
    let _ = p2;
    let _ = p3;
}
