//! Worked example: three power relays feeding two 2-input PCU AND-gates, each gate
//! feeding a camera, diagnosed end to end.
//!
//! Run with `cargo run --example full_system`.

use kernelcast::diagnosis::{return_consistent_configurations, SearchLimits};
use kernelcast::model::{Clause, ClauseId, Component, Model, Proposition};
use std::collections::HashSet;

struct ClauseIds(usize);

impl ClauseIds {
    fn next(&mut self) -> ClauseId {
        let id = ClauseId(self.0);
        self.0 += 1;
        id
    }
}

/// `(not_relay OR not_out OR in) AND (not_relay OR not_in OR out) AND (relay OR not_out)`:
/// a closed relay passes its input through; an open relay forces the output low.
fn power_relay_clauses(ids: &mut ClauseIds, input: &Component, relay: &Component, output: &Component) -> Vec<Clause> {
    vec![
        Clause::new(
            ids.next(),
            format!("{}a", relay.name()),
            [
                Proposition::given(relay.clone(), 0),
                Proposition::given(output.clone(), 0),
                Proposition::given(input.clone(), 1),
            ],
        ),
        Clause::new(
            ids.next(),
            format!("{}b", relay.name()),
            [
                Proposition::given(relay.clone(), 0),
                Proposition::given(input.clone(), 0),
                Proposition::given(output.clone(), 1),
            ],
        ),
        Clause::new(
            ids.next(),
            format!("{}c", relay.name()),
            [
                Proposition::given(relay.clone(), 1),
                Proposition::given(output.clone(), 0),
            ],
        ),
    ]
}

/// A 2-input AND gate, gated by `and_gate`: both inputs high and the gate working
/// drives the output high; the gate working and the output low forces some input low.
fn pcu_gate_clauses(ids: &mut ClauseIds, inputs: &[Component], and_gate: &Component, output: &Component) -> Vec<Clause> {
    let mut clauses = Vec::new();
    for input in inputs {
        clauses.push(Clause::new(
            ids.next(),
            format!("{}_{}", and_gate.name(), input.name()),
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
    clauses.push(Clause::new(ids.next(), format!("{}_out", and_gate.name()), implies_out));

    let mut implies_fault = vec![
        Proposition::given(and_gate.clone(), 1),
        Proposition::given(output.clone(), 0),
    ];
    implies_fault.extend(inputs.iter().map(|c| Proposition::given(c.clone(), 0)));
    clauses.push(Clause::new(ids.next(), format!("{}_fault", and_gate.name()), implies_fault));
    clauses
}

/// Same generic input/output relation as a power relay, renamed for a camera.
fn camera_clauses(ids: &mut ClauseIds, input: &Component, camera: &Component, output: &Component) -> Vec<Clause> {
    vec![
        Clause::new(
            ids.next(),
            format!("{}a", camera.name()),
            [
                Proposition::given(camera.clone(), 0),
                Proposition::given(output.clone(), 0),
                Proposition::given(input.clone(), 1),
            ],
        ),
        Clause::new(
            ids.next(),
            format!("{}b", camera.name()),
            [
                Proposition::given(camera.clone(), 0),
                Proposition::given(input.clone(), 0),
                Proposition::given(output.clone(), 1),
            ],
        ),
    ]
}

fn main() {
    env_logger::init();

    let p1 = Component::new("P1", vec![0, 1], vec![0.015, 0.985], true).unwrap();
    let p2 = Component::new("P2", vec![0, 1], vec![0.015, 0.985], true).unwrap();
    let p3 = Component::new("P3", vec![0, 1], vec![0.015, 0.985], true).unwrap();

    let pcu1 = Component::new("PCU1", vec![0, 1], vec![0.03, 0.97], true).unwrap();
    let pcu2 = Component::new("PCU2", vec![0, 1], vec![0.03, 0.97], true).unwrap();

    let c1 = Component::new("C1", vec![0, 1], vec![0.025, 0.975], true).unwrap();
    let c2 = Component::new("C2", vec![0, 1], vec![0.025, 0.975], true).unwrap();

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

    let mut ids = ClauseIds(0);
    let mut clauses = Vec::new();
    clauses.extend(power_relay_clauses(&mut ids, &a, &p1, &v));
    clauses.extend(power_relay_clauses(&mut ids, &b, &p2, &w));
    clauses.extend(power_relay_clauses(&mut ids, &c, &p3, &x));
    clauses.extend(pcu_gate_clauses(&mut ids, &[v.clone(), w.clone()], &pcu1, &y));
    clauses.extend(pcu_gate_clauses(&mut ids, &[w.clone(), x.clone()], &pcu2, &z));
    clauses.extend(camera_clauses(&mut ids, &y, &c1, &d));
    clauses.extend(camera_clauses(&mut ids, &z, &c2, &e));

    let model = Model::new(clauses);
    let known_inputs: HashSet<Component> = HashSet::from([a, b, c]);
    let known_outputs: HashSet<Component> = HashSet::from([d, e]);

    let outcome = return_consistent_configurations(&model, &known_inputs, &known_outputs, 10, &SearchLimits::default())
        .expect("well-formed model");

    println!("{}", outcome.frontier_log);
    for (i, (config, likelihood)) in outcome
        .configurations
        .iter()
        .zip(outcome.likelihoods.iter())
        .enumerate()
    {
        let mut props: Vec<String> = config
            .iter()
            .map(|p| format!("{}={}", p.component.name(), p.mode))
            .collect();
        props.sort();
        println!("{}. likelihood={:.6}  {}", i + 1, likelihood, props.join(", "));
    }
}
