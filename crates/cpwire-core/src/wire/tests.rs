use serde_json::{json, Value};

use super::*;
use crate::graph::{NodeFields, Presence, Variable, VariableHandle};
use crate::limits::INTERVAL_MAX;

fn job_shop() -> Model {
    let mut model = Model::with_name("two-jobs");
    let mut ends = Vec::new();
    let mut machine = Vec::new();
    for (job, durations) in [[3, 2], [2, 4]].iter().enumerate() {
        let mut previous = None;
        for (step, duration) in durations.iter().enumerate() {
            let task = model
                .interval_var_with(
                    NodeFields::named(format!("J{job}S{step}"))
                        .with_length(*duration, *duration)
                        .with_end(0, INTERVAL_MAX),
                )
                .unwrap();
            if let Some(before) = previous {
                model.end_before_start(before, task).unwrap();
            }
            if step == 0 {
                machine.push(task);
            }
            previous = Some(task);
        }
        if let Some(last) = previous {
            ends.push(model.end_of(last).unwrap());
        }
    }
    let machine = model.array(machine);
    model.no_overlap(machine).unwrap();
    let makespan = model.max(ends).unwrap();
    model.minimize(makespan).unwrap();
    model
}

fn parameters() -> Value {
    json!({"timeLimit": 10, "nbWorkers": 2})
}

#[test]
fn test_document_layout() {
    let model = job_shop();
    let text = model
        .serialize(Command::Solve, &parameters(), None)
        .unwrap();
    let doc: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(doc["msg"], "solve");
    assert_eq!(doc["name"], "two-jobs");
    assert_eq!(doc["parameters"], parameters());
    assert_eq!(doc["refs"].as_array().unwrap().len(), 4);
    assert_eq!(doc["objective"]["func"], "minimize");
    assert!(doc.get("warmStart").is_none());
}

#[test]
fn test_commands_use_wire_names() {
    let model = Model::new();
    for (command, tag) in [
        (Command::Solve, "solve"),
        (Command::Propagate, "propagate"),
        (Command::ToText, "toText"),
    ] {
        let text = model.serialize(command, &json!({}), None).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["msg"], tag);
        assert_eq!(command.as_str(), tag);
    }
}

#[test]
fn test_warm_start_is_embedded() {
    let mut model = Model::new();
    let x = model.int_var(0, 10).unwrap();
    let mut warm = Solution::new();
    warm.set_value(&x, 5);
    warm.set_objective(Some(5.0));

    let text = model
        .serialize(Command::Solve, &json!({}), Some(&warm))
        .unwrap();
    let doc: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["warmStart"], json!({"objective": 5.0, "values": {"0": 5}}));
}

#[test]
fn test_round_trip_preserves_model() {
    let original = job_shop();
    let text = original
        .serialize(Command::Solve, &parameters(), None)
        .unwrap();
    let restored = Model::deserialize(&text).unwrap();

    assert_eq!(restored.name(), original.name());
    assert_eq!(restored.variables().count(), original.variables().count());
    assert_eq!(restored.constraint_count(), original.constraint_count());
    assert_eq!(restored.ref_count(), original.ref_count());
    for (a, b) in restored.variables().zip(original.variables()) {
        assert_eq!(a, b);
    }

    let (direction, _) = restored.objective().unwrap();
    assert_eq!(direction, Direction::Minimize);
    assert_eq!(restored.primary_objective_kind(), Some(NodeKind::IntMax));

    let again = restored
        .serialize(Command::Solve, &parameters(), None)
        .unwrap();
    assert_eq!(again, text);
}

#[test]
fn test_round_trip_keeps_forward_references() {
    let mut model = Model::new();
    let x = model.int_var(0, 10).unwrap();
    let inner = model.square(x).unwrap();
    let outer = model.plus(inner, 1).unwrap();
    // outer is promoted before inner, so the table entry for outer
    // points at a later entry.
    let c = model.le(outer, 50).unwrap();
    model.enforce(c).unwrap();
    let c = model.ge(outer, 2).unwrap();
    model.enforce(c).unwrap();
    let c = model.ne(inner, 4).unwrap();
    model.enforce(c).unwrap();

    let text = model.serialize(Command::Solve, &json!({}), None).unwrap();
    let doc: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["refs"][1]["func"], "intPlus");
    assert_eq!(doc["refs"][1]["args"][0], json!({"ref": 2}));

    let restored = Model::deserialize(&text).unwrap();
    assert_eq!(
        restored
            .serialize(Command::Solve, &json!({}), None)
            .unwrap(),
        text
    );
}

#[test]
fn test_round_trip_restores_constant_objective_and_handles() {
    let mut model = Model::new();
    let x = model
        .int_var_with(NodeFields::named("x").with_bounds(1, 9))
        .unwrap();
    let task = model
        .interval_var_with(NodeFields::default().with_presence(Presence::Optional))
        .unwrap();
    model.maximize(2.5).unwrap();

    let text = model.serialize(Command::Solve, &json!({}), None).unwrap();
    let restored = Model::deserialize(&text).unwrap();

    assert_eq!(
        restored.primary_objective(),
        Some(PrimaryObjective::Constant(2.5))
    );
    match restored.variable(x.ref_id()) {
        Some(VariableHandle::Int(var)) => {
            let fields = restored.fields(&var).unwrap();
            assert_eq!(fields.name.as_deref(), Some("x"));
            assert_eq!((fields.min, fields.max), (Some(1), Some(9)));
        }
        other => panic!("unexpected handle: {other:?}"),
    }
    match restored.variable(task.ref_id()) {
        Some(VariableHandle::Interval(var)) => {
            assert_eq!(restored.fields(&var).unwrap().presence, Presence::Optional);
        }
        other => panic!("unexpected handle: {other:?}"),
    }
}

#[test]
fn test_restored_constraints_stay_registered() {
    let mut model = Model::new();
    let a = model.interval_var(1).unwrap();
    let b = model.interval_var(1).unwrap();
    model.end_before_start(a, b).unwrap();
    let text = model.serialize(Command::Solve, &json!({}), None).unwrap();

    let mut restored = Model::deserialize(&text).unwrap();
    let count = restored.statement_count();
    let c = match (
        restored.variable(a.ref_id()),
        restored.variable(b.ref_id()),
    ) {
        (Some(VariableHandle::Interval(a)), Some(VariableHandle::Interval(b))) => {
            restored.end_before_end(a, b).unwrap()
        }
        other => panic!("unexpected handles: {other:?}"),
    };
    restored.enforce(c).unwrap();
    assert_eq!(restored.statement_count(), count + 1);
}

#[test]
fn test_missing_keys_are_document_errors() {
    assert!(matches!(
        Model::deserialize(r#"{"model": []}"#),
        Err(ModelError::Document(_))
    ));
    assert!(matches!(
        Model::deserialize(r#"{"refs": []}"#),
        Err(ModelError::Document(_))
    ));
    assert!(matches!(
        Model::deserialize("[1, 2]"),
        Err(ModelError::Json(_))
    ));
}

#[test]
fn test_malformed_nodes_are_document_errors() {
    let unknown = r#"{"refs": [{"func": "intFrobnicate", "args": []}], "model": [{"ref": 0}]}"#;
    assert!(matches!(
        Model::deserialize(unknown),
        Err(ModelError::Document(_))
    ));

    let dangling = r#"{"refs": [], "model": [{"ref": 3}]}"#;
    assert!(matches!(
        Model::deserialize(dangling),
        Err(ModelError::Document(_))
    ));

    let arity = r#"{"refs": [], "model": [{"func": "intNeg", "args": [1, 2]}]}"#;
    assert!(matches!(
        Model::deserialize(arity),
        Err(ModelError::Document(_))
    ));
}

#[test]
fn test_wire_arg_shapes() {
    let parsed: Vec<WireArg> =
        serde_json::from_str(r#"[3, 1.5, true, {"ref": 2}, {"func": "intNeg", "args": [4]}, [1, 2]]"#)
            .unwrap();
    assert_eq!(parsed[0], WireArg::Int(3));
    assert_eq!(parsed[1], WireArg::Float(1.5));
    assert_eq!(parsed[2], WireArg::Bool(true));
    assert_eq!(parsed[3], WireArg::Ref { id: 2 });
    assert!(matches!(&parsed[4], WireArg::Inline(node) if node.func == "intNeg"));
    assert_eq!(parsed[5], WireArg::Array(vec![WireArg::Int(1), WireArg::Int(2)]));
}
