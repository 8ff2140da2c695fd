//! Solver protocol lines, as a scripted solver would write them.

use serde_json::{json, Value};

fn line(value: Value) -> String {
    value.to_string()
}

pub fn handshake() -> String {
    line(json!({"msg": "handshake", "solver": "scripted", "version": "1.0"}))
}

pub fn log(text: &str) -> String {
    line(json!({"msg": "log", "data": text}))
}

pub fn warning(text: &str) -> String {
    line(json!({"msg": "warning", "data": text}))
}

pub fn error(text: &str) -> String {
    line(json!({"msg": "error", "data": text}))
}

/// Solution event with integer values keyed by reference id.
pub fn solution_value(solve_time: f64, objective: f64, values: &[(u32, i64)]) -> Value {
    let values: serde_json::Map<String, Value> = values
        .iter()
        .map(|(id, value)| (id.to_string(), json!(value)))
        .collect();
    json!({
        "solveTime": solve_time,
        "objective": objective,
        "solution": {"values": values},
        "valid": true
    })
}

pub fn solution(solve_time: f64, objective: f64, values: &[(u32, i64)]) -> String {
    let mut value = solution_value(solve_time, objective, values);
    value["msg"] = json!("solution");
    line(value)
}

pub fn lower_bound_value(solve_time: f64, value: f64) -> Value {
    json!({"solveTime": solve_time, "value": value})
}

pub fn lower_bound(solve_time: f64, value: f64) -> String {
    let mut value = lower_bound_value(solve_time, value);
    value["msg"] = json!("lowerBound");
    line(value)
}

pub fn summary(nb_solutions: u64, objective: Option<f64>, proof: bool) -> String {
    line(summary_value(nb_solutions, objective, proof))
}

pub fn summary_value(nb_solutions: u64, objective: Option<f64>, proof: bool) -> Value {
    json!({
        "msg": "summary",
        "nbSolutions": nb_solutions,
        "objective": objective,
        "proof": proof,
        "duration": 0.5,
        "nbBranches": 120,
        "nbFails": 30
    })
}

/// Summary carrying the batched histories.
pub fn batched_summary(
    nb_solutions: u64,
    objective: Option<f64>,
    proof: bool,
    solutions: Vec<Value>,
    bounds: Vec<Value>,
) -> String {
    let mut value = summary_value(nb_solutions, objective, proof);
    value["objectiveHistory"] = Value::Array(solutions);
    value["lowerBoundHistory"] = Value::Array(bounds);
    line(value)
}

pub fn domains(domains: &[(u32, i64, i64)]) -> String {
    let domains: serde_json::Map<String, Value> = domains
        .iter()
        .map(|(id, min, max)| (id.to_string(), json!({"min": min, "max": max})))
        .collect();
    line(json!({"msg": "domains", "infeasible": false, "domains": domains}))
}

pub fn text_model(text: &str) -> String {
    line(json!({"msg": "textModel", "data": text}))
}
