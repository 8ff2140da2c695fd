//! Messages exchanged with the solver, one JSON object per line.
//!
//! Every message carries a `msg` discriminator. The command document itself
//! is produced by [`cpwire_core::Model::serialize`]; everything else the
//! client sends or receives is defined here.

use std::collections::BTreeMap;

use cpwire_core::Solution;
use serde::{de, Deserialize, Serialize};

/// Client identity sent in the opening handshake.
pub const CLIENT_NAME: &str = "cpwire";

// === Outbound ===

#[derive(Debug, Serialize)]
#[serde(tag = "msg", rename_all = "camelCase")]
pub enum ClientMessage<'a> {
    Handshake {
        client: &'static str,
        version: &'static str,
        colors: bool,
    },
    Stop {
        reason: &'a str,
    },
    Solution {
        data: &'a Solution,
    },
}

impl<'a> ClientMessage<'a> {
    pub fn handshake(colors: bool) -> Self {
        ClientMessage::Handshake {
            client: CLIENT_NAME,
            version: env!("CARGO_PKG_VERSION"),
            colors,
        }
    }

    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// === Inbound ===

/// A message received from the solver.
///
/// Parsed tag first, then payload: serde's buffered tagged content cannot
/// decode the integer keys of a solution's `values` map.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverMessage {
    Handshake(SolverIdentity),
    Log(String),
    Warning(String),
    Error(String),
    Solution(SolutionEvent),
    LowerBound(LowerBoundEvent),
    Domains(PropagationResult),
    TextModel(String),
    Summary(Summary),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverIdentity {
    pub solver: Option<String>,
    pub version: Option<String>,
}

#[derive(Deserialize)]
struct TextPayload {
    data: String,
}

impl SolverMessage {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(line)?;
        let tag = match value.get("msg").and_then(serde_json::Value::as_str) {
            Some(tag) => tag.to_owned(),
            None => return Err(de::Error::missing_field("msg")),
        };
        let text = |value| serde_json::from_value::<TextPayload>(value).map(|p| p.data);

        Ok(match tag.as_str() {
            "handshake" => SolverMessage::Handshake(serde_json::from_value(value)?),
            "log" => SolverMessage::Log(text(value)?),
            "warning" => SolverMessage::Warning(text(value)?),
            "error" => SolverMessage::Error(text(value)?),
            "solution" => SolverMessage::Solution(serde_json::from_value(value)?),
            "lowerBound" | "objectiveBound" => {
                SolverMessage::LowerBound(serde_json::from_value(value)?)
            }
            "domains" => SolverMessage::Domains(serde_json::from_value(value)?),
            "textModel" => SolverMessage::TextModel(text(value)?),
            "summary" => SolverMessage::Summary(serde_json::from_value(value)?),
            other => return Err(de::Error::unknown_variant(other, MESSAGE_TAGS)),
        })
    }

    /// Wire tag, for diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            SolverMessage::Handshake(_) => "handshake",
            SolverMessage::Log(_) => "log",
            SolverMessage::Warning(_) => "warning",
            SolverMessage::Error(_) => "error",
            SolverMessage::Solution(_) => "solution",
            SolverMessage::LowerBound(_) => "lowerBound",
            SolverMessage::Domains(_) => "domains",
            SolverMessage::TextModel(_) => "textModel",
            SolverMessage::Summary(_) => "summary",
        }
    }
}

const MESSAGE_TAGS: &[&str] = &[
    "handshake",
    "log",
    "warning",
    "error",
    "solution",
    "lowerBound",
    "objectiveBound",
    "domains",
    "textModel",
    "summary",
];

/// An improving solution found during search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionEvent {
    /// Seconds since the solve started.
    pub solve_time: f64,
    #[serde(default)]
    pub objective: Option<f64>,
    pub solution: Solution,
    /// Set when the solver was asked to verify solutions.
    #[serde(default)]
    pub valid: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowerBoundEvent {
    pub solve_time: f64,
    pub value: f64,
}

/// Domain of one variable after propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarDomain {
    Interval(IntervalDomain),
    Int { min: i64, max: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalDomain {
    pub start_min: i64,
    pub start_max: i64,
    pub end_min: i64,
    pub end_max: i64,
    pub length_min: i64,
    pub length_max: i64,
    /// True while the interval may still be absent.
    #[serde(default)]
    pub optional: bool,
}

/// Terminal message of a `propagate` command.
///
/// A `None` domain marks a variable propagation proved absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationResult {
    #[serde(default)]
    pub infeasible: bool,
    #[serde(default)]
    pub domains: BTreeMap<u32, Option<VarDomain>>,
}

/// Terminal message of a `solve` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Summary {
    pub nb_solutions: u64,
    /// The best solution is proven optimal, or infeasibility is proven.
    pub proof: bool,
    pub duration: f64,
    pub nb_branches: u64,
    pub nb_fails: u64,
    #[serde(rename = "nbLNSSteps")]
    pub nb_lns_steps: u64,
    pub nb_restarts: u64,
    pub memory_used: u64,
    pub objective: Option<f64>,
    pub lower_bound: Option<f64>,
    pub solver: Option<String>,
    pub nb_workers: Option<u32>,
    pub nb_int_vars: u64,
    pub nb_interval_vars: u64,
    pub nb_constraints: u64,
    /// Present only when results were batched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective_history: Option<Vec<SolutionEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound_history: Option<Vec<LowerBoundEvent>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outbound_shapes() {
        let line = ClientMessage::handshake(false).to_line().unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["msg"], "handshake");
        assert_eq!(value["client"], CLIENT_NAME);
        assert_eq!(value["colors"], false);

        let line = ClientMessage::Stop { reason: "user" }.to_line().unwrap();
        assert_eq!(line, r#"{"msg":"stop","reason":"user"}"#);

        let solution = Solution::new();
        let line = ClientMessage::Solution { data: &solution }
            .to_line()
            .unwrap();
        assert_eq!(line, r#"{"msg":"solution","data":{"values":{}}}"#);
    }

    #[test]
    fn test_inbound_tags() {
        let lines = [
            (json!({"msg": "handshake", "solver": "cp 1.0"}), "handshake"),
            (json!({"msg": "log", "data": "x"}), "log"),
            (json!({"msg": "warning", "data": "x"}), "warning"),
            (json!({"msg": "error", "data": "x"}), "error"),
            (
                json!({"msg": "solution", "solveTime": 0.5, "objective": 3, "solution": {"values": {"0": 1}}}),
                "solution",
            ),
            (json!({"msg": "lowerBound", "solveTime": 1.0, "value": 2}), "lowerBound"),
            (json!({"msg": "objectiveBound", "solveTime": 1.0, "value": 2}), "lowerBound"),
            (json!({"msg": "domains", "domains": {"0": {"min": 1, "max": 3}}}), "domains"),
            (json!({"msg": "textModel", "data": "x = intVar()"}), "textModel"),
            (json!({"msg": "summary", "nbSolutions": 2}), "summary"),
        ];
        for (value, tag) in lines {
            let message = SolverMessage::parse(&value.to_string()).unwrap();
            assert_eq!(message.tag(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        assert!(SolverMessage::parse(r#"{"msg":"telemetry"}"#).is_err());
        assert!(SolverMessage::parse(r#"{"data":"no tag"}"#).is_err());
        assert!(SolverMessage::parse("not json").is_err());
    }

    #[test]
    fn test_domains() {
        let line = json!({
            "msg": "domains",
            "infeasible": false,
            "domains": {
                "0": {"min": 2, "max": 7},
                "1": {"startMin": 0, "startMax": 5, "endMin": 3, "endMax": 8,
                      "lengthMin": 3, "lengthMax": 3, "optional": true},
                "2": null
            }
        });
        let SolverMessage::Domains(result) = SolverMessage::parse(&line.to_string()).unwrap()
        else {
            panic!("expected domains");
        };
        assert_eq!(result.domains[&0], Some(VarDomain::Int { min: 2, max: 7 }));
        match result.domains[&1] {
            Some(VarDomain::Interval(interval)) => {
                assert_eq!(interval.end_max, 8);
                assert!(interval.optional);
            }
            other => panic!("expected interval domain, got {other:?}"),
        }
        assert_eq!(result.domains[&2], None);
    }

    #[test]
    fn test_summary_with_history() {
        let line = json!({
            "msg": "summary",
            "nbSolutions": 1,
            "proof": true,
            "duration": 0.25,
            "nbLNSSteps": 12,
            "objective": 11,
            "objectiveHistory": [
                {"solveTime": 0.1, "objective": 11, "solution": {"values": {"0": 4}}, "valid": true}
            ],
            "lowerBoundHistory": [{"solveTime": 0.2, "value": 11}]
        });
        let SolverMessage::Summary(summary) = SolverMessage::parse(&line.to_string()).unwrap()
        else {
            panic!("expected summary");
        };
        assert!(summary.proof);
        assert_eq!(summary.nb_lns_steps, 12);
        assert_eq!(summary.objective, Some(11.0));
        assert_eq!(summary.objective_history.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            summary.lower_bound_history,
            Some(vec![LowerBoundEvent {
                solve_time: 0.2,
                value: 11.0
            }])
        );
    }
}
