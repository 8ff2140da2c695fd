//! Variable assignments exchanged with the solver.
//!
//! A [`Solution`] is keyed by reference id and only accepts variable handles,
//! so auxiliary nodes can never be read or written through it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::{BoolVar, IntVar, IntervalVar, Variable};

/// Value of one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    /// Integer value; booleans are stored as 0 or 1.
    Int(i64),
    Interval { start: i64, end: i64 },
}

/// Sparse assignment of values to variables plus an optional objective.
///
/// A key mapped to `None` marks an absent optional variable; a missing key
/// means the variable is not assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objective: Option<f64>,
    #[serde(default)]
    values: BTreeMap<u32, Option<VarValue>>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, var: &IntVar, value: i64) {
        self.values
            .insert(var.ref_id().index(), Some(VarValue::Int(value)));
    }

    pub fn set_bool(&mut self, var: &BoolVar, value: bool) {
        self.values
            .insert(var.ref_id().index(), Some(VarValue::Int(i64::from(value))));
    }

    pub fn set_interval(&mut self, var: &IntervalVar, start: i64, end: i64) {
        self.values
            .insert(var.ref_id().index(), Some(VarValue::Interval { start, end }));
    }

    /// Marks an optional variable as absent.
    pub fn set_absent(&mut self, var: &impl Variable) {
        self.values.insert(var.ref_id().index(), None);
    }

    /// Integer value of `var`, or `None` if absent or unassigned.
    pub fn value(&self, var: &IntVar) -> Option<i64> {
        match self.get(var)? {
            VarValue::Int(value) => Some(value),
            VarValue::Interval { .. } => None,
        }
    }

    pub fn bool_value(&self, var: &BoolVar) -> Option<bool> {
        match self.get(var)? {
            VarValue::Int(value) => Some(value != 0),
            VarValue::Interval { .. } => None,
        }
    }

    pub fn start(&self, var: &IntervalVar) -> Option<i64> {
        match self.get(var)? {
            VarValue::Interval { start, .. } => Some(start),
            VarValue::Int(_) => None,
        }
    }

    pub fn end(&self, var: &IntervalVar) -> Option<i64> {
        match self.get(var)? {
            VarValue::Interval { end, .. } => Some(end),
            VarValue::Int(_) => None,
        }
    }

    /// Returns true if `var` is assigned and absent.
    pub fn is_absent(&self, var: &impl Variable) -> bool {
        matches!(self.values.get(&var.ref_id().index()), Some(None))
    }

    pub fn set_objective(&mut self, objective: Option<f64>) {
        self.objective = objective;
    }

    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    /// Number of assigned variables, absent ones included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn get(&self, var: &impl Variable) -> Option<VarValue> {
        self.values.get(&var.ref_id().index()).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Model;

    #[test]
    fn test_typed_accessors() {
        let mut model = Model::new();
        let x = model.int_var(0, 10).unwrap();
        let b = model.bool_var().unwrap();
        let task = model.interval_var(5).unwrap();

        let mut solution = Solution::new();
        solution.set_value(&x, 7);
        solution.set_bool(&b, true);
        solution.set_interval(&task, 3, 8);
        solution.set_objective(Some(7.0));

        assert_eq!(solution.value(&x), Some(7));
        assert_eq!(solution.bool_value(&b), Some(true));
        assert_eq!(solution.start(&task), Some(3));
        assert_eq!(solution.end(&task), Some(8));
        assert_eq!(solution.objective(), Some(7.0));
        assert_eq!(solution.len(), 3);
    }

    #[test]
    fn test_absent_differs_from_unassigned() {
        let mut model = Model::new();
        let task = model.interval_var(5).unwrap();
        let other = model.interval_var(2).unwrap();

        let mut solution = Solution::new();
        solution.set_absent(&task);

        assert!(solution.is_absent(&task));
        assert_eq!(solution.start(&task), None);
        assert!(!solution.is_absent(&other));
    }

    #[test]
    fn test_json_shape() {
        let mut model = Model::new();
        let x = model.int_var(0, 10).unwrap();
        let task = model.interval_var(5).unwrap();

        let mut solution = Solution::new();
        solution.set_value(&x, 4);
        solution.set_interval(&task, 0, 5);

        let json = serde_json::to_value(&solution).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"values": {"0": 4, "1": {"start": 0, "end": 5}}})
        );

        let parsed: Solution =
            serde_json::from_str(r#"{"objective": 2.5, "values": {"0": 1, "1": null}}"#).unwrap();
        assert_eq!(parsed.value(&x), Some(1));
        assert!(parsed.is_absent(&task));
        assert_eq!(parsed.objective(), Some(2.5));
    }
}
