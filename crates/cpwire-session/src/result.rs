//! Final outcome of a solve.

use cpwire_core::Solution;
use serde::{Deserialize, Serialize};

use crate::protocol::{LowerBoundEvent, SolutionEvent, Summary};

/// One improvement of the objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveEntry {
    pub solve_time: f64,
    pub objective: Option<f64>,
    pub valid: Option<bool>,
}

/// Everything a finished solve produced.
///
/// Finding no solution is not an error: `best_solution` is then `None` and
/// `summary.proof` tells whether infeasibility was proven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    /// Statistics from the solver's summary, without the batched histories.
    pub summary: Summary,
    pub best_solution: Option<Solution>,
    pub best_solution_time: Option<f64>,
    pub best_solution_valid: Option<bool>,
    pub best_objective: Option<f64>,
    pub best_lower_bound: Option<f64>,
    pub objective_history: Vec<ObjectiveEntry>,
    pub lower_bound_history: Vec<LowerBoundEvent>,
}

impl SolveResult {
    pub fn nb_solutions(&self) -> u64 {
        self.summary.nb_solutions
    }

    pub fn proof(&self) -> bool {
        self.summary.proof
    }

    pub fn duration(&self) -> f64 {
        self.summary.duration
    }
}

/// Builds a [`SolveResult`] from solver events.
///
/// Incremental `solution`/`lowerBound` messages and the history arrays of a
/// batched summary go through the same methods, so both modes produce the
/// same result for the same search.
#[derive(Debug, Default)]
pub(crate) struct ResultAccumulator {
    best: Option<SolutionEvent>,
    objective_history: Vec<ObjectiveEntry>,
    lower_bound_history: Vec<LowerBoundEvent>,
}

impl ResultAccumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_solution(&mut self, event: SolutionEvent) {
        self.objective_history.push(ObjectiveEntry {
            solve_time: event.solve_time,
            objective: event.objective,
            valid: event.valid,
        });
        self.best = Some(event);
    }

    pub(crate) fn on_lower_bound(&mut self, event: LowerBoundEvent) {
        self.lower_bound_history.push(event);
    }

    pub(crate) fn solution_count(&self) -> usize {
        self.objective_history.len()
    }

    pub(crate) fn finish(mut self, mut summary: Summary) -> SolveResult {
        for event in summary.objective_history.take().unwrap_or_default() {
            self.on_solution(event);
        }
        for event in summary.lower_bound_history.take().unwrap_or_default() {
            self.on_lower_bound(event);
        }

        let best_lower_bound = self
            .lower_bound_history
            .last()
            .map(|bound| bound.value)
            .or(summary.lower_bound);
        let (best_solution, best_solution_time, best_solution_valid, best_objective) =
            match self.best {
                Some(best) => {
                    let mut solution = best.solution;
                    if solution.objective().is_none() {
                        solution.set_objective(best.objective);
                    }
                    let objective = best.objective.or(summary.objective);
                    (Some(solution), Some(best.solve_time), best.valid, objective)
                }
                None => (None, None, None, summary.objective),
            };

        SolveResult {
            summary,
            best_solution,
            best_solution_time,
            best_solution_valid,
            best_objective,
            best_lower_bound,
            objective_history: self.objective_history,
            lower_bound_history: self.lower_bound_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn solution_event(time: f64, objective: f64, value: i64) -> SolutionEvent {
        serde_json::from_value(json!({
            "solveTime": time,
            "objective": objective,
            "solution": {"values": {"0": value}},
            "valid": true
        }))
        .unwrap()
    }

    fn bound(time: f64, value: f64) -> LowerBoundEvent {
        LowerBoundEvent {
            solve_time: time,
            value,
        }
    }

    fn summary() -> Summary {
        Summary {
            nb_solutions: 2,
            proof: true,
            duration: 1.5,
            objective: Some(7.0),
            lower_bound: Some(7.0),
            ..Summary::default()
        }
    }

    #[test]
    fn test_incremental_events() {
        let mut acc = ResultAccumulator::new();
        acc.on_solution(solution_event(0.1, 9.0, 3));
        acc.on_lower_bound(bound(0.2, 5.0));
        acc.on_solution(solution_event(0.4, 7.0, 2));
        assert_eq!(acc.solution_count(), 2);

        let result = acc.finish(summary());
        assert_eq!(result.nb_solutions(), 2);
        assert!(result.proof());
        assert_eq!(result.best_objective, Some(7.0));
        assert_eq!(result.best_solution_time, Some(0.4));
        assert_eq!(result.best_solution_valid, Some(true));
        assert_eq!(result.best_lower_bound, Some(5.0));
        assert_eq!(result.objective_history.len(), 2);
        let best = result.best_solution.unwrap();
        assert_eq!(best.objective(), Some(7.0));
        assert_eq!(best.len(), 1);
    }

    #[test]
    fn test_batched_summary_matches_incremental() {
        let mut incremental = ResultAccumulator::new();
        incremental.on_solution(solution_event(0.1, 9.0, 3));
        incremental.on_lower_bound(bound(0.2, 5.0));
        incremental.on_solution(solution_event(0.4, 7.0, 2));
        let incremental = incremental.finish(summary());

        let mut batched_summary = summary();
        batched_summary.objective_history =
            Some(vec![solution_event(0.1, 9.0, 3), solution_event(0.4, 7.0, 2)]);
        batched_summary.lower_bound_history = Some(vec![bound(0.2, 5.0)]);
        let batched = ResultAccumulator::new().finish(batched_summary);

        assert_eq!(batched, incremental);
        assert!(batched.summary.objective_history.is_none());
    }

    #[test]
    fn test_no_solution_is_not_an_error() {
        let summary = Summary {
            proof: true,
            ..Summary::default()
        };
        let result = ResultAccumulator::new().finish(summary);
        assert!(result.best_solution.is_none());
        assert_eq!(result.best_objective, None);
        assert!(result.proof());
        assert!(result.objective_history.is_empty());
    }
}
