//! A small job-shop scheduling model.
//!
//! Each job is a chain of tasks; task `k` of every job runs on machine `k`.
//! The makespan (latest job end) is minimized.

use cpwire_core::{IntExpr, IntervalVar, Model, NodeFields, Result};

/// A job-shop model with handles to its tasks and objective.
#[derive(Debug)]
pub struct JobShop {
    pub model: Model,
    /// `tasks[job][step]`
    pub tasks: Vec<Vec<IntervalVar>>,
    pub makespan: IntExpr,
}

/// Builds a job shop from per-job task durations.
pub fn job_shop(durations: &[Vec<i64>]) -> Result<JobShop> {
    let mut model = Model::with_name("job-shop");
    let mut tasks = Vec::with_capacity(durations.len());
    let mut ends = Vec::with_capacity(durations.len());

    for (job, steps) in durations.iter().enumerate() {
        let mut chain: Vec<IntervalVar> = Vec::with_capacity(steps.len());
        for (step, duration) in steps.iter().enumerate() {
            let task = model.interval_var_with(
                NodeFields::named(format!("J{job}S{step}")).with_length(*duration, *duration),
            )?;
            if let Some(previous) = chain.last() {
                model.end_before_start(*previous, task)?;
            }
            chain.push(task);
        }
        if let Some(last) = chain.last() {
            ends.push(model.end_of(*last)?);
        }
        tasks.push(chain);
    }

    let machines = durations.iter().map(Vec::len).max().unwrap_or(0);
    for machine in 0..machines {
        let on_machine: Vec<IntervalVar> = tasks
            .iter()
            .filter_map(|chain| chain.get(machine).copied())
            .collect();
        if on_machine.len() > 1 {
            let array = model.array(on_machine);
            model.no_overlap(array)?;
        }
    }

    let makespan = model.max(ends)?;
    model.minimize(makespan)?;
    Ok(JobShop {
        model,
        tasks,
        makespan,
    })
}
