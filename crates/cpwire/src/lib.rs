//! cpwire - constraint models in Rust, solved by an external solver
//!
//! Build a [`Model`], then call [`solve`]. The solver location and solve
//! parameters come from `cpwire.toml` in the working directory, falling back
//! to the defaults.
//!
//! # Example
//!
//! ```no_run
//! use cpwire::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut model = Model::new();
//! let x = model.int_var(0, 10)?;
//! let y = model.int_var(0, 10)?;
//! let sum = model.plus(x, y)?;
//! let limit = model.le(sum, 12)?;
//! model.enforce(limit)?;
//! model.maximize(sum)?;
//!
//! let result = cpwire::solve(&model).await?;
//! assert_eq!(result.best_objective, Some(12.0));
//! # Ok(())
//! # }
//! ```
//!
//! For callbacks, a custom transport or per-session configuration, use
//! [`Solver`] directly.

// Modeling
pub use cpwire_core::{
    ArrayHandle, BoolExpr, BoolVar, Command, Constraint, CumulExpr, IntExpr, IntVar, IntervalVar,
    Model, ModelError, SequenceVar, Solution, VarValue,
};

// Configuration
pub use cpwire_config::{BatchMode, ClientConfig, ColorMode, ConfigError, Parameters, Preset};

// Sessions and results
pub use cpwire_session::{
    LowerBoundEvent, ObjectiveEntry, Phase, PropagationResult, SessionError, SolutionEvent,
    SolveResult, Solver, SolverHandle, Summary,
};

#[cfg(feature = "console")]
pub use cpwire_console as console;

mod solver;
pub use solver::{load_config, propagate, solve, solve_from, to_text, CONFIG_FILE};

pub mod prelude {
    pub use super::{BoolExpr, BoolVar, IntExpr, IntVar, IntervalVar, Model, Solution};
    pub use super::{ClientConfig, Parameters};
    pub use super::{SessionError, SolveResult, Solver};
}
