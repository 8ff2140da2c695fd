//! cpwire Core - Expression graph and wire encoding
//!
//! This crate provides the host-side half of the solver protocol:
//! - Graph nodes and the closed table of node kinds the solver understands
//! - The [`Model`] that owns the node arena, root statements and objective
//! - Wire document serialization (and the inverse, for self-produced documents)
//! - [`Solution`] values used for warm starts and solver results
//!
//! # Example
//!
//! ```
//! use cpwire_core::{Command, Model};
//! use serde_json::json;
//!
//! let mut model = Model::new();
//! let x = model.int_var(0, 10).unwrap();
//! let y = model.int_var(0, 10).unwrap();
//! let sum = model.plus(x, y).unwrap();
//! let limit = model.le(sum, 12).unwrap();
//! model.enforce(limit).unwrap();
//! model.maximize(sum).unwrap();
//!
//! let document = model.serialize(Command::Solve, &json!({}), None).unwrap();
//! assert!(document.contains("\"msg\":\"solve\""));
//! ```

pub mod error;
pub mod graph;
pub mod limits;
pub mod solution;
pub mod wire;

pub use error::{ModelError, Result, ValidationError};
pub use graph::{
    ArgShape, ArrayHandle, BoolExpr, BoolVar, Constraint, CumulExpr, Direction, Enforceable,
    Handle, IntExpr, IntVar, IntervalVar, Model, ModelId, NodeFields, NodeId, NodeKind, NodeRef,
    Operand, Presence, PrimaryObjective, RefId, SequenceVar, Signature, TransitionMatrix,
    ValueType, Variable, VariableHandle, VariableInfo,
};
pub use solution::{Solution, VarValue};
pub use wire::{Command, WireArg, WireNode};
