//! Expression graph: node kinds, typed handles and the owning model.

mod builders;
mod handle;
mod kind;
mod model;


pub use handle::{
    ArrayHandle, BoolExpr, BoolVar, Constraint, CumulExpr, Enforceable, Handle, IntExpr, IntVar,
    IntervalVar, ModelId, NodeId, NodeRef, Operand, RefId, SequenceVar, TransitionMatrix,
    Variable, VariableHandle,
};
pub use kind::{ArgShape, NodeKind, Signature, ValueType};
pub use model::{
    Argument, Direction, Model, NodeFields, Presence, PrimaryObjective, Scalar, VariableInfo,
};
