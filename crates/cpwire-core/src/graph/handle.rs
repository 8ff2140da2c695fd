//! Identifiers and typed handles for graph nodes.

use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_MODEL_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a [`Model`](super::Model), stamped into every handle it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(u32);

impl ModelId {
    pub(crate) fn next() -> Self {
        ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Index of a node in the model's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the flat reference table sent to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(pub(crate) u32);

impl RefId {
    pub fn new(index: u32) -> Self {
        RefId(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Untyped reference to a node of a specific model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(crate) model: ModelId,
    pub(crate) id: NodeId,
}

impl NodeRef {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn model(&self) -> ModelId {
        self.model
    }
}

/// Anything that points at a graph node.
pub trait Handle {
    fn node_ref(&self) -> NodeRef;
}

impl Handle for NodeRef {
    fn node_ref(&self) -> NodeRef {
        *self
    }
}

/// A variable declared directly on the model.
///
/// Variables always own a slot in the reference table, so solutions can
/// address them by [`RefId`].
pub trait Variable: Handle {
    fn ref_id(&self) -> RefId;
}

macro_rules! expr_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) NodeRef);

        impl Handle for $name {
            fn node_ref(&self) -> NodeRef {
                self.0
            }
        }

        impl From<$name> for Operand {
            fn from(handle: $name) -> Self {
                Operand::Node(handle.0)
            }
        }
    };
}

macro_rules! var_handle {
    ($(#[$doc:meta])* $name:ident => $expr:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            pub(crate) node: NodeRef,
            pub(crate) ref_id: RefId,
        }

        impl Handle for $name {
            fn node_ref(&self) -> NodeRef {
                self.node
            }
        }

        impl Variable for $name {
            fn ref_id(&self) -> RefId {
                self.ref_id
            }
        }

        impl From<$name> for $expr {
            fn from(var: $name) -> Self {
                $expr(var.node)
            }
        }

        impl From<$name> for Operand {
            fn from(var: $name) -> Self {
                Operand::Node(var.node)
            }
        }
    };
}

expr_handle!(
    /// Integer-valued expression.
    IntExpr
);
expr_handle!(
    /// Boolean-valued expression.
    BoolExpr
);
expr_handle!(
    /// Cumulative function over time.
    CumulExpr
);
expr_handle!(
    /// Constraint node. Constraints register themselves on creation.
    Constraint
);

var_handle!(
    /// Integer decision variable.
    IntVar => IntExpr
);
var_handle!(
    /// Boolean decision variable.
    BoolVar => BoolExpr
);

/// Interval decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalVar {
    pub(crate) node: NodeRef,
    pub(crate) ref_id: RefId,
}

impl Handle for IntervalVar {
    fn node_ref(&self) -> NodeRef {
        self.node
    }
}

impl Variable for IntervalVar {
    fn ref_id(&self) -> RefId {
        self.ref_id
    }
}

impl From<IntervalVar> for Operand {
    fn from(var: IntervalVar) -> Self {
        Operand::Node(var.node)
    }
}

/// Ordering of a set of interval variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceVar {
    pub(crate) node: NodeRef,
    pub(crate) ref_id: RefId,
}

impl SequenceVar {
    pub fn ref_id(&self) -> RefId {
        self.ref_id
    }
}

impl Handle for SequenceVar {
    fn node_ref(&self) -> NodeRef {
        self.node
    }
}

impl From<SequenceVar> for Operand {
    fn from(var: SequenceVar) -> Self {
        Operand::Node(var.node)
    }
}

impl From<BoolExpr> for IntExpr {
    fn from(expr: BoolExpr) -> Self {
        IntExpr(expr.0)
    }
}

/// Handle returned by a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableHandle {
    Bool(BoolVar),
    Int(IntVar),
    Interval(IntervalVar),
}

impl VariableHandle {
    pub fn ref_id(&self) -> RefId {
        match self {
            VariableHandle::Bool(v) => v.ref_id,
            VariableHandle::Int(v) => v.ref_id,
            VariableHandle::Interval(v) => v.ref_id,
        }
    }
}

/// Host-side array registered once and shared by every call that passes the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayHandle {
    pub(crate) model: ModelId,
    pub(crate) index: u32,
}

/// Transition times between interval types, passed to `noOverlap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionMatrix(pub Vec<Vec<i64>>);

/// One argument as supplied by the host, before validation and encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Bool(bool),
    Node(NodeRef),
    /// Registered array; passing the same handle twice shares one encoded node.
    Array(ArrayHandle),
    /// Ad-hoc array; encoded into a fresh node on every use.
    Elements(Vec<Operand>),
    Matrix(Vec<Vec<i64>>),
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Int(value)
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Int(value.into())
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Float(value)
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Bool(value)
    }
}

impl From<NodeRef> for Operand {
    fn from(node: NodeRef) -> Self {
        Operand::Node(node)
    }
}

impl From<ArrayHandle> for Operand {
    fn from(handle: ArrayHandle) -> Self {
        Operand::Array(handle)
    }
}

impl From<TransitionMatrix> for Operand {
    fn from(matrix: TransitionMatrix) -> Self {
        Operand::Matrix(matrix.0)
    }
}

impl<T: Into<Operand>> From<Vec<T>> for Operand {
    fn from(items: Vec<T>) -> Self {
        Operand::Elements(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Operand> + Clone> From<&[T]> for Operand {
    fn from(items: &[T]) -> Self {
        Operand::Elements(items.iter().cloned().map(Into::into).collect())
    }
}

/// Something that can be enforced as a root statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Enforceable {
    Bool(BoolExpr),
    Constraint(Constraint),
    Literal(bool),
}

impl From<BoolExpr> for Enforceable {
    fn from(expr: BoolExpr) -> Self {
        Enforceable::Bool(expr)
    }
}

impl From<BoolVar> for Enforceable {
    fn from(var: BoolVar) -> Self {
        Enforceable::Bool(var.into())
    }
}

impl From<Constraint> for Enforceable {
    fn from(constraint: Constraint) -> Self {
        Enforceable::Constraint(constraint)
    }
}

impl From<bool> for Enforceable {
    fn from(value: bool) -> Self {
        Enforceable::Literal(value)
    }
}
