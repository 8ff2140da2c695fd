//! The model: owner of the node arena, reference table and root statements.
//!
//! Graph construction is a single-threaded first phase. Every consumption of
//! a node goes through [`Model::use_node`], which counts uses; the second use
//! promotes the node into the reference table. Serialization is a second phase
//! that reads the final counts, so a node consumed once is embedded inline and
//! a node consumed twice or more is referenced by id at every site, including
//! the first one.

use serde::{Deserialize, Serialize};

use super::handle::{
    ArrayHandle, BoolVar, Constraint, Enforceable, Handle, IntVar, IntervalVar, ModelId, NodeId,
    NodeRef, Operand, RefId, SequenceVar, Variable, VariableHandle,
};
use super::kind::{ArgShape, NodeKind, ValueType};
use crate::error::{ModelError, Result, ValidationError};
use crate::limits::{
    check_range, INTERVAL_MAX, INTERVAL_MIN, INT_VAR_MAX, INT_VAR_MIN, LENGTH_MAX,
};

/// Presence status of an optional variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Presence {
    #[default]
    Present,
    Optional,
    Absent,
}

impl Presence {
    pub fn is_present(&self) -> bool {
        matches!(self, Presence::Present)
    }
}

/// Mutable, kind-specific fields of a node.
///
/// Only variables use the bound fields; `name` is allowed on any node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Presence::is_present")]
    pub presence: Presence,
}

impl NodeFields {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_start(mut self, min: i64, max: i64) -> Self {
        self.start_min = Some(min);
        self.start_max = Some(max);
        self
    }

    pub fn with_end(mut self, min: i64, max: i64) -> Self {
        self.end_min = Some(min);
        self.end_max = Some(max);
        self
    }

    pub fn with_length(mut self, min: i64, max: i64) -> Self {
        self.length_min = Some(min);
        self.length_max = Some(max);
        self
    }

    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    fn has_interval_bounds(&self) -> bool {
        self.start_min.is_some()
            || self.start_max.is_some()
            || self.end_min.is_some()
            || self.end_max.is_some()
            || self.length_min.is_some()
            || self.length_max.is_some()
    }

    fn validate(&self, call: &str, kind: NodeKind) -> std::result::Result<(), ValidationError> {
        match kind {
            NodeKind::IntVar | NodeKind::BoolVar => {
                if self.has_interval_bounds() {
                    return Err(ValidationError::new(
                        call,
                        format!("{kind} does not take start, end or length bounds"),
                    ));
                }
                let (lo, hi) = if kind == NodeKind::BoolVar {
                    (0, 1)
                } else {
                    (INT_VAR_MIN, INT_VAR_MAX)
                };
                check_pair(call, "bound", self.min, self.max, lo, hi)
            }
            NodeKind::IntervalVar => {
                if self.min.is_some() || self.max.is_some() {
                    return Err(ValidationError::new(
                        call,
                        "interval variables take start, end and length bounds",
                    ));
                }
                check_pair(
                    call,
                    "start",
                    self.start_min,
                    self.start_max,
                    INTERVAL_MIN,
                    INTERVAL_MAX,
                )?;
                check_pair(call, "end", self.end_min, self.end_max, INTERVAL_MIN, INTERVAL_MAX)?;
                check_pair(call, "length", self.length_min, self.length_max, 0, LENGTH_MAX)
            }
            _ => {
                if self.min.is_some() || self.max.is_some() || self.has_interval_bounds() {
                    return Err(ValidationError::new(call, format!("{kind} has no bounds")));
                }
                if !self.presence.is_present() {
                    return Err(ValidationError::new(
                        call,
                        format!("{kind} cannot be optional"),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn check_pair(
    call: &str,
    what: &str,
    min: Option<i64>,
    max: Option<i64>,
    lo: i64,
    hi: i64,
) -> std::result::Result<(), ValidationError> {
    if let Some(min) = min {
        check_range(call, &format!("minimum {what}"), min, lo, hi)?;
    }
    if let Some(max) = max {
        check_range(call, &format!("maximum {what}"), max, lo, hi)?;
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ValidationError::new(
                call,
                format!("minimum {what} {min} exceeds maximum {max}"),
            ));
        }
    }
    Ok(())
}

/// Literal argument value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// An encoded argument stored in the arena.
///
/// `Node` does not decide between inline embedding and reference; that is
/// derived from the node's final use count when the model is serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Scalar(Scalar),
    Node(NodeId),
    Array(Vec<Argument>),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) args: Vec<Argument>,
    pub(crate) fields: NodeFields,
    pub(crate) uses: u32,
    pub(crate) ref_id: Option<RefId>,
    pub(crate) registered: bool,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, args: Vec<Argument>, fields: NodeFields) -> Self {
        Self {
            kind,
            args,
            fields,
            uses: 0,
            ref_id: None,
            registered: false,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedArray {
    items: Vec<Operand>,
    encoded: Option<NodeId>,
}

/// Objective direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    fn kind(self) -> NodeKind {
        match self {
            Direction::Minimize => NodeKind::Minimize,
            Direction::Maximize => NodeKind::Maximize,
        }
    }
}

/// The expression being optimized, recorded for introspection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimaryObjective {
    Constant(f64),
    Expr(NodeId),
}

/// Summary of one declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo<'a> {
    pub kind: NodeKind,
    pub ref_id: RefId,
    pub fields: &'a NodeFields,
}

/// Owner of an optimization model graph.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) id: ModelId,
    pub(crate) name: Option<String>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) refs: Vec<NodeId>,
    pub(crate) statements: Vec<Argument>,
    pub(crate) objective: Option<NodeId>,
    pub(crate) direction: Option<Direction>,
    pub(crate) primary_objective: Option<PrimaryObjective>,
    arrays: Vec<CachedArray>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            id: ModelId::next(),
            name: None,
            nodes: Vec::new(),
            refs: Vec::new(),
            statements: Vec::new(),
            objective: None,
            direction: None,
            primary_objective: None,
            arrays: Vec::new(),
        }
    }

    /// Creates an empty model with a name.
    pub fn with_name(name: impl Into<String>) -> Self {
        let mut model = Self::new();
        model.name = Some(name.into());
        model
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_model_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    // === Use sites ===

    /// Records one consumption of `id` and returns the argument for the new site.
    ///
    /// The second consumption promotes the node into the reference table.
    pub(crate) fn use_node(&mut self, id: NodeId) -> Argument {
        let node = &mut self.nodes[id.index()];
        node.uses += 1;
        if node.uses >= 2 && node.ref_id.is_none() {
            self.force_ref(id);
        }
        Argument::Node(id)
    }

    /// Gives `id` a reference-table slot now, regardless of its use count.
    pub(crate) fn force_ref(&mut self, id: NodeId) -> RefId {
        if let Some(ref_id) = self.nodes[id.index()].ref_id {
            return ref_id;
        }
        let ref_id = RefId(self.refs.len() as u32);
        self.refs.push(id);
        self.nodes[id.index()].ref_id = Some(ref_id);
        ref_id
    }

    pub(crate) fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn node_ref(&self, id: NodeId) -> NodeRef {
        NodeRef { model: self.id, id }
    }

    fn check_handle(&self, node: NodeRef) -> Result<()> {
        if node.model != self.id || node.id.index() >= self.nodes.len() {
            return Err(ModelError::ForeignHandle);
        }
        Ok(())
    }

    // === Validation ===

    fn check_operand(&self, call: &str, shape: ArgShape, operand: &Operand) -> Result<()> {
        match (shape, operand) {
            (ArgShape::Bool, Operand::Bool(_)) => Ok(()),
            (ArgShape::Int, Operand::Int(value)) => {
                check_range(call, "integer", *value, INT_VAR_MIN, INT_VAR_MAX)?;
                Ok(())
            }
            (ArgShape::Int, Operand::Float(value)) => {
                if value.fract() != 0.0 || !value.is_finite() {
                    return Err(ValidationError::new(
                        call,
                        format!("expected an integer, got {value}"),
                    )
                    .into());
                }
                check_range(call, "integer", *value as i64, INT_VAR_MIN, INT_VAR_MAX)?;
                Ok(())
            }
            (ArgShape::Float, Operand::Int(_)) => Ok(()),
            (ArgShape::Float, Operand::Float(value)) => {
                if !value.is_finite() {
                    return Err(ValidationError::new(
                        call,
                        format!("expected a finite number, got {value}"),
                    )
                    .into());
                }
                Ok(())
            }
            (ArgShape::Matrix, Operand::Matrix(rows)) => {
                let width = rows.len();
                for row in rows {
                    if row.len() != width {
                        return Err(ValidationError::new(
                            call,
                            format!("transition matrix must be {width}x{width}"),
                        )
                        .into());
                    }
                    for value in row {
                        check_range(call, "transition time", *value, 0, INTERVAL_MAX)?;
                    }
                }
                Ok(())
            }
            (_, Operand::Node(node)) => {
                self.check_handle(*node)?;
                let ty = self.nodes[node.id.index()].kind.result();
                if !shape.accepts(ty) {
                    return Err(ValidationError::new(
                        call,
                        format!("expected {shape}, got {ty}"),
                    )
                    .into());
                }
                Ok(())
            }
            (_, Operand::Array(handle)) => {
                if handle.model != self.id || handle.index as usize >= self.arrays.len() {
                    return Err(ModelError::ForeignHandle);
                }
                let cached = &self.arrays[handle.index as usize];
                match cached.encoded {
                    Some(id) => {
                        let ty = self.nodes[id.index()].kind.result();
                        if !shape.accepts(ty) {
                            return Err(ValidationError::new(
                                call,
                                format!("expected {shape}, got {ty}"),
                            )
                            .into());
                        }
                        Ok(())
                    }
                    None => self.check_elements(call, shape, &cached.items),
                }
            }
            (_, Operand::Elements(items)) => self.check_elements(call, shape, items),
            (_, operand) => Err(ValidationError::new(
                call,
                format!("expected {shape}, got {}", describe_operand(operand)),
            )
            .into()),
        }
    }

    fn check_elements(&self, call: &str, shape: ArgShape, items: &[Operand]) -> Result<()> {
        let Some(element) = shape.element() else {
            return Err(ValidationError::new(call, format!("expected {shape}, got an array")).into());
        };
        for item in items {
            self.check_operand(call, element, item)?;
        }
        Ok(())
    }

    // === Encoding ===

    /// Encodes an operand that already passed `check_operand`.
    fn encode_operand(&mut self, shape: ArgShape, operand: Operand) -> Result<Argument> {
        Ok(match operand {
            Operand::Int(value) => Argument::Scalar(Scalar::Int(value)),
            Operand::Float(value) if shape == ArgShape::Int => {
                Argument::Scalar(Scalar::Int(value as i64))
            }
            Operand::Float(value) => Argument::Scalar(Scalar::Float(value)),
            Operand::Bool(value) => Argument::Scalar(Scalar::Bool(value)),
            Operand::Node(node) => self.use_node(node.id),
            Operand::Array(handle) => {
                let id = self.encode_array(handle, shape)?;
                self.use_node(id)
            }
            Operand::Elements(items) => {
                let id = self.build_array(shape, items)?;
                self.use_node(id)
            }
            Operand::Matrix(rows) => Argument::Array(
                rows.into_iter()
                    .map(|row| {
                        Argument::Array(
                            row.into_iter()
                                .map(|v| Argument::Scalar(Scalar::Int(v)))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
        })
    }

    fn build_array(&mut self, shape: ArgShape, items: Vec<Operand>) -> Result<NodeId> {
        let (Some(kind), Some(element)) = (shape.array_kind(), shape.element()) else {
            return Err(ValidationError::new("array", format!("{shape} is not an array")).into());
        };
        let mut args = Vec::with_capacity(items.len());
        for item in items {
            args.push(self.encode_operand(element, item)?);
        }
        Ok(self.push_node(Node::new(kind, args, NodeFields::default())))
    }

    /// Returns the node for a registered array, encoding it on first use.
    fn encode_array(&mut self, handle: ArrayHandle, shape: ArgShape) -> Result<NodeId> {
        let index = handle.index as usize;
        if let Some(id) = self.arrays[index].encoded {
            return Ok(id);
        }
        let items = self.arrays[index].items.clone();
        let id = self.build_array(shape, items)?;
        self.arrays[index].encoded = Some(id);
        Ok(id)
    }

    /// Registers a host array and returns the handle that shares its encoding.
    ///
    /// Passing the same handle to several builders yields one array node in the
    /// serialized model. Two handles with equal contents stay separate nodes.
    pub fn array<T: Into<Operand>>(&mut self, items: impl IntoIterator<Item = T>) -> ArrayHandle {
        let index = self.arrays.len() as u32;
        self.arrays.push(CachedArray {
            items: items.into_iter().map(Into::into).collect(),
            encoded: None,
        });
        ArrayHandle {
            model: self.id,
            index,
        }
    }

    // === Node construction ===

    /// Constructs a node of `kind` from `operands`.
    ///
    /// All operands are validated before any use count changes, so a rejected
    /// call leaves the graph untouched. Constraint kinds register themselves
    /// as root statements.
    pub fn node(&mut self, kind: NodeKind, operands: Vec<Operand>) -> Result<NodeRef> {
        let call = kind.tag();
        if kind.is_variable() {
            return Err(ValidationError::new(
                call,
                "variables are declared with declare_variable or sequence_var",
            )
            .into());
        }
        if kind.result() == ValueType::Objective {
            return Err(ValidationError::new(call, "objectives are set with set_objective").into());
        }
        let id = self.build_node(kind, operands, NodeFields::default())?;
        if kind.result() == ValueType::Constraint {
            self.register(id);
        }
        Ok(self.node_ref(id))
    }

    fn build_node(
        &mut self,
        kind: NodeKind,
        operands: Vec<Operand>,
        fields: NodeFields,
    ) -> Result<NodeId> {
        let call = kind.tag();
        let signature = kind.signature();
        if !signature.accepts_count(operands.len()) {
            return Err(ValidationError::new(
                call,
                format!("expected {}, got {}", kind.describe_arity(), operands.len()),
            )
            .into());
        }
        for (position, operand) in operands.iter().enumerate() {
            let Some(shape) = signature.shape_at(position) else {
                return Err(ValidationError::new(call, "too many arguments").into());
            };
            self.check_operand(call, shape, operand)?;
        }

        let mut args = Vec::with_capacity(operands.len());
        for (position, operand) in operands.into_iter().enumerate() {
            let shape = signature.shape_at(position).unwrap_or(ArgShape::Int);
            args.push(self.encode_operand(shape, operand)?);
        }
        Ok(self.push_node(Node::new(kind, args, fields)))
    }

    fn register(&mut self, id: NodeId) {
        let argument = self.use_node(id);
        self.statements.push(argument);
        self.nodes[id.index()].registered = true;
    }

    // === Variables ===

    /// Declares a variable directly on the model.
    ///
    /// The variable gets a reference-table slot immediately and is appended to
    /// the root statements, so every use encodes it as a reference.
    pub fn declare_variable(&mut self, kind: NodeKind, fields: NodeFields) -> Result<VariableHandle> {
        let (node, ref_id) = self.declare(kind, fields)?;
        Ok(match kind {
            NodeKind::BoolVar => VariableHandle::Bool(BoolVar { node, ref_id }),
            NodeKind::IntVar => VariableHandle::Int(IntVar { node, ref_id }),
            _ => VariableHandle::Interval(IntervalVar { node, ref_id }),
        })
    }

    fn declare(&mut self, kind: NodeKind, fields: NodeFields) -> Result<(NodeRef, RefId)> {
        let call = kind.tag();
        if !matches!(kind, NodeKind::BoolVar | NodeKind::IntVar | NodeKind::IntervalVar) {
            return Err(ValidationError::new(call, format!("{kind} is not a plain variable")).into());
        }
        fields.validate(call, kind)?;
        let id = self.push_node(Node::new(kind, Vec::new(), fields));
        Ok((self.node_ref(id), self.root_ref(id)))
    }

    /// Gives a freshly built variable its slot and appends it to the root statements.
    fn root_ref(&mut self, id: NodeId) -> RefId {
        let ref_id = self.force_ref(id);
        let argument = self.use_node(id);
        self.statements.push(argument);
        ref_id
    }

    /// Declares an integer variable with domain `[min, max]`.
    pub fn int_var(&mut self, min: i64, max: i64) -> Result<IntVar> {
        self.int_var_with(NodeFields::default().with_bounds(min, max))
    }

    pub fn int_var_with(&mut self, fields: NodeFields) -> Result<IntVar> {
        let (node, ref_id) = self.declare(NodeKind::IntVar, fields)?;
        Ok(IntVar { node, ref_id })
    }

    /// Declares an unbounded boolean variable.
    pub fn bool_var(&mut self) -> Result<BoolVar> {
        self.bool_var_with(NodeFields::default())
    }

    pub fn bool_var_with(&mut self, fields: NodeFields) -> Result<BoolVar> {
        let (node, ref_id) = self.declare(NodeKind::BoolVar, fields)?;
        Ok(BoolVar { node, ref_id })
    }

    /// Declares an interval variable of fixed `length`.
    pub fn interval_var(&mut self, length: i64) -> Result<IntervalVar> {
        self.interval_var_with(NodeFields::default().with_length(length, length))
    }

    pub fn interval_var_with(&mut self, fields: NodeFields) -> Result<IntervalVar> {
        let (node, ref_id) = self.declare(NodeKind::IntervalVar, fields)?;
        Ok(IntervalVar { node, ref_id })
    }

    /// Declares a sequence over `intervals`, optionally tagging each with a type.
    pub fn sequence_var(
        &mut self,
        intervals: impl Into<Operand>,
        types: Option<Vec<i64>>,
    ) -> Result<SequenceVar> {
        let mut operands = vec![intervals.into()];
        if let Some(types) = types {
            operands.push(types.into());
        }
        let id = self.build_node(NodeKind::SequenceVar, operands, NodeFields::default())?;
        let ref_id = self.root_ref(id);
        Ok(SequenceVar {
            node: self.node_ref(id),
            ref_id,
        })
    }

    // === Setters ===

    fn update_fields(
        &mut self,
        call: &str,
        node: NodeRef,
        update: impl FnOnce(&mut NodeFields),
    ) -> Result<()> {
        self.check_handle(node)?;
        let target = &self.nodes[node.id.index()];
        let mut fields = target.fields.clone();
        update(&mut fields);
        fields.validate(call, target.kind)?;
        self.nodes[node.id.index()].fields = fields;
        Ok(())
    }

    pub fn set_int_bounds(&mut self, var: &IntVar, min: i64, max: i64) -> Result<()> {
        self.update_fields("IntVar::set_bounds", var.node, |f| {
            f.min = Some(min);
            f.max = Some(max);
        })
    }

    pub fn set_start_bounds(&mut self, var: &IntervalVar, min: i64, max: i64) -> Result<()> {
        self.update_fields("IntervalVar::set_start", var.node, |f| {
            f.start_min = Some(min);
            f.start_max = Some(max);
        })
    }

    pub fn set_end_bounds(&mut self, var: &IntervalVar, min: i64, max: i64) -> Result<()> {
        self.update_fields("IntervalVar::set_end", var.node, |f| {
            f.end_min = Some(min);
            f.end_max = Some(max);
        })
    }

    pub fn set_length_bounds(&mut self, var: &IntervalVar, min: i64, max: i64) -> Result<()> {
        self.update_fields("IntervalVar::set_length", var.node, |f| {
            f.length_min = Some(min);
            f.length_max = Some(max);
        })
    }

    pub fn set_presence(&mut self, var: &impl Variable, presence: Presence) -> Result<()> {
        self.update_fields("set_presence", var.node_ref(), |f| f.presence = presence)
    }

    pub fn set_name(&mut self, node: &impl Handle, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.update_fields("set_name", node.node_ref(), |f| f.name = Some(name))
    }

    // === Statements and objective ===

    /// Enforces a boolean expression or constraint.
    ///
    /// Constraints already registered themselves when built, so enforcing
    /// one again is a no-op.
    pub fn enforce(&mut self, item: impl Into<Enforceable>) -> Result<()> {
        match item.into() {
            Enforceable::Constraint(constraint) => {
                self.check_handle(constraint.0)?;
                if !self.nodes[constraint.0.id.index()].registered {
                    self.register(constraint.0.id);
                }
                Ok(())
            }
            Enforceable::Bool(expr) => {
                self.check_handle(expr.0)?;
                let argument = self.use_node(expr.0.id);
                self.statements.push(argument);
                Ok(())
            }
            Enforceable::Literal(value) => {
                self.statements.push(Argument::Scalar(Scalar::Bool(value)));
                Ok(())
            }
        }
    }

    /// Enforces every item of an iterator.
    pub fn enforce_all<T, I>(&mut self, items: I) -> Result<()>
    where
        T: Into<Enforceable>,
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.enforce(item)?;
        }
        Ok(())
    }

    /// Appends a boolean expression as a constraint.
    pub fn add_constraint(&mut self, expr: impl Into<Enforceable>) -> Result<()> {
        self.enforce(expr)
    }

    /// Sets the objective, replacing any previous one.
    pub fn set_objective(&mut self, direction: Direction, expr: impl Into<Operand>) -> Result<()> {
        let operand = expr.into();
        let primary = match &operand {
            Operand::Int(value) => PrimaryObjective::Constant(*value as f64),
            Operand::Float(value) => PrimaryObjective::Constant(*value),
            Operand::Node(node) => PrimaryObjective::Expr(node.id),
            _ => {
                return Err(ValidationError::new(
                    direction.kind().tag(),
                    "objective must be a number or an integer expression",
                )
                .into())
            }
        };
        let id = self.build_node(direction.kind(), vec![operand], NodeFields::default())?;
        self.use_node(id);
        self.objective = Some(id);
        self.direction = Some(direction);
        self.primary_objective = Some(primary);
        Ok(())
    }

    pub fn minimize(&mut self, expr: impl Into<Operand>) -> Result<()> {
        self.set_objective(Direction::Minimize, expr)
    }

    pub fn maximize(&mut self, expr: impl Into<Operand>) -> Result<()> {
        self.set_objective(Direction::Maximize, expr)
    }

    // === Introspection ===

    /// Iterates over declared variables in reference-table order.
    pub fn variables(&self) -> impl Iterator<Item = VariableInfo<'_>> + '_ {
        self.refs.iter().filter_map(move |id| {
            let node = &self.nodes[id.index()];
            match (node.kind.is_variable(), node.ref_id) {
                (true, Some(ref_id)) => Some(VariableInfo {
                    kind: node.kind,
                    ref_id,
                    fields: &node.fields,
                }),
                _ => None,
            }
        })
    }

    /// Typed handle for the variable stored at `ref_id`.
    ///
    /// This is how a host recovers handles on a model rebuilt by
    /// [`Model::deserialize`].
    pub fn variable(&self, ref_id: RefId) -> Option<VariableHandle> {
        let id = self.ref_node(ref_id.index())?;
        let node = self.node_ref(id);
        match self.nodes[id.index()].kind {
            NodeKind::BoolVar => Some(VariableHandle::Bool(BoolVar { node, ref_id })),
            NodeKind::IntVar => Some(VariableHandle::Int(IntVar { node, ref_id })),
            NodeKind::IntervalVar => Some(VariableHandle::Interval(IntervalVar { node, ref_id })),
            _ => None,
        }
    }

    /// Number of root statements that are not variable declarations.
    pub fn constraint_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|statement| match statement {
                Argument::Node(id) => !self.nodes[id.index()].kind.is_variable(),
                _ => true,
            })
            .count()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn ref_count(&self) -> usize {
        self.refs.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_kind(&self, node: &impl Handle) -> Option<NodeKind> {
        let node = node.node_ref();
        self.check_handle(node).ok()?;
        Some(self.nodes[node.id.index()].kind)
    }

    pub fn fields(&self, node: &impl Handle) -> Option<&NodeFields> {
        let node = node.node_ref();
        self.check_handle(node).ok()?;
        Some(&self.nodes[node.id.index()].fields)
    }

    /// Reference-table slot of a node, if it has been promoted.
    pub fn ref_of(&self, node: &impl Handle) -> Option<RefId> {
        let node = node.node_ref();
        self.check_handle(node).ok()?;
        self.nodes[node.id.index()].ref_id
    }

    /// Objective direction and primary expression, if an objective is set.
    pub fn objective(&self) -> Option<(Direction, PrimaryObjective)> {
        self.direction.zip(self.primary_objective)
    }

    pub fn primary_objective(&self) -> Option<PrimaryObjective> {
        self.primary_objective
    }

    /// Kind of the node behind the primary objective expression.
    pub fn primary_objective_kind(&self) -> Option<NodeKind> {
        match self.primary_objective? {
            PrimaryObjective::Expr(id) => Some(self.nodes[id.index()].kind),
            PrimaryObjective::Constant(_) => None,
        }
    }

    /// Returns true if `constraint` is among the root statements.
    pub fn is_registered(&self, constraint: &Constraint) -> bool {
        self.check_handle(constraint.0).is_ok() && self.nodes[constraint.0.id.index()].registered
    }
}

// Decoding support for `Model::deserialize`.
impl Model {
    pub(crate) fn push_placeholder(&mut self, kind: NodeKind, fields: NodeFields) -> NodeId {
        self.push_node(Node::new(kind, Vec::new(), fields))
    }

    pub(crate) fn finish_node(&mut self, id: NodeId, args: Vec<Argument>) -> Result<()> {
        let kind = self.nodes[id.index()].kind;
        if !kind.signature().accepts_count(args.len()) {
            return Err(ModelError::Document(format!(
                "{kind} expects {}, got {}",
                kind.describe_arity(),
                args.len()
            )));
        }
        self.nodes[id.index()].args = args;
        Ok(())
    }

    pub(crate) fn ref_node(&self, index: u32) -> Option<NodeId> {
        self.refs.get(index as usize).copied()
    }

    pub(crate) fn push_statement(&mut self, argument: Argument) {
        if let Argument::Node(id) = argument {
            let node = &mut self.nodes[id.index()];
            if node.kind.result() == ValueType::Constraint {
                node.registered = true;
            }
        }
        self.statements.push(argument);
    }

    pub(crate) fn first_arg(&self, id: NodeId) -> Option<Argument> {
        self.nodes[id.index()].args.first().cloned()
    }

    pub(crate) fn restore_objective(
        &mut self,
        id: NodeId,
        direction: Direction,
        primary: PrimaryObjective,
    ) {
        self.nodes[id.index()].uses += 1;
        self.objective = Some(id);
        self.direction = Some(direction);
        self.primary_objective = Some(primary);
    }
}

fn describe_operand(operand: &Operand) -> &'static str {
    match operand {
        Operand::Int(_) => "an integer literal",
        Operand::Float(_) => "a number literal",
        Operand::Bool(_) => "a boolean literal",
        Operand::Node(_) => "an expression",
        Operand::Array(_) | Operand::Elements(_) => "an array",
        Operand::Matrix(_) => "a matrix",
    }
}
