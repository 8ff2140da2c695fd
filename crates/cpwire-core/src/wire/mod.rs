//! JSON wire document for a model.
//!
//! Serialization walks the finished arena once. A node with a reference-table
//! slot is written as `{"ref": id}` at every use site; any other node is
//! embedded inline in its single consumer.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::graph::{
    Argument, Direction, Model, NodeFields, NodeId, NodeKind, PrimaryObjective, Scalar,
};
use crate::solution::Solution;

#[cfg(test)]
mod tests;

/// Command carried in the `msg` field of a model document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    Solve,
    Propagate,
    ToText,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Solve => "solve",
            Command::Propagate => "propagate",
            Command::ToText => "toText",
        }
    }
}

/// One node record: function tag, arguments and kind-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    pub func: String,
    #[serde(default)]
    pub args: Vec<WireArg>,
    #[serde(flatten)]
    pub fields: NodeFields,
}

/// One encoded argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireArg {
    Int(i64),
    Float(f64),
    Bool(bool),
    Ref {
        #[serde(rename = "ref")]
        id: u32,
    },
    Inline(Box<WireNode>),
    Array(Vec<WireArg>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentOut<'a, P> {
    msg: Command,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    refs: Vec<WireNode>,
    model: Vec<WireArg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    objective: Option<WireNode>,
    parameters: &'a P,
    #[serde(skip_serializing_if = "Option::is_none")]
    warm_start: Option<&'a Solution>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentIn {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    refs: Option<Vec<WireNode>>,
    #[serde(default)]
    model: Option<Vec<WireArg>>,
    #[serde(default)]
    objective: Option<WireNode>,
}

impl Model {
    /// Serializes the model into one wire document.
    ///
    /// Graph construction must be finished: a later use of an already
    /// serialized node changes how earlier sites encode it.
    pub fn serialize<P: Serialize>(
        &self,
        command: Command,
        parameters: &P,
        warm_start: Option<&Solution>,
    ) -> Result<String> {
        let document = DocumentOut {
            msg: command,
            name: self.name(),
            refs: self.refs.iter().map(|id| self.wire_node(*id)).collect(),
            model: self.statements.iter().map(|arg| self.wire_arg(arg)).collect(),
            objective: self.objective.map(|id| self.wire_node(id)),
            parameters,
            warm_start,
        };
        Ok(serde_json::to_string(&document)?)
    }

    fn wire_node(&self, id: NodeId) -> WireNode {
        let node = &self.nodes[id.index()];
        WireNode {
            func: node.kind.tag().to_string(),
            args: node.args.iter().map(|arg| self.wire_arg(arg)).collect(),
            fields: node.fields.clone(),
        }
    }

    fn wire_arg(&self, arg: &Argument) -> WireArg {
        match arg {
            Argument::Scalar(Scalar::Int(value)) => WireArg::Int(*value),
            Argument::Scalar(Scalar::Float(value)) => WireArg::Float(*value),
            Argument::Scalar(Scalar::Bool(value)) => WireArg::Bool(*value),
            Argument::Node(id) => match self.nodes[id.index()].ref_id {
                Some(ref_id) => WireArg::Ref {
                    id: ref_id.index(),
                },
                None => WireArg::Inline(Box::new(self.wire_node(*id))),
            },
            Argument::Array(items) => {
                WireArg::Array(items.iter().map(|item| self.wire_arg(item)).collect())
            }
        }
    }

    /// Rebuilds a model from a document produced by [`Model::serialize`].
    ///
    /// Missing `refs` or `model` keys are reported as [`ModelError::Document`].
    pub fn deserialize(json: &str) -> Result<Model> {
        let document: DocumentIn = serde_json::from_str(json)?;
        let refs = document
            .refs
            .ok_or_else(|| ModelError::Document("missing \"refs\"".to_string()))?;
        let statements = document
            .model
            .ok_or_else(|| ModelError::Document("missing \"model\"".to_string()))?;

        let mut model = match document.name {
            Some(name) => Model::with_name(name),
            None => Model::new(),
        };

        // Placeholders first: table entries may reference later entries.
        let mut pending = Vec::with_capacity(refs.len());
        for wire in refs {
            let kind = parse_kind(&wire.func)?;
            let id = model.push_placeholder(kind, wire.fields);
            model.force_ref(id);
            pending.push((id, wire.args));
        }
        for (id, args) in pending {
            let args = args
                .iter()
                .map(|arg| model.decode_arg(arg))
                .collect::<Result<Vec<_>>>()?;
            model.finish_node(id, args)?;
        }

        for statement in &statements {
            let argument = model.decode_arg(statement)?;
            model.push_statement(argument);
        }

        if let Some(objective) = document.objective {
            let direction = match parse_kind(&objective.func)? {
                NodeKind::Minimize => Direction::Minimize,
                NodeKind::Maximize => Direction::Maximize,
                other => {
                    return Err(ModelError::Document(format!(
                        "objective has kind {other}"
                    )))
                }
            };
            let id = model.decode_node(&objective)?;
            let primary = match model.first_arg(id) {
                Some(Argument::Scalar(Scalar::Int(value))) => PrimaryObjective::Constant(value as f64),
                Some(Argument::Scalar(Scalar::Float(value))) => PrimaryObjective::Constant(value),
                Some(Argument::Node(expr)) => PrimaryObjective::Expr(expr),
                _ => {
                    return Err(ModelError::Document(
                        "objective has no numeric argument".to_string(),
                    ))
                }
            };
            model.restore_objective(id, direction, primary);
        }

        Ok(model)
    }

    fn decode_arg(&mut self, arg: &WireArg) -> Result<Argument> {
        Ok(match arg {
            WireArg::Int(value) => Argument::Scalar(Scalar::Int(*value)),
            WireArg::Float(value) => Argument::Scalar(Scalar::Float(*value)),
            WireArg::Bool(value) => Argument::Scalar(Scalar::Bool(*value)),
            WireArg::Ref { id } => {
                let node = self.ref_node(*id).ok_or_else(|| {
                    ModelError::Document(format!("reference {id} is outside the table"))
                })?;
                self.use_node(node)
            }
            WireArg::Inline(node) => {
                let id = self.decode_node(node)?;
                self.use_node(id)
            }
            WireArg::Array(items) => Argument::Array(
                items
                    .iter()
                    .map(|item| self.decode_arg(item))
                    .collect::<Result<Vec<_>>>()?,
            ),
        })
    }

    fn decode_node(&mut self, wire: &WireNode) -> Result<NodeId> {
        let kind = parse_kind(&wire.func)?;
        let args = wire
            .args
            .iter()
            .map(|arg| self.decode_arg(arg))
            .collect::<Result<Vec<_>>>()?;
        let id = self.push_placeholder(kind, wire.fields.clone());
        self.finish_node(id, args)?;
        Ok(id)
    }
}

fn parse_kind(tag: &str) -> Result<NodeKind> {
    NodeKind::from_tag(tag).ok_or_else(|| ModelError::Document(format!("unknown function \"{tag}\"")))
}
