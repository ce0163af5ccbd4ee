use derive_more::Display;

use crate::path::NodePath;

use super::Tree;

/// Callback run after every successful mutation, with the updated tree
pub type MutationHook = Box<dyn FnMut(&Mutation, &Tree)>;

/// The kind of a mutating operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(rename_all = "lowercase")]
pub enum Operation {
    Mkdir,
    Touch,
    Write,
    Rm,
    Mv,
    Cp,
    Ln,
    Sed,
}

/// Describes a completed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub operation: Operation,
    /// Physical paths touched by the operation, e.g. source then destination for `mv`
    pub paths: Vec<NodePath>,
}

impl Mutation {
    pub fn new(operation: Operation, paths: Vec<NodePath>) -> Self {
        Self { operation, paths }
    }
}
