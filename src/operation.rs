// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Typed operation tree handed over by the host compiler.
//!
//! The tree is an arena: nodes are addressed by [`OperationId`] and parent links
//! are plain indices. Analysis only ever reads it through borrowed
//! [`Operation`] views.

use crate::symbols::{MethodSymbol, TypeSymbol};

use core::fmt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Source location of an operation's syntax.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: Arc<str>,
    pub line: u32,
    pub col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Location {
    pub fn new(file: impl Into<Arc<str>>, line: u32, col: u32) -> Self {
        Self {
            file: file.into(),
            line,
            col,
            end_line: line,
            end_col: col,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinaryOperatorKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    And,
    Or,
    ExclusiveOr,
    ConditionalAnd,
    ConditionalOr,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

/// Compile-time constant carried by a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Char(char),
    String(Arc<str>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind {
    BinaryOperator(BinaryOperatorKind),
    /// Call of `target`. Children are the receiver (instance calls only)
    /// followed by one [`OperationKind::Argument`] per argument.
    Invocation(MethodSymbol),
    /// Wraps the argument value, its only child.
    Argument,
    /// Lambda or anonymous method. The child is the body.
    AnonymousFunction,
    /// `None` when the literal has no constant value.
    Literal(Option<ConstantValue>),
    /// Implicit or explicit conversion of its only child.
    Conversion,
    Block,
    Return,
    ParameterReference(Arc<str>),
    LocalReference(Arc<str>),
    FieldReference(Arc<str>),
    PropertyReference(Arc<str>),
    Other(Arc<str>),
}

/// Index of a node within its [`OperationTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(u32);

impl OperationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised while assembling an [`OperationTree`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("operation {0} does not belong to this tree")]
    UnknownOperation(OperationId),
    #[error("operation {child} already has parent {parent}")]
    AlreadyParented {
        child: OperationId,
        parent: OperationId,
    },
    #[error("tree cannot hold more than {} operations", u32::MAX)]
    Full,
}

#[derive(Debug, Clone)]
struct Node {
    kind: OperationKind,
    ty: Option<TypeSymbol>,
    location: Location,
    parent: Option<OperationId>,
    children: Vec<OperationId>,
}

/// Id of the node appended to a tree of `len` nodes. The count after the
/// append must still fit in `u32`.
fn next_id(len: usize) -> Result<OperationId, TreeError> {
    let count = len
        .checked_add(1)
        .and_then(|count| u32::try_from(count).ok())
        .ok_or(TreeError::Full)?;
    Ok(OperationId(count - 1))
}

/// Arena of operations, built bottom-up: children are added before their parent.
#[derive(Debug, Clone, Default)]
pub struct OperationTree {
    nodes: Vec<Node>,
}

impl OperationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node owning `children`, which become its ordered operands.
    pub fn add(
        &mut self,
        kind: OperationKind,
        ty: Option<TypeSymbol>,
        location: Location,
        children: Vec<OperationId>,
    ) -> Result<OperationId, TreeError> {
        let id = next_id(self.nodes.len())?;
        for (idx, child) in children.iter().enumerate() {
            let node = self
                .nodes
                .get(child.index())
                .ok_or(TreeError::UnknownOperation(*child))?;
            if let Some(parent) = node.parent {
                return Err(TreeError::AlreadyParented {
                    child: *child,
                    parent,
                });
            }
            if children[..idx].contains(child) {
                return Err(TreeError::AlreadyParented {
                    child: *child,
                    parent: id,
                });
            }
        }
        for child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            ty,
            location,
            parent: None,
            children,
        });
        Ok(id)
    }

    pub fn get(&self, id: OperationId) -> Option<Operation<'_>> {
        (id.index() < self.nodes.len()).then_some(Operation { tree: self, id })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All operations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Operation<'_>> + '_ {
        // `add` keeps the node count within `u32`.
        let count = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        (0..count).map(move |idx| Operation {
            tree: self,
            id: OperationId(idx),
        })
    }

    fn node(&self, id: OperationId) -> &Node {
        // Views are only handed out for ids of this tree.
        &self.nodes[id.index()]
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct Operation<'t> {
    tree: &'t OperationTree,
    id: OperationId,
}

impl<'t> Operation<'t> {
    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn kind(&self) -> &'t OperationKind {
        &self.tree.node(self.id).kind
    }

    /// Declared type, if the operation has one.
    pub fn ty(&self) -> Option<&'t TypeSymbol> {
        self.tree.node(self.id).ty.as_ref()
    }

    pub fn location(&self) -> &'t Location {
        &self.tree.node(self.id).location
    }

    pub fn parent(&self) -> Option<Operation<'t>> {
        self.tree.node(self.id).parent.map(|id| Operation {
            tree: self.tree,
            id,
        })
    }

    pub fn children(&self) -> impl Iterator<Item = Operation<'t>> + 't {
        let tree = self.tree;
        tree.node(self.id)
            .children
            .iter()
            .map(move |id| Operation { tree, id: *id })
    }

    pub fn child(&self, idx: usize) -> Option<Operation<'t>> {
        self.tree
            .node(self.id)
            .children
            .get(idx)
            .map(|id| Operation {
                tree: self.tree,
                id: *id,
            })
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self) -> Ancestors<'t> {
        Ancestors {
            next: self.parent(),
        }
    }

    pub fn binary_operator_kind(&self) -> Option<BinaryOperatorKind> {
        match self.kind() {
            OperationKind::BinaryOperator(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn invocation_target(&self) -> Option<&'t MethodSymbol> {
        match self.kind() {
            OperationKind::Invocation(target) => Some(target),
            _ => None,
        }
    }

    pub fn is_anonymous_function(&self) -> bool {
        matches!(self.kind(), OperationKind::AnonymousFunction)
    }

    /// Argument nodes of an invocation, in parameter order.
    pub fn arguments(&self) -> impl Iterator<Item = Operation<'t>> + 't {
        self.children()
            .filter(|child| matches!(child.kind(), OperationKind::Argument))
    }

    /// The value passed as argument `idx` of an invocation.
    pub fn argument_value(&self, idx: usize) -> Option<Operation<'t>> {
        self.arguments().nth(idx).and_then(|arg| arg.child(0))
    }
}

impl fmt::Debug for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.id)
            .field("kind", self.kind())
            .field("location", self.location())
            .finish()
    }
}

/// Iterator over the ancestors of an operation.
pub struct Ancestors<'t> {
    next: Option<Operation<'t>>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = Operation<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}
