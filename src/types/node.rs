//! Normalized syntax-tree nodes.
//!
//! Every parser backend converts its native tree into this shape. The matcher
//! only ever looks at start lines and `body` ordering.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A point in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column as reported by the backend (0-indexed for the shipped backends).
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Source span of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span covering whole lines, columns zeroed.
    pub fn lines(start_line: usize, end_line: usize) -> Self {
        Self {
            start: Position::new(start_line, 0),
            end: Position::new(end_line, 0),
        }
    }
}

/// A node of a parsed source file.
///
/// `body` holds the nested statements of container nodes (program roots,
/// blocks, function and class bodies) in ascending source order. `None` means
/// there is no nested scope to search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Backend-specific node category (e.g. `function_declaration`, `FunctionDeclaration`).
    pub kind: String,
    /// Declared name, when the node declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declaration header text, when the backend can recover it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<Arc<SyntaxNode>>>,
}

impl SyntaxNode {
    /// Create a leaf node.
    pub fn new(kind: impl Into<String>, location: Location) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            signature: None,
            location,
            body: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Attach a nested scope.
    pub fn with_body(mut self, children: Vec<SyntaxNode>) -> Self {
        self.body = Some(children.into_iter().map(Arc::new).collect());
        self
    }

    pub fn start_line(&self) -> usize {
        self.location.start.line
    }

    pub fn end_line(&self) -> usize {
        self.location.end.line
    }

    /// Whether this node opens a nested scope.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Nested statements, empty for leaves.
    pub fn children(&self) -> &[Arc<SyntaxNode>] {
        self.body.as_deref().unwrap_or(&[])
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Flat description used when reporting a match.
    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            kind: self.kind.clone(),
            name: self.name.clone(),
            signature: self.signature.clone(),
            location: self.location,
        }
    }
}

/// A node without its nested scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub location: Location,
}
