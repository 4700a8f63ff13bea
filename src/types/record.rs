//! Documentation records flowing through the enhancer.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

use super::node::SyntaxNode;
use crate::error::Result;

/// One extracted documentation comment and the line it claims to describe.
///
/// This is the input and output unit of the enhancer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationRecord {
    /// Source file the comment was extracted from
    pub path: PathBuf,

    /// Line (1-indexed) where the documented declaration should start
    pub context_line: usize,

    /// Comment payload, carried through untouched
    #[serde(default)]
    pub context: Option<serde_json::Value>,

    /// Matched declaration, shared with the tree it was found in
    #[serde(
        default,
        skip_deserializing,
        serialize_with = "serialize_node",
        skip_serializing_if = "Option::is_none"
    )]
    node: Option<Arc<SyntaxNode>>,

    /// Parse failure for this record's file, when errors are marked per record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentationRecord {
    /// Create a record with no payload.
    pub fn new(path: impl Into<PathBuf>, context_line: usize) -> Self {
        Self {
            path: path.into(),
            context_line,
            context: None,
            node: None,
            error: None,
        }
    }

    /// Parse one JSON-encoded record.
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Set the comment payload.
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// The matched declaration, if any.
    pub fn node(&self) -> Option<&Arc<SyntaxNode>> {
        self.node.as_ref()
    }

    pub fn is_matched(&self) -> bool {
        self.node.is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Attach the matched node.
    ///
    /// A record is enhanced at most once: returns `false` and leaves the
    /// record untouched if a node is already attached.
    pub fn attach_node(&mut self, node: Arc<SyntaxNode>) -> bool {
        if self.node.is_some() {
            return false;
        }
        self.node = Some(node);
        true
    }

    /// Lowercased extension with a leading dot, e.g. `.js`.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
    }
}

fn serialize_node<S>(
    node: &Option<Arc<SyntaxNode>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    node.as_ref().map(|n| n.summary()).serialize(serializer)
}
