//! ESTree JSON parser backend.
//!
//! Loads the JSON syntax tree an external JavaScript parser (acorn, espree,
//! esprima, babylon) wrote next to the source file, with location tracking
//! enabled, and normalizes it. The tree for `lib/a.js` is read from
//! `lib/a.js.ast.json` by default.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::ast_engine::adapter::ParserAdapter;
use crate::error::ParseError;
use crate::types::{Location, Position, SyntaxNode};
use crate::DEFAULT_ESTREE_SUFFIX;

/// Parser backend reading pre-parsed ESTree documents.
#[derive(Debug, Clone)]
pub struct EstreeParser {
    suffix: String,
}

impl Default for EstreeParser {
    fn default() -> Self {
        Self::with_suffix(DEFAULT_ESTREE_SUFFIX)
    }
}

impl EstreeParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read trees from `<path><suffix>`.
    pub fn with_suffix(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
        }
    }

    /// Location of the JSON tree for a source file.
    pub fn tree_path(&self, path: &Path) -> PathBuf {
        let mut os: OsString = path.as_os_str().to_owned();
        os.push(&self.suffix);
        PathBuf::from(os)
    }

    /// Normalize an ESTree document. Babel's `File` wrapper is unwrapped to
    /// its `program`.
    pub fn convert_document(&self, path: &Path, document: &Value) -> Result<SyntaxNode, ParseError> {
        let root = match node_type(document) {
            Some("File") => document
                .get("program")
                .ok_or_else(|| ParseError::new(path, "File node without program"))?,
            _ => document,
        };
        convert(path, root)
    }
}

#[async_trait]
impl ParserAdapter for EstreeParser {
    fn name(&self) -> &'static str {
        "estree"
    }

    async fn parse(&self, path: &Path) -> Result<SyntaxNode, ParseError> {
        let tree_path = self.tree_path(path);
        let text = tokio::fs::read_to_string(&tree_path)
            .await
            .map_err(|e| ParseError::new(path, format!("{}: {}", tree_path.display(), e)))?;
        let document: Value =
            serde_json::from_str(&text).map_err(|e| ParseError::new(path, e.to_string()))?;

        let node = self.convert_document(path, &document)?;
        debug!(path = %path.display(), nodes = node.node_count(), "Loaded ESTree document");
        Ok(node)
    }
}

fn node_type(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

fn convert(path: &Path, value: &Value) -> Result<SyntaxNode, ParseError> {
    let kind = node_type(value).ok_or_else(|| ParseError::new(path, "Node without type"))?;
    let span = location(value)
        .ok_or_else(|| ParseError::new(path, format!("{} node without loc", kind)))?;

    let mut node = SyntaxNode::new(kind, span);
    node.name = name_of(value);

    if let Some(body) = body_of(value) {
        let children = body
            .iter()
            .map(|child| convert(path, child))
            .collect::<Result<Vec<_>, _>>()?;
        node = node.with_body(children);
    }
    Ok(node)
}

fn location(value: &Value) -> Option<Location> {
    let loc = value.get("loc")?;
    Some(Location::new(position(loc.get("start")?)?, position(loc.get("end")?)?))
}

fn position(value: &Value) -> Option<Position> {
    let line = value.get("line")?.as_u64()? as usize;
    let column = value.get("column")?.as_u64()? as usize;
    Some(Position::new(line, column))
}

/// Statements of the node's nested scope.
///
/// A `body` array is used as is; a `body` object (BlockStatement, ClassBody)
/// contributes its own array. Declarations that hold their function in
/// another field are followed to it.
fn body_of(value: &Value) -> Option<&Vec<Value>> {
    match value.get("body") {
        Some(Value::Array(items)) => return Some(items),
        Some(inner @ Value::Object(_)) => return body_of(inner),
        _ => {}
    }

    let inner = match node_type(value)? {
        "ExportNamedDeclaration" | "ExportDefaultDeclaration" => value.get("declaration"),
        "VariableDeclaration" => value.get("declarations")?.get(0),
        "VariableDeclarator" => value.get("init"),
        "ExpressionStatement" => value.get("expression"),
        "AssignmentExpression" => value.get("right"),
        "MethodDefinition" | "Property" | "PropertyDefinition" | "ClassProperty" => {
            value.get("value")
        }
        _ => None,
    }?;
    body_of(inner)
}

fn name_of(value: &Value) -> Option<String> {
    let direct = ["id", "key"]
        .iter()
        .find_map(|field| value.get(field)?.get("name")?.as_str());
    if let Some(name) = direct {
        return Some(name.to_string());
    }

    match node_type(value)? {
        "ExportNamedDeclaration" | "ExportDefaultDeclaration" => {
            name_of(value.get("declaration")?)
        }
        "VariableDeclaration" => name_of(value.get("declarations")?.get(0)?),
        "ExpressionStatement" => name_of(value.get("expression")?),
        "AssignmentExpression" => member_name(value.get("left")?),
        _ => None,
    }
}

/// `a.b.c` for identifiers and non-computed member chains.
fn member_name(value: &Value) -> Option<String> {
    match node_type(value)? {
        "Identifier" => value.get("name")?.as_str().map(str::to_string),
        "MemberExpression" => {
            let object = member_name(value.get("object")?)?;
            let property = value.get("property")?.get("name")?.as_str()?;
            Some(format!("{}.{}", object, property))
        }
        "ThisExpression" => Some("this".to_string()),
        _ => None,
    }
}
