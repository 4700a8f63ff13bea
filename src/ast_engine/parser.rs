//! Tree-sitter parser backend.
//!
//! Parses source files with the bundled grammars and normalizes the concrete
//! tree into [`SyntaxNode`]s: only statements and declarations that live in a
//! scope become children, comments are dropped.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

use crate::ast_engine::adapter::ParserAdapter;
use crate::ast_engine::languages::{rules_for, Follow, NodeRules};
use crate::error::ParseError;
use crate::processing::Language;
use crate::types::{Location, Position, SyntaxNode};

/// Fields that belong to a declaration's header rather than its scope.
const HEADER_FIELDS: &[&str] = &[
    "name",
    "parameters",
    "superclass",
    "return_type",
    "type_parameters",
    "receiver",
    "result",
];

/// Tree-sitter based parser backend.
#[derive(Debug, Clone, Default)]
pub struct TreeSitterParser {
    strict: bool,
}

impl TreeSitterParser {
    /// Create a lenient parser: trees with syntax errors are still returned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject files whose tree contains syntax errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse source text that belongs to `path`.
    pub fn parse_source(&self, path: &Path, content: &str) -> Result<SyntaxNode, ParseError> {
        let language = Language::from_path(path)
            .ok_or_else(|| ParseError::new(path, "Language not supported"))?;

        // A fresh parser per call; tree_sitter::Parser is not Sync
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| ParseError::new(path, e.to_string()))?;

        let tree = parser
            .parse(content.as_bytes(), None)
            .ok_or_else(|| ParseError::new(path, "Failed to parse content"))?;

        let root = tree.root_node();
        if root.has_error() {
            let message = first_error(root)
                .map(|pos| format!("Syntax error at line {}, column {}", pos.line, pos.column))
                .unwrap_or_else(|| "Syntax error".to_string());
            if self.strict {
                return Err(ParseError::new(path, message));
            }
            warn!(path = %path.display(), error = %message, "Parsed with syntax errors");
        }

        let normalizer = Normalizer {
            source: content,
            rules: rules_for(language),
        };
        let node = normalizer.convert(root);
        debug!(
            path = %path.display(),
            language = %language,
            nodes = node.node_count(),
            "Normalized tree-sitter tree"
        );
        Ok(node)
    }
}

#[async_trait]
impl ParserAdapter for TreeSitterParser {
    fn name(&self) -> &'static str {
        "tree-sitter"
    }

    async fn parse(&self, path: &Path) -> Result<SyntaxNode, ParseError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ParseError::new(path, e.to_string()))?;

        // Parsing is CPU-bound; keep it off the async workers
        let parser = self.clone();
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || parser.parse_source(&owned, &content))
            .await
            .map_err(|e| ParseError::new(path, format!("Parse task failed: {}", e)))?
    }
}

/// Converts a tree-sitter tree into the normalized node shape.
struct Normalizer<'s> {
    source: &'s str,
    rules: NodeRules,
}

impl<'s> Normalizer<'s> {
    fn convert(&self, node: Node) -> SyntaxNode {
        let mut out = SyntaxNode::new(node.kind(), location(&node));
        out.name = self.name_of(node);

        let scope = self.scope_of(node);
        out.signature = self.signature(node, scope);
        if let Some(scope) = scope {
            let children = self
                .body_of(scope)
                .into_iter()
                .map(|child| self.convert(child))
                .collect();
            out = out.with_body(children);
        }
        out
    }

    /// The node whose children form this node's nested scope.
    fn scope_of<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        if self.rules.is_container(node.kind()) {
            return Some(node);
        }

        if let Some(body) = node.child_by_field_name("body") {
            return self.scope_of(body);
        }

        match self.rules.wrapper(node.kind())? {
            Follow::Field(field) => self.scope_of(node.child_by_field_name(field)?),
            Follow::FirstNamed => self.scope_of(first_named(node)?),
        }
    }

    /// Named children of a container, minus declaration headers, with a
    /// nested `body` container spliced in.
    fn body_of<'t>(&self, scope: Node<'t>) -> Vec<Node<'t>> {
        let mut children = Vec::new();
        let mut cursor = scope.walk();
        if !cursor.goto_first_child() {
            return children;
        }

        loop {
            let child = cursor.node();
            if child.is_named() && !self.rules.is_comment(child.kind()) {
                match cursor.field_name() {
                    Some("body") if self.rules.is_container(child.kind()) => {
                        children.extend(self.body_of(child));
                    }
                    Some(field) if HEADER_FIELDS.contains(&field) => {}
                    _ => children.push(child),
                }
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }

        children
    }

    /// Declared name, looking through wrappers.
    fn name_of(&self, node: Node) -> Option<String> {
        if let Some(name) = node.child_by_field_name("name") {
            return self.text(name).map(str::to_string);
        }

        if node.kind() == "assignment_expression" {
            let target = node
                .child_by_field_name("left")
                .and_then(|left| self.member_name(left));
            if target.is_some() {
                return target;
            }
        }

        if let Some(follow) = self.rules.wrapper(node.kind()) {
            let inner = match follow {
                Follow::Field(field) => node.child_by_field_name(field),
                Follow::FirstNamed => first_named(node),
            };
            if let Some(name) = inner.and_then(|inner| self.name_of(inner)) {
                return Some(name);
            }
        }

        let mut cursor = node.walk();
        let found = node.named_children(&mut cursor).find(|child| {
            matches!(
                child.kind(),
                "identifier" | "name" | "property_identifier" | "type_identifier" | "constant"
            )
        });
        found.and_then(|child| self.text(child)).map(str::to_string)
    }

    /// `a.b.c` for identifiers and non-computed member chains.
    fn member_name(&self, node: Node) -> Option<String> {
        match node.kind() {
            "identifier" | "this" => self.text(node).map(str::to_string),
            "member_expression" => {
                let object = self.member_name(node.child_by_field_name("object")?)?;
                let property = self.text(node.child_by_field_name("property")?)?;
                Some(format!("{}.{}", object, property))
            }
            _ => None,
        }
    }

    /// Header text: everything before the nested scope, or the first line.
    fn signature(&self, node: Node, scope: Option<Node>) -> Option<String> {
        let end = match scope {
            Some(scope) if scope.start_byte() > node.start_byte() => scope.start_byte(),
            _ => node.end_byte(),
        };
        let text = self.source.get(node.start_byte()..end)?;
        let header = if end == node.end_byte() {
            text.lines().next().unwrap_or_default()
        } else {
            text
        };

        let header = header.split_whitespace().collect::<Vec<_>>().join(" ");
        if header.is_empty() {
            None
        } else {
            Some(header)
        }
    }

    fn text(&self, node: Node) -> Option<&'s str> {
        self.source.get(node.start_byte()..node.end_byte())
    }
}

fn first_named(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let first = node.named_children(&mut cursor).next();
    first
}

fn location(node: &Node) -> Location {
    let start = node.start_position();
    let end = node.end_position();
    Location::new(
        Position::new(start.row + 1, start.column),
        Position::new(end.row + 1, end.column),
    )
}

/// Position of the first error or missing node, depth first.
fn first_error(node: Node) -> Option<Position> {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        return Some(Position::new(pos.row + 1, pos.column));
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
