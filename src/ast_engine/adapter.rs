//! The parser capability the enhancer is generic over.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ParseError;
use crate::types::{Backend, EnhancerSettings, SyntaxNode};

use super::estree::EstreeParser;
use super::parser::TreeSitterParser;

/// Parses one file into a normalized syntax tree.
///
/// Implementations must populate `location` on every node and keep each
/// `body` sorted by start position. The enhancer never inspects which
/// backend produced a tree.
#[async_trait]
pub trait ParserAdapter: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &'static str;

    /// Parse the file at `path` and return its root node.
    async fn parse(&self, path: &Path) -> Result<SyntaxNode, ParseError>;
}

/// Build the backend selected in `settings`.
pub fn parser_for(settings: &EnhancerSettings) -> Arc<dyn ParserAdapter> {
    match settings.backend {
        Backend::TreeSitter => Arc::new(TreeSitterParser::new().strict(settings.strict)),
        Backend::Estree => Arc::new(EstreeParser::with_suffix(&settings.estree_suffix)),
    }
}
