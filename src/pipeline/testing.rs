//! In-memory parser backend for pipeline tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::ast_engine::ParserAdapter;
use crate::error::ParseError;
use crate::types::SyntaxNode;

/// Serves fixed trees by path and counts parse calls.
#[derive(Default)]
pub struct StaticParser {
    trees: HashMap<PathBuf, SyntaxNode>,
    calls: AtomicUsize,
}

impl StaticParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(mut self, path: &str, tree: SyntaxNode) -> Self {
        self.trees.insert(PathBuf::from(path), tree);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParserAdapter for StaticParser {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn parse(&self, path: &Path) -> Result<SyntaxNode, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.trees
            .get(path)
            .cloned()
            .ok_or_else(|| ParseError::new(path, "no such tree"))
    }
}
