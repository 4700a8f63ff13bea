//! Per-run parse memoization.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::debug;

use crate::ast_engine::ParserAdapter;
use crate::error::ParseError;
use crate::types::SyntaxNode;

type ParseResult = Result<Arc<SyntaxNode>, ParseError>;
type SharedParse = Shared<BoxFuture<'static, ParseResult>>;

/// Parses each path at most once for the lifetime of one enhancer run.
///
/// The first request for a path starts the parse; later requests await the
/// same in-flight future, successes and failures alike. Dropped with the run,
/// so trees never outlive the files they were parsed from.
pub struct ParseCache {
    parser: Arc<dyn ParserAdapter>,
    entries: Mutex<HashMap<PathBuf, SharedParse>>,
}

impl ParseCache {
    pub fn new(parser: Arc<dyn ParserAdapter>) -> Self {
        Self {
            parser,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The tree for `path`, parsing it on first request.
    pub async fn get(&self, path: &Path) -> ParseResult {
        let parse = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(path.to_path_buf())
                .or_insert_with(|| self.start(path))
                .clone()
        };
        parse.await
    }

    /// Number of distinct paths requested so far.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    fn start(&self, path: &Path) -> SharedParse {
        debug!(path = %path.display(), backend = self.parser.name(), "Parsing file");
        let parser = Arc::clone(&self.parser);
        let path = path.to_path_buf();
        async move { parser.parse(&path).await.map(Arc::new) }
            .boxed()
            .shared()
    }
}
