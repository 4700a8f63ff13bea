//! Documentation Enhancer Library
//!
//! Matches extracted documentation comments to the syntax-tree declarations
//! they describe. Each record names a file and the line its comment block
//! ends on; the enhancer parses the file once and attaches the declaration
//! starting on that line.

pub mod ast_engine;
pub mod error;
pub mod pipeline;
pub mod processing;
pub mod types;

pub use ast_engine::{match_node, EstreeParser, ParserAdapter, TreeSitterParser};
pub use error::{EnhanceError, ParseError, Result};
pub use pipeline::{EnhanceReport, Enhancer, EnhancerBuilder};
pub use processing::{ExtensionFilter, FilterConfig, RecordFilter};
pub use types::{DocumentationRecord, EnhancerSettings, Location, Position, SyntaxNode};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ast_engine::{match_node, ParserAdapter};
    pub use crate::error::{EnhanceError, ParseError, Result};
    pub use crate::pipeline::*;
    pub use crate::processing::{ExtensionFilter, RecordFilter};
    pub use crate::types::*;
}

/// Extensions parsed by default
pub const DEFAULT_EXTENSIONS: &[&str] = &[".es6", ".js", ".jsx"];

/// Default number of files parsed concurrently in bulk mode
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default suffix locating an ESTree JSON tree next to its source file
pub const DEFAULT_ESTREE_SUFFIX: &str = ".ast.json";
