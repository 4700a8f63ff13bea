//! AST engine: parser backends and declaration matching.
//!
//! This module provides:
//! - The `ParserAdapter` capability every backend implements
//! - A tree-sitter backend for the bundled grammars
//! - An ESTree JSON backend for trees produced by JavaScript parsers
//! - The line-based matcher locating a documented declaration

pub mod adapter;
pub mod estree;
pub mod languages;
pub mod matcher;
pub mod parser;

pub use adapter::{parser_for, ParserAdapter};
pub use estree::EstreeParser;
pub use matcher::match_node;
pub use parser::TreeSitterParser;
