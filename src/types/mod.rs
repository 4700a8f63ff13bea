//! Core types for the enhancer.

mod config;
mod node;
mod record;

pub use config::{Backend, EnhancerSettings};
pub use node::{Location, NodeSummary, Position, SyntaxNode};
pub use record::DocumentationRecord;
