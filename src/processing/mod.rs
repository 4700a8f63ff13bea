//! Record preprocessing.
//!
//! This module provides:
//! - Language detection from file extensions
//! - Record filtering (which records get parsed, which pass through)

pub mod filter;
pub mod language;

pub use filter::{ExtensionFilter, FilterConfig, RecordFilter};
pub use language::Language;
