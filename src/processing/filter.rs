//! Record filtering.
//!
//! Decides which documentation records are eligible for parsing. Records that
//! are rejected pass through the enhancer untouched.

use std::collections::HashSet;

use crate::types::DocumentationRecord;
use crate::DEFAULT_EXTENSIONS;

/// Predicate selecting the records to parse.
pub trait RecordFilter: Send + Sync {
    /// Whether the record's file should be parsed and matched.
    fn should_parse(&self, record: &DocumentationRecord) -> bool;
}

impl<F> RecordFilter for F
where
    F: Fn(&DocumentationRecord) -> bool + Send + Sync,
{
    fn should_parse(&self, record: &DocumentationRecord) -> bool {
        self(record)
    }
}

/// Configuration for the extension filter.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Allowed file extensions, lowercase with a leading dot (e.g. ".js").
    pub extensions: HashSet<String>,
    /// Whether records without a comment payload are rejected.
    pub require_context: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            require_context: true,
        }
    }
}

impl FilterConfig {
    /// Allow the given extensions instead of the defaults.
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().to_lowercase())
                .collect(),
            ..Default::default()
        }
    }
}

/// Default filter: allow-listed extension and a non-null context.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    config: FilterConfig,
}

impl ExtensionFilter {
    /// Create a new filter with the given configuration.
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Create a filter with default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }
}

impl RecordFilter for ExtensionFilter {
    fn should_parse(&self, record: &DocumentationRecord) -> bool {
        if self.config.require_context && record.context.as_ref().map_or(true, |c| c.is_null()) {
            return false;
        }

        record
            .extension()
            .map_or(false, |ext| self.config.extensions.contains(&ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(path: &str) -> DocumentationRecord {
        DocumentationRecord::new(path, 1).with_context(json!({ "text": "doc" }))
    }

    #[test]
    fn test_allowed_extensions() {
        let filter = ExtensionFilter::with_defaults();

        assert!(filter.should_parse(&record("lib/a.js")));
        assert!(filter.should_parse(&record("lib/a.es6")));
        assert!(filter.should_parse(&record("lib/View.JSX")));
    }

    #[test]
    fn test_rejected_extensions() {
        let filter = ExtensionFilter::with_defaults();

        assert!(!filter.should_parse(&record("lib/a.ts")));
        assert!(!filter.should_parse(&record("README.md")));
        assert!(!filter.should_parse(&record("Makefile")));
    }

    #[test]
    fn test_requires_context() {
        let filter = ExtensionFilter::with_defaults();

        assert!(!filter.should_parse(&DocumentationRecord::new("a.js", 1)));
        assert!(!filter.should_parse(&DocumentationRecord::new("a.js", 1).with_context(json!(null))));
    }

    #[test]
    fn test_custom_extensions() {
        let filter = ExtensionFilter::new(FilterConfig::with_extensions([".PY", ".rs"]));

        assert!(filter.should_parse(&record("main.py")));
        assert!(filter.should_parse(&record("lib.rs")));
        assert!(!filter.should_parse(&record("a.js")));
    }

    #[test]
    fn test_closure_filter() {
        let filter = |r: &DocumentationRecord| r.context_line > 10;

        assert!(filter.should_parse(&DocumentationRecord::new("a.js", 11)));
        assert!(!RecordFilter::should_parse(&filter, &DocumentationRecord::new("a.js", 3)));
    }
}
