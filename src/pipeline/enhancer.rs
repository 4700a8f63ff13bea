//! The enhancement pipeline.
//!
//! Partitions records into parse-eligible and passthrough, parses each file
//! once, attaches the matched declaration to every record of that file and
//! applies the discard policy.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use super::cache::ParseCache;
use crate::ast_engine::{match_node, parser_for, ParserAdapter};
use crate::error::{EnhanceError, ParseError, Result};
use crate::processing::{ExtensionFilter, FilterConfig, RecordFilter};
use crate::types::{DocumentationRecord, EnhancerSettings, SyntaxNode};
use crate::DEFAULT_CONCURRENCY;

/// Summary of a bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnhanceReport {
    pub total_records: usize,
    pub passthrough: usize,
    pub parsed_files: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub failed_records: usize,
    pub failed_files: Vec<ParseError>,
}

/// Records of one file after matching.
struct FileOutcome {
    records: Vec<DocumentationRecord>,
    failure: Option<ParseError>,
}

/// Attaches syntax nodes to documentation records.
///
/// Cheap to clone; clones share the parser and filter.
#[derive(Clone)]
pub struct Enhancer {
    pub(super) parser: Arc<dyn ParserAdapter>,
    filter: Arc<dyn RecordFilter>,
    pub(super) discard: bool,
    pub(super) errors: bool,
    concurrency: usize,
}

impl std::fmt::Debug for Enhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enhancer")
            .field("parser", &self.parser.name())
            .field("discard", &self.discard)
            .field("errors", &self.errors)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl Enhancer {
    pub fn builder() -> EnhancerBuilder {
        EnhancerBuilder::default()
    }

    /// Build an enhancer from loaded settings.
    pub fn from_settings(settings: &EnhancerSettings) -> Result<Self> {
        settings.validate()?;
        Self::builder()
            .parser_arc(parser_for(settings))
            .filter(ExtensionFilter::new(FilterConfig::with_extensions(
                &settings.extensions,
            )))
            .discard(settings.discard)
            .errors(settings.errors)
            .concurrency(settings.concurrency)
            .build()
    }

    /// Enhance a batch of records.
    ///
    /// The output order is unspecified: records are regrouped by file and
    /// files complete in any order.
    pub async fn enhance(&self, records: Vec<DocumentationRecord>) -> Result<Vec<DocumentationRecord>> {
        self.enhance_with_report(records).await.map(|(records, _)| records)
    }

    /// Enhance a batch of records and report what happened.
    pub async fn enhance_with_report(
        &self,
        records: Vec<DocumentationRecord>,
    ) -> Result<(Vec<DocumentationRecord>, EnhanceReport)> {
        let total_records = records.len();
        let (to_parse, passthrough): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|record| self.filter.should_parse(record));

        let mut by_file: HashMap<PathBuf, Vec<DocumentationRecord>> = HashMap::new();
        for record in to_parse {
            by_file.entry(record.path.clone()).or_default().push(record);
        }

        info!(
            total_records,
            passthrough = passthrough.len(),
            files = by_file.len(),
            backend = self.parser.name(),
            "Starting enhancement"
        );

        let cache = ParseCache::new(Arc::clone(&self.parser));
        let outcomes: Vec<FileOutcome> = stream::iter(by_file)
            .map(|(path, records)| self.enhance_file(&cache, path, records))
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        let mut report = EnhanceReport {
            total_records,
            passthrough: passthrough.len(),
            ..Default::default()
        };
        let mut output = Vec::with_capacity(total_records);

        for outcome in outcomes {
            match outcome.failure {
                Some(error) => {
                    report.failed_records += outcome.records.len();
                    report.failed_files.push(error);
                }
                None => report.parsed_files += 1,
            }

            for record in outcome.records {
                if record.is_matched() {
                    report.matched += 1;
                } else if !record.is_failed() {
                    report.unmatched += 1;
                }
                if self.keep(&record) {
                    output.push(record);
                }
            }
        }

        if !self.discard {
            output.extend(passthrough);
        }

        info!(
            matched = report.matched,
            unmatched = report.unmatched,
            failed_files = report.failed_files.len(),
            output = output.len(),
            "Enhancement complete"
        );

        Ok((output, report))
    }

    /// Parse one file and match all of its records.
    async fn enhance_file(
        &self,
        cache: &ParseCache,
        path: PathBuf,
        mut records: Vec<DocumentationRecord>,
    ) -> Result<FileOutcome> {
        match cache.get(&path).await {
            Ok(tree) => {
                for record in &mut records {
                    attach_match(&tree, record);
                }
                debug!(
                    path = %path.display(),
                    records = records.len(),
                    matched = records.iter().filter(|r| r.is_matched()).count(),
                    "Matched file records"
                );
                Ok(FileOutcome {
                    records,
                    failure: None,
                })
            }
            Err(error) => {
                let error = self.mark_failure(error, &mut records)?;
                Ok(FileOutcome {
                    records,
                    failure: Some(error),
                })
            }
        }
    }

    /// Apply the parse-failure policy: fail the run, or mark each record.
    pub(super) fn mark_failure(
        &self,
        error: ParseError,
        records: &mut [DocumentationRecord],
    ) -> Result<ParseError> {
        if !self.errors {
            return Err(EnhanceError::Parse(error));
        }

        warn!(
            path = %error.path.display(),
            records = records.len(),
            error = %error.message,
            "Failed to parse file, marking records"
        );
        for record in records.iter_mut() {
            record.error = Some(error.to_string());
        }
        Ok(error)
    }

    pub(super) fn should_parse(&self, record: &DocumentationRecord) -> bool {
        self.filter.should_parse(record)
    }

    /// Whether an eligible record survives the discard policy. Records
    /// marked with a parse error are never discarded.
    pub(super) fn keep(&self, record: &DocumentationRecord) -> bool {
        !self.discard || record.is_matched() || record.is_failed()
    }
}

/// Attach the declaration starting on the record's context line, if any.
pub(super) fn attach_match(tree: &SyntaxNode, record: &mut DocumentationRecord) -> bool {
    match match_node(tree, record.context_line) {
        Some(node) => record.attach_node(Arc::clone(node)),
        None => false,
    }
}

/// Builder for [`Enhancer`]. A parser is required.
pub struct EnhancerBuilder {
    parser: Option<Arc<dyn ParserAdapter>>,
    filter: Option<Arc<dyn RecordFilter>>,
    discard: bool,
    errors: bool,
    concurrency: usize,
}

impl Default for EnhancerBuilder {
    fn default() -> Self {
        Self {
            parser: None,
            filter: None,
            discard: false,
            errors: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl EnhancerBuilder {
    /// Set the parser backend.
    pub fn parser(self, parser: impl ParserAdapter + 'static) -> Self {
        self.parser_arc(Arc::new(parser))
    }

    /// Set a shared parser backend.
    pub fn parser_arc(mut self, parser: Arc<dyn ParserAdapter>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Set the parse-eligibility predicate. Defaults to [`ExtensionFilter`].
    pub fn filter(mut self, filter: impl RecordFilter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Drop passthrough and unmatched records from the output.
    ///
    /// Records marked with a parse error are kept.
    pub fn discard(mut self, discard: bool) -> Self {
        self.discard = discard;
        self
    }

    /// Mark parse failures on records instead of failing the run.
    pub fn errors(mut self, errors: bool) -> Self {
        self.errors = errors;
        self
    }

    /// Maximum files parsed concurrently in bulk mode.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn build(self) -> Result<Enhancer> {
        let parser = self
            .parser
            .ok_or_else(|| EnhanceError::Configuration("a parser is required".to_string()))?;
        if self.concurrency == 0 {
            return Err(EnhanceError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }

        Ok(Enhancer {
            parser,
            filter: self
                .filter
                .unwrap_or_else(|| Arc::new(ExtensionFilter::with_defaults())),
            discard: self.discard,
            errors: self.errors,
            concurrency: self.concurrency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::StaticParser;
    use crate::types::Location;
    use serde_json::json;

    fn node(kind: &str, start: usize, end: usize) -> SyntaxNode {
        SyntaxNode::new(kind, Location::lines(start, end))
    }

    /// `[FunctionDeclA (1-4) { Inner (3) }, FunctionDeclB (5-8)]`
    fn tree() -> SyntaxNode {
        node("Program", 1, 8).with_body(vec![
            node("FunctionDeclA", 1, 4).with_body(vec![node("Inner", 3, 3)]),
            node("FunctionDeclB", 5, 8),
        ])
    }

    fn record(path: &str, line: usize) -> DocumentationRecord {
        DocumentationRecord::new(path, line).with_context(json!({ "comment": "doc" }))
    }

    fn parser() -> Arc<StaticParser> {
        Arc::new(StaticParser::new().with_tree("a.js", tree()).with_tree("b.js", tree()))
    }

    fn find(records: &[DocumentationRecord], path: &str, line: usize) -> DocumentationRecord {
        records
            .iter()
            .find(|r| r.path == PathBuf::from(path) && r.context_line == line)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_missing_parser_is_configuration_error() {
        let result = Enhancer::builder().discard(true).build();
        assert!(matches!(result, Err(EnhanceError::Configuration(_))));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = Enhancer::builder()
            .parser(StaticParser::new())
            .concurrency(0)
            .build();
        assert!(matches!(result, Err(EnhanceError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_enhance_matches_records() {
        let enhancer = Enhancer::builder().parser_arc(parser()).build().unwrap();
        let records = vec![record("a.js", 5), record("a.js", 3), record("a.js", 2)];

        let output = enhancer.enhance(records).await.unwrap();
        assert_eq!(output.len(), 3);

        assert_eq!(find(&output, "a.js", 5).node().unwrap().kind, "FunctionDeclB");
        assert_eq!(find(&output, "a.js", 3).node().unwrap().kind, "Inner");
        assert!(find(&output, "a.js", 2).node().is_none());
    }

    #[tokio::test]
    async fn test_parses_each_path_once() {
        let parser = parser();
        let enhancer = Enhancer::builder().parser_arc(parser.clone()).build().unwrap();
        let records = (1..=6)
            .map(|line| record("a.js", line))
            .chain((1..=3).map(|line| record("b.js", line)))
            .collect();

        enhancer.enhance(records).await.unwrap();
        assert_eq!(parser.calls(), 2);
    }

    #[tokio::test]
    async fn test_passthrough_records() {
        let parser = parser();
        let enhancer = Enhancer::builder().parser_arc(parser.clone()).build().unwrap();
        let records = vec![
            record("a.js", 5),
            record("notes.md", 5),
            DocumentationRecord::new("a.js", 1),
        ];

        let (output, report) = enhancer.enhance_with_report(records).await.unwrap();

        assert_eq!(output.len(), 3);
        assert_eq!(report.passthrough, 2);
        assert_eq!(report.matched, 1);
        assert!(find(&output, "notes.md", 5).node().is_none());
        assert_eq!(parser.calls(), 1);
    }

    #[tokio::test]
    async fn test_discard_keeps_only_matched() {
        let inputs = || {
            vec![
                record("a.js", 5),
                record("a.js", 2),
                record("b.js", 1),
                record("notes.md", 1),
            ]
        };

        let keep_all = Enhancer::builder().parser_arc(parser()).build().unwrap();
        let discard = Enhancer::builder()
            .parser_arc(parser())
            .discard(true)
            .build()
            .unwrap();

        let all = keep_all.enhance(inputs()).await.unwrap();
        let matched = discard.enhance(inputs()).await.unwrap();

        assert_eq!(all.len(), 4);
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|r| r.is_matched()));
        for r in &matched {
            let same = find(&all, r.path.to_str().unwrap(), r.context_line);
            assert_eq!(same.node(), r.node());
        }
    }

    #[tokio::test]
    async fn test_parse_failure_fails_run_by_default() {
        let enhancer = Enhancer::builder().parser_arc(parser()).build().unwrap();
        let records = vec![record("a.js", 5), record("broken.js", 1)];

        let err = enhancer.enhance(records).await.unwrap_err();
        match err {
            EnhanceError::Parse(e) => assert_eq!(e.path, PathBuf::from("broken.js")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_parse_failure_marks_records() {
        let enhancer = Enhancer::builder()
            .parser_arc(parser())
            .errors(true)
            .build()
            .unwrap();
        let records = vec![record("a.js", 5), record("broken.js", 1), record("broken.js", 2)];

        let (output, report) = enhancer.enhance_with_report(records).await.unwrap();

        assert_eq!(output.len(), 3);
        assert!(find(&output, "a.js", 5).is_matched());
        let failed = find(&output, "broken.js", 2);
        assert!(failed.error.as_deref().unwrap().contains("no such tree"));
        assert_eq!(report.failed_records, 2);
        assert_eq!(report.failed_files.len(), 1);
        assert_eq!(report.parsed_files, 1);
    }

    #[tokio::test]
    async fn test_discard_keeps_marked_failures() {
        let enhancer = Enhancer::builder()
            .parser_arc(parser())
            .discard(true)
            .errors(true)
            .build()
            .unwrap();
        let records = vec![record("a.js", 5), record("a.js", 2), record("broken.js", 1)];

        let (output, report) = enhancer.enhance_with_report(records).await.unwrap();

        assert_eq!(output.len(), 2);
        assert!(find(&output, "a.js", 5).is_matched());
        assert!(find(&output, "broken.js", 1).is_failed());
        assert_eq!(report.failed_records, 1);
    }

    #[tokio::test]
    async fn test_output_grouped_by_file() {
        let enhancer = Enhancer::builder().parser_arc(parser()).build().unwrap();
        let records = vec![
            record("a.js", 5),
            record("notes.md", 1),
            record("b.js", 5),
            record("a.js", 3),
            record("notes.md", 2),
            record("b.js", 1),
        ];
        let key = |r: &DocumentationRecord| (r.path.clone(), r.context_line);
        let mut expected: Vec<_> = records.iter().map(key).collect();

        let output = enhancer.enhance(records).await.unwrap();

        // Same records, in some order
        let mut actual: Vec<_> = output.iter().map(key).collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);

        // Passthrough records come last, in input order
        let tail: Vec<_> = output[4..].iter().map(key).collect();
        assert_eq!(
            tail,
            vec![(PathBuf::from("notes.md"), 1), (PathBuf::from("notes.md"), 2)]
        );

        // Each file's records are contiguous and keep their relative order
        let mut groups: Vec<(PathBuf, Vec<usize>)> = Vec::new();
        for r in &output[..4] {
            match groups.last_mut() {
                Some((path, lines)) if *path == r.path => lines.push(r.context_line),
                _ => groups.push((r.path.clone(), vec![r.context_line])),
            }
        }
        groups.sort();
        assert_eq!(
            groups,
            vec![
                (PathBuf::from("a.js"), vec![5, 3]),
                (PathBuf::from("b.js"), vec![5, 1]),
            ]
        );
    }

    #[tokio::test]
    async fn test_repeated_runs_agree() {
        let enhancer = Enhancer::builder().parser_arc(parser()).build().unwrap();
        let inputs = || vec![record("a.js", 1), record("a.js", 3), record("b.js", 5)];

        let first = enhancer.enhance(inputs()).await.unwrap();
        let second = enhancer.enhance(inputs()).await.unwrap();

        for r in &first {
            let other = find(&second, r.path.to_str().unwrap(), r.context_line);
            assert_eq!(r.node().map(|n| n.summary()), other.node().map(|n| n.summary()));
        }
    }

    #[tokio::test]
    async fn test_custom_filter() {
        let enhancer = Enhancer::builder()
            .parser_arc(parser())
            .filter(|r: &DocumentationRecord| r.context_line > 4)
            .build()
            .unwrap();
        let records = vec![DocumentationRecord::new("a.js", 5), DocumentationRecord::new("a.js", 1)];

        let output = enhancer.enhance(records).await.unwrap();
        assert!(find(&output, "a.js", 5).is_matched());
        assert!(!find(&output, "a.js", 1).is_matched());
    }
}
