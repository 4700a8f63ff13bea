//! Streaming enhancement.
//!
//! Records are enhanced one at a time in arrival order. The next input is
//! only pulled once the current record has been emitted or dropped, so a slow
//! consumer slows the producer down.

use std::sync::Arc;

use futures::future;
use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::cache::ParseCache;
use super::enhancer::{attach_match, Enhancer};
use crate::error::Result;
use crate::types::DocumentationRecord;

impl Enhancer {
    /// Enhance a stream of records, preserving order.
    ///
    /// Each input yields at most one output: the enhanced or passthrough
    /// record, nothing when the discard policy drops it, or an `Err` when its
    /// file failed to parse and errors are not marked. Records marked with a
    /// parse error are always emitted, even under discard. The stream keeps going
    /// after an error; the parse cache lives as long as the stream.
    pub fn transform<S>(&self, input: S) -> BoxStream<'static, Result<DocumentationRecord>>
    where
        S: Stream<Item = DocumentationRecord> + Send + 'static,
    {
        let enhancer = self.clone();
        let cache = Arc::new(ParseCache::new(Arc::clone(&self.parser)));

        input
            .then(move |record| {
                let enhancer = enhancer.clone();
                let cache = Arc::clone(&cache);
                async move { enhancer.enhance_one(&cache, record).await }
            })
            .filter_map(|outcome| future::ready(outcome.transpose()))
            .boxed()
    }

    /// Drive records from `input` to `output` until either side closes.
    ///
    /// Returns the number of items sent.
    pub async fn pipe(
        &self,
        mut input: mpsc::Receiver<DocumentationRecord>,
        output: mpsc::Sender<Result<DocumentationRecord>>,
    ) -> usize {
        let cache = ParseCache::new(Arc::clone(&self.parser));
        let mut sent = 0;

        while let Some(record) = input.recv().await {
            let Some(item) = self.enhance_one(&cache, record).await.transpose() else {
                continue;
            };
            if output.send(item).await.is_err() {
                warn!("Receiver dropped, stopping enhancement");
                break;
            }
            sent += 1;
        }

        let files = cache.len().await;
        debug!(sent, files, "Stream finished");
        sent
    }

    /// Enhance one record; `Ok(None)` means the record was discarded.
    async fn enhance_one(
        &self,
        cache: &ParseCache,
        mut record: DocumentationRecord,
    ) -> Result<Option<DocumentationRecord>> {
        if !self.should_parse(&record) {
            return Ok((!self.discard).then_some(record));
        }

        match cache.get(&record.path).await {
            Ok(tree) => {
                attach_match(&tree, &mut record);
            }
            Err(error) => {
                self.mark_failure(error, std::slice::from_mut(&mut record))?;
            }
        }

        Ok(self.keep(&record).then_some(record))
    }
}
