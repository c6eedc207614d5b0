//! Write dispatch
//!
//! Both dispatchers drain a [`WriteQueue`], awaiting each write before the
//! next one starts. A failed write or batch is reported and the run moves
//! on; nothing is retried.

use super::mapper::{ProductDocument, ProductPatch, RowOutcome};
use super::queue::WriteQueue;
use super::report::RunReport;
use crate::api::{DocumentStore, PathStore, WriteBatch};

/// Issue one partial update per valid row, reporting skipped rows in place
pub async fn dispatch_patches(
    outcomes: Vec<RowOutcome<ProductPatch>>,
    store: &dyn PathStore,
    report: &mut RunReport,
) {
    let mut queue = WriteQueue::new(outcomes);

    while let Some(job) = queue.next_job() {
        match job.item() {
            RowOutcome::Skipped(reason) => report.row_skipped(reason),
            RowOutcome::Valid(patch) => {
                let path = patch.path();
                match store.partial_update(&path, &patch.payload()).await {
                    Ok(()) => report.patch_written(patch),
                    Err(err) => report.patch_failed(patch, &err),
                }
            }
        }
    }
}

/// Split `items` into consecutive chunks of at most `size` (a size of 0 is treated as 1)
pub fn partition<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut items = items.into_iter();

    loop {
        let batch: Vec<T> = items.by_ref().take(size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }

    batches
}

/// Group documents into merge-upsert batches of `collection`
///
/// The batch size is capped at what the store accepts in one commit.
pub fn build_batches(
    documents: Vec<ProductDocument>,
    collection: &str,
    batch_size: usize,
    limit: usize,
) -> Vec<WriteBatch> {
    partition(documents, batch_size.min(limit))
        .into_iter()
        .map(|docs| {
            let mut batch = WriteBatch::new();
            for doc in &docs {
                batch.upsert(collection, doc.id.as_str(), doc.fields());
            }
            batch
        })
        .collect()
}

/// Commit the batches one after another
pub async fn dispatch_batches(
    batches: Vec<WriteBatch>,
    store: &dyn DocumentStore,
    report: &mut RunReport,
) {
    let mut queue = WriteQueue::new(batches);

    while let Some(job) = queue.next_job() {
        let batch = job.item();
        log::info!(
            "committing batch {}/{} ({} writes)",
            job.position(),
            job.total(),
            batch.len()
        );

        match store.commit(batch).await {
            Ok(()) => report.batch_committed(job.position(), job.total(), batch.len()),
            Err(err) => report.batch_failed(job.position(), job.total(), batch.len(), &err),
        }
    }
}
