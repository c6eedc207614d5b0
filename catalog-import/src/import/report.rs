//! Run counters and console output
//!
//! Every outcome is counted exactly once and echoed as one line with its
//! row or batch index. The summary printed at the end is built from the
//! same counters.

use colored::*;

use super::mapper::{ProductPatch, SkipReason};
use crate::api::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Realtime,
    Firestore,
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pipeline::Realtime => write!(f, "Realtime Database"),
            Pipeline::Firestore => write!(f, "Firestore"),
        }
    }
}

/// Final counts of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Data rows read from the sheet
    pub total_rows: usize,
    /// Rows missing an identifying field
    pub skipped: usize,
    /// Records durably written
    pub succeeded: usize,
    /// Records whose write (or batch) failed
    pub failed: usize,
    /// Batches submitted (Firestore only)
    pub batches_total: usize,
    /// Batches rejected (Firestore only)
    pub batches_failed: usize,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn print(&self, pipeline: Pipeline) {
        println!();
        println!("{}", format!("===== SUMMARY ({}) =====", pipeline).bold());
        println!("Rows read: {}", self.total_rows);
        println!("Skipped:   {}", self.skipped.to_string().yellow());
        println!("Succeeded: {}", self.succeeded.to_string().green());
        if self.failed > 0 {
            println!("Failed:    {}", self.failed.to_string().red().bold());
        } else {
            println!("Failed:    {}", self.failed);
        }
        if pipeline == Pipeline::Firestore {
            println!(
                "Batches:   {} ({} failed)",
                self.batches_total, self.batches_failed
            );
        }
    }
}

/// Accumulates counters while a run is dispatching
#[derive(Debug)]
pub struct RunReport {
    summary: RunSummary,
}

impl RunReport {
    pub fn new(total_rows: usize) -> Self {
        Self {
            summary: RunSummary {
                total_rows,
                ..RunSummary::default()
            },
        }
    }

    pub fn row_skipped(&mut self, reason: &SkipReason) {
        self.summary.skipped += 1;
        log::debug!("row {} skipped: {}", reason.row_index, reason);
        println!(
            "({}) {} {}",
            reason.row_index,
            "[SKIPPED]".yellow(),
            reason
        );
    }

    pub fn patch_written(&mut self, patch: &ProductPatch) {
        self.summary.succeeded += 1;
        let barcode = if patch.barcode.is_empty() {
            "-"
        } else {
            patch.barcode.as_str()
        };
        println!(
            "({}) {} {} updated. EAN={}",
            patch.row_index,
            "OK".green(),
            patch.path(),
            barcode
        );
    }

    pub fn patch_failed(&mut self, patch: &ProductPatch, err: &StoreError) {
        self.summary.failed += 1;
        log::warn!("write to {} failed: {}", patch.path(), err);
        eprintln!(
            "({}) {} {}: {}",
            patch.row_index,
            "ERROR".red().bold(),
            patch.path(),
            err
        );
    }

    pub fn batch_committed(&mut self, index: usize, total: usize, records: usize) {
        self.summary.batches_total += 1;
        self.summary.succeeded += records;
        println!(
            "{} batch {}/{} committed ({} documents)",
            "OK".green(),
            index,
            total,
            records
        );
    }

    pub fn batch_failed(&mut self, index: usize, total: usize, records: usize, err: &StoreError) {
        self.summary.batches_total += 1;
        self.summary.batches_failed += 1;
        self.summary.failed += records;
        log::warn!("batch {} failed: {}", index, err);
        eprintln!(
            "{} batch {}/{} ({} documents): {}",
            "ERROR".red().bold(),
            index,
            total,
            records,
            err
        );
    }

    #[cfg(test)]
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn finish(self) -> RunSummary {
        self.summary
    }
}
