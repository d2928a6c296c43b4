//! Per-read metrics accumulation and run-level summary statistics
//!
//! Workers push one [`ReadStat`] per record into a shared accumulator; the
//! tuples are keyed by read id, so accumulation order across workers does
//! not matter. [`StatsSummary`] condenses the accumulated tuples into the
//! usual run metrics, with the N-thresholds computed over total bases.
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::parallel::ParallelProcessor;
use crate::record::Record;

/// The per-read tuple handed to the plotting/report collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct ReadStat {
    pub id: String,
    pub length: usize,
    /// Phred-scaled mean quality of the read
    pub quality: f64,
    /// GC fraction of the read
    pub gc: f64,
}

impl ReadStat {
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id().to_string(),
            length: record.len(),
            quality: record.mean_quality(),
            gc: record.gc_content(),
        }
    }
}

/// A [`ParallelProcessor`] that accumulates one [`ReadStat`] per record
///
/// Clones share the accumulator, so a pipeline run leaves every worker's
/// contribution in one vector. Tuple order follows completion order, not
/// file order.
#[derive(Clone, Default)]
pub struct StatsProcessor {
    stats: Arc<Mutex<Vec<ReadStat>>>,
}

impl StatsProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recovers the accumulated tuples once every clone has been dropped
    #[must_use]
    pub fn into_stats(self) -> Option<Vec<ReadStat>> {
        Arc::try_unwrap(self.stats).ok().map(Mutex::into_inner)
    }

    /// Summarizes what has been accumulated so far
    #[must_use]
    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from_stats(&self.stats.lock())
    }
}

impl ParallelProcessor for StatsProcessor {
    fn process_record(&mut self, record: &mut Record) -> Result<()> {
        let stat = ReadStat::from_record(record);
        self.stats.lock().push(stat);
        Ok(())
    }
}

/// Run-level summary over a set of per-read tuples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub num_reads: usize,
    pub num_bases: u64,
    pub min_length: usize,
    pub max_length: usize,
    pub mean_length: f64,
    /// Length such that reads at least this long hold 10% of all bases
    pub n10: usize,
    /// Length such that reads at least this long hold 50% of all bases
    pub n50: usize,
    /// Length such that reads at least this long hold 90% of all bases
    pub n90: usize,
    pub mean_quality: f64,
    pub mean_gc: f64,
}

impl StatsSummary {
    /// Condenses per-read tuples into run metrics
    ///
    /// An empty input yields the all-zero summary.
    #[must_use]
    pub fn from_stats(stats: &[ReadStat]) -> Self {
        if stats.is_empty() {
            return Self::default();
        }
        let num_reads = stats.len();
        let num_bases: u64 = stats.iter().map(|s| s.length as u64).sum();

        let mut lengths: Vec<usize> = stats.iter().map(|s| s.length).collect();
        lengths.sort_unstable_by(|a, b| b.cmp(a));

        Self {
            num_reads,
            num_bases,
            min_length: lengths[lengths.len() - 1],
            max_length: lengths[0],
            mean_length: num_bases as f64 / num_reads as f64,
            n10: n_threshold(&lengths, num_bases, 0.1),
            n50: n_threshold(&lengths, num_bases, 0.5),
            n90: n_threshold(&lengths, num_bases, 0.9),
            mean_quality: stats.iter().map(|s| s.quality).sum::<f64>() / num_reads as f64,
            mean_gc: stats.iter().map(|s| s.gc).sum::<f64>() / num_reads as f64,
        }
    }
}

/// First length (descending) at which cumulative bases reach `fraction` of the total
fn n_threshold(descending: &[usize], total: u64, fraction: f64) -> usize {
    let target = total as f64 * fraction;
    let mut cumulative = 0u64;
    for &len in descending {
        cumulative += len as u64;
        if cumulative as f64 >= target {
            return len;
        }
    }
    0
}
