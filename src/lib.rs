//! Nanopore FASTQ processing: streaming, trimming, and seekable compression
//!
//! The crate combines a block-structured gzip container with random access by
//! read name ([`nbgz`]), a local alignment engine driving adapter and barcode
//! removal ([`align`], [`adapters`], [`trim`]), and a bounded-memory parallel
//! pipeline over chunked FASTQ input ([`fastq`], [`parallel`]). All argument
//! validation and reporting surfaces live in the consuming tool; this library
//! only returns typed values and errors.
pub mod adapters;
pub mod align;
pub mod error;
pub mod fastq;
pub mod nbgz;
pub mod parallel;
pub mod record;
pub mod stats;
pub mod trim;

pub use adapters::{AdapterCatalog, Anchor, SequenceInfo, TrimDirections, TrimOverrides};
pub use align::{AlignmentConfig, AlignmentResult, Scoring};
pub use error::{Error, Result};
pub use fastq::{find_reads, FastqIndex, FastqReader, FindSummary};
pub use nbgz::{classify_path, compress_path, BlockReader, GzipFormat, NbgzIndex};
pub use parallel::{ParallelProcessor, ParallelReader, SyncWriter};
pub use record::{FilterOptions, Record};
pub use stats::{ReadStat, StatsProcessor, StatsSummary};
