//! Block-structured gzip for random access into compressed FASTQ
//!
//! A NanoBgzip file is a sequence of complete gzip members ("blocks"), each
//! holding a fixed number of textual FASTQ records. Every block carries its
//! own total length inside the gzip extra field, so a reader can jump to any
//! block boundary and inflate it without touching the rest of the file. The
//! whole file still decodes with any multi-member gzip reader.
//!
//! Compression emits a sidecar index in the same pass (see [`NbgzIndex`]),
//! mapping every read name to its block and its byte range inside that
//! block's uncompressed payload. Pulling one read out of a multi-gigabyte
//! file then costs one block inflate, and usually less: the block is only
//! inflated up to the end of the wanted record.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;

mod header;
mod index;
mod reader;
mod writer;

pub use header::BlockHeader;
pub use index::{NbgzIndex, RecordEntry};
pub use reader::BlockReader;
pub use writer::{compress_path, NanoBgzipWriter, NanoBgzipWriterBuilder};

pub(crate) use index::{index_is_fresh, index_path_for};

/// Default number of FASTQ records per compressed block
pub const DEFAULT_READS_PER_BLOCK: usize = 10;

/// The gzip flavor of a compressed file, judged from its first member header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GzipFormat {
    /// An ordinary gzip stream with no recognized extra subfield
    Gzip,
    /// A BGZF file as written by htslib-family tools
    BGzip,
    /// A NanoBgzip file written by this crate
    NanoBGzip,
}

impl fmt::Display for GzipFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gzip => write!(f, "gzip"),
            Self::BGzip => write!(f, "bgzip"),
            Self::NanoBGzip => write!(f, "nanobgzip"),
        }
    }
}

/// Classifies a compressed file by reading its first member header
///
/// # Errors
/// Returns a [`crate::error::FormatError`] if the file is empty or does not
/// start with a gzip member, and I/O errors from opening the file.
pub fn classify_path<P: AsRef<Path>>(path: P) -> Result<GzipFormat> {
    let mut file = File::open(path)?;
    classify(&mut file)
}

/// Classifies a compressed stream by its leading gzip header
///
/// Consumes only the header bytes needed for the decision.
///
/// # Errors
/// Returns a [`crate::error::FormatError`] if the stream does not start with
/// a gzip member.
pub fn classify<R: Read>(reader: &mut R) -> Result<GzipFormat> {
    let (format, _) = header::read_format(reader)?;
    Ok(format)
}
