use std::error::Error as StdError;
use std::path::PathBuf;

/// Custom Result type for nanofq operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the nanofq library, encompassing all possible error
/// cases that can occur while parsing, aligning, trimming, compressing, and
/// indexing nanopore reads.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Errors raised by the alignment engine
    #[error("Error during alignment: {0}")]
    AlignError(#[from] AlignError),

    /// Errors raised by FASTQ record parsing and validation
    #[error("Error parsing record: {0}")]
    RecordError(#[from] RecordError),

    /// Errors related to the NanoBgzip byte layout
    #[error("Error processing NanoBgzip data: {0}")]
    FormatError(#[from] FormatError),

    /// Errors related to user-supplied parameters
    #[error("Error in configuration: {0}")]
    ConfigError(#[from] ConfigError),

    /// Errors related to index files
    #[error("Error processing index: {0}")]
    IndexError(#[from] IndexError),

    /// Standard I/O errors
    #[error("Error with IO: {0}")]
    IoError(#[from] std::io::Error),

    /// UTF-8 conversion errors
    #[error("Error with UTF8: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// Conversion errors from anyhow errors
    #[error("Generic error: {0}")]
    AnyhowError(#[from] anyhow::Error),

    /// Generic errors for other unexpected situations
    #[error("Generic error: {0}")]
    GenericError(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    /// Checks if the error stems from user-supplied configuration
    ///
    /// Configuration errors are raised before any processing begins, so callers
    /// typically report them as usage errors rather than runtime failures.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::ConfigError(_))
    }

    /// Checks if the error indicates a structurally invalid FASTQ record
    #[must_use]
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, Self::RecordError(_))
    }
}

/// Errors raised when alignment inputs exceed the fixed matrix bounds
#[derive(thiserror::Error, Debug)]
pub enum AlignError {
    /// The target (read window) is longer than the matrix supports
    #[error("Target sequence too long: {len} (limit {max})")]
    TargetTooLong { len: usize, max: usize },

    /// The query (adapter/barcode/primer) is longer than the matrix supports
    #[error("Query sequence too long: {len} (limit {max})")]
    QueryTooLong { len: usize, max: usize },
}

/// Errors raised for structurally invalid FASTQ records
///
/// These are fatal for the whole run: a malformed record means the input file
/// cannot be trusted, so there is no per-record skip-and-continue.
#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    /// Sequence and quality lines have different lengths
    #[error("Sequence and quality length mismatch for read {id}: {seq_len} vs {qual_len}")]
    LengthMismatch {
        id: String,
        seq_len: usize,
        qual_len: usize,
    },

    /// A record with an empty sequence or quality line
    #[error("Empty sequence or quality for read {id}")]
    EmptyRecord { id: String },

    /// End of input reached in the middle of a 4-line record
    #[error("Truncated record at end of input for read {id}")]
    Truncated { id: String },

    /// The header line does not begin with '@'
    #[error("Record header does not start with '@': {line:?}")]
    InvalidHeader { line: String },

    /// The third line of the record does not begin with '+'
    #[error("Record separator does not start with '+' for read {id}")]
    InvalidSeparator { id: String },
}

/// Errors raised for unexpected byte layout in NanoBgzip headers and blocks
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    /// The first two bytes are not the gzip magic
    #[error("Invalid gzip magic: [{0:#04x}, {1:#04x}]")]
    InvalidMagic(u8, u8),

    /// The compression method byte is not deflate
    #[error("Invalid compression method: {0} - expecting 8 (deflate)")]
    InvalidMethod(u8),

    /// The flag byte does not carry the extra-field bit
    #[error("Missing FEXTRA flag in gzip header (flag byte: {0:#04x})")]
    MissingExtraField(u8),

    /// The extra field does not carry the NanoBgzip subfield
    #[error("Unexpected extra subfield: sid [{sid0:#04x}, {sid1:#04x}], length {sub_len}")]
    InvalidExtraField { sid0: u8, sid1: u8, sub_len: u16 },

    /// The declared block size does not match the requested block bounds
    #[error("Block size mismatch: header declares {declared}, index expects {expected}")]
    BlockSizeMismatch { declared: u32, expected: u64 },

    /// The declared block size is smaller than an empty member
    #[error("Block size too small to be a valid member: {0}")]
    BlockTooShort(u32),

    /// A block did not compress in a single deflate pass
    #[error("Could not compress block in one pass ({bytes} input bytes)")]
    CompressIncomplete { bytes: usize },

    /// Full-block inflate stopped before the end of the deflate stream
    #[error("Deflate stream did not terminate at block end ({produced} of {expected} bytes)")]
    MissingStreamEnd { produced: u64, expected: u64 },

    /// Partial-block inflate hit the end of the deflate stream too early
    #[error("Deflate stream ended before the requested prefix ({produced} of {requested} bytes)")]
    UnexpectedStreamEnd { produced: u64, requested: u64 },

    /// The inflated payload length does not match the stored ISIZE
    #[error("Uncompressed size mismatch: produced {produced}, trailer declares {declared}")]
    IsizeMismatch { produced: u64, declared: u32 },

    /// Indexing was requested on a file that is not NanoBgzip
    ///
    /// Plain and block-gzip files cannot be indexed; recompressing through the
    /// NanoBgzip writer produces a seekable file and its index in one pass.
    #[error("Cannot index a {found} file - recompress it as NanoBgzip first")]
    NotNanoBgzip { found: crate::nbgz::GzipFormat },

    /// The file ended before a complete gzip member could be read
    #[error("Unexpected end of file inside a block at offset {0}")]
    UnexpectedEof(u64),

    /// The file is empty
    #[error("File is empty")]
    EmptyFile,

    /// Errors from the deflate implementation while compressing
    #[error("Deflate error: {0}")]
    Deflate(#[from] flate2::CompressError),

    /// Errors from the deflate implementation while decompressing
    #[error("Inflate error: {0}")]
    Inflate(#[from] flate2::DecompressError),
}

/// Errors raised for out-of-range or unmatched user parameters
///
/// All of these fail fast, before any read is processed.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A length parameter falls outside its documented range
    #[error("{parameter} out of range: {value} - expecting [{min}, {max}]")]
    LengthOutOfRange {
        parameter: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    /// A coverage/identity parameter falls outside [0, 1]
    #[error("{parameter} out of range: {value} - expecting [0, 1]")]
    FractionOutOfRange { parameter: &'static str, value: f64 },

    /// A count parameter that must be at least one
    #[error("{parameter} must be at least 1")]
    ZeroCount { parameter: &'static str },

    /// The kit name does not match any catalog entry
    #[error("Unknown kit name: {name}")]
    UnknownKit { name: String },

    /// The barcode number does not exist for the kit
    #[error("Unknown barcode {barcode} for kit {kit} - expecting [1, {max}]")]
    UnknownBarcode {
        kit: String,
        barcode: usize,
        max: usize,
    },

    /// Compression input already carries a .gz suffix
    #[error("Input is already compressed: {}", path.display())]
    InputAlreadyCompressed { path: PathBuf },

    /// Compression output must carry a .gz suffix
    #[error("Output path must end with .gz: {}", path.display())]
    OutputMissingGzSuffix { path: PathBuf },
}

/// Errors raised while loading or querying index files
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// The index file does not exist
    #[error("Index file not found: {}", path.display())]
    Missing { path: PathBuf },

    /// The index file does not begin with its '#' header line
    #[error("Index file is missing its header line")]
    MissingHeader,

    /// An index line does not parse
    #[error("Malformed index line {line_number}: {line:?}")]
    MalformedLine { line_number: usize, line: String },

    /// An entry's byte range is impossible or runs past the data it describes
    #[error("Index entry for {name:?} out of bounds: [{start}, {end}], limit {limit}")]
    EntryOutOfBounds {
        name: String,
        start: u64,
        end: u64,
        limit: u64,
    },
}
