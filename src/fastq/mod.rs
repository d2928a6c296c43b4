//! FASTQ input: streaming, indexing, and read extraction
//!
//! [`FastqReader`] streams records out of plain or gzipped files in bounded
//! chunks. Two index flavors give random access by read name: [`FastqIndex`]
//! maps name prefixes to byte ranges of a plain file, and
//! [`crate::nbgz::NbgzIndex`] maps full names into NanoBgzip blocks. The
//! [`find_reads`] entry point picks the right path for the file at hand and
//! falls back to a sequential scan when no index applies.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{FormatError, IndexError, Result};
use crate::nbgz::{classify_path, index_is_fresh, index_path_for, BlockReader, GzipFormat, NbgzIndex};
use crate::record::Record;

mod index;
mod reader;

pub use index::{FastqIndex, KEY_LEN_RANGE};
pub use reader::{FastqReader, DEFAULT_CHUNK_SIZE};

/// The outcome of a read extraction: what was found and what was not
///
/// Absent names are data, not failures; a lookup that finds nothing still
/// succeeds, and the caller decides how loudly to report the misses.
#[derive(Debug, Default)]
pub struct FindSummary {
    /// Extracted records, in request order
    pub found: Vec<Record>,
    /// Names with no matching record, in request order
    pub missing: Vec<String>,
}

/// Either index flavor, matched to the file it describes
pub enum FileIndex {
    /// Prefix index over a plain-text FASTQ file
    Plain(FastqIndex),
    /// Block index over a NanoBgzip file
    Blocks(NbgzIndex),
}

/// Builds or refreshes the index appropriate for a FASTQ file
///
/// Plain files get a prefix index with the requested key length. Compressed
/// files must be NanoBgzip; their block index ignores `key_len` since it
/// stores full read names.
///
/// # Errors
/// Returns a [`FormatError`] for compressed files that are not NanoBgzip,
/// plus any build or load failure.
pub fn ensure_index<P: AsRef<Path>>(path: P, key_len: usize) -> Result<FileIndex> {
    let path = path.as_ref();
    if path.extension().is_some_and(|ext| ext == "gz") {
        match classify_path(path)? {
            GzipFormat::NanoBGzip => Ok(FileIndex::Blocks(NbgzIndex::ensure(path)?)),
            found => Err(FormatError::NotNanoBgzip { found }.into()),
        }
    } else {
        Ok(FileIndex::Plain(FastqIndex::ensure(path, key_len)?))
    }
}

/// Expands a read-name argument into a list of names
///
/// The argument is either a path to a text file with one name per line
/// (blank lines and `#` comments skipped) or a comma-separated list.
///
/// # Errors
/// Propagates I/O errors from reading a name file.
pub fn parse_read_names(spec: &str) -> Result<Vec<String>> {
    let path = Path::new(spec);
    let mut names = Vec::new();
    if path.is_file() {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            names.push(trimmed.to_string());
        }
    } else {
        for part in spec.split(',') {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                names.push(trimmed.to_string());
            }
        }
    }
    Ok(names)
}

/// Extracts reads by name from a plain or NanoBgzip FASTQ file
///
/// With `use_index` the file's index is loaded or built and each name costs
/// one seek (plain) or one partial block inflate (NanoBgzip). Without it, a
/// fresh existing index is still used; otherwise the file is scanned once,
/// stopping early when every name has been seen.
///
/// # Errors
/// Returns a [`FormatError`] when an index is demanded for a compressed file
/// that is not NanoBgzip. Index, parse, and I/O failures propagate.
pub fn find_reads<P: AsRef<Path>>(
    path: P,
    names: &[String],
    use_index: bool,
    key_len: usize,
) -> Result<FindSummary> {
    let path = path.as_ref();
    let index_fresh = index_is_fresh(path, &index_path_for(path))?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        if use_index || index_fresh {
            match classify_path(path)? {
                GzipFormat::NanoBGzip => return find_indexed_gz(path, names),
                found => {
                    if use_index {
                        return Err(FormatError::NotNanoBgzip { found }.into());
                    }
                }
            }
        }
        find_sequential(FastqReader::from_path(path)?, names)
    } else if use_index || index_fresh {
        find_indexed_plain(path, names, key_len)
    } else {
        find_sequential(FastqReader::from_path(path)?, names)
    }
}

/// Single-pass scan for the wanted names, stopping once all are found
fn find_sequential<R: BufRead>(
    mut reader: FastqReader<R>,
    names: &[String],
) -> Result<FindSummary> {
    let mut wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut found = Vec::new();
    while let Some(record) = reader.next_record()? {
        if wanted.remove(record.id()) {
            found.push(record);
            if wanted.is_empty() {
                break;
            }
        }
    }
    let missing = names
        .iter()
        .filter(|name| wanted.contains(name.as_str()))
        .cloned()
        .collect();
    Ok(FindSummary { found, missing })
}

fn find_indexed_plain(path: &Path, names: &[String], key_len: usize) -> Result<FindSummary> {
    let fq_index = FastqIndex::ensure(path, key_len)?;
    let mut file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut summary = FindSummary::default();
    for name in names {
        match lookup_plain(&fq_index, &mut file, file_len, name)? {
            Some(record) => summary.found.push(record),
            None => summary.missing.push(name.clone()),
        }
    }
    Ok(summary)
}

/// Checks every candidate range for the key until the full name matches
fn lookup_plain(
    fq_index: &FastqIndex,
    file: &mut File,
    file_len: u64,
    name: &str,
) -> Result<Option<Record>> {
    let Some(ranges) = fq_index.get(name) else {
        return Ok(None);
    };
    for &(start, stop) in ranges {
        // Index offsets come from an external file; never trust them blindly
        if start > stop || stop >= file_len {
            return Err(IndexError::EntryOutOfBounds {
                name: name.to_string(),
                start,
                end: stop,
                limit: file_len,
            }
            .into());
        }
        file.seek(SeekFrom::Start(start))?;
        let mut bytes = vec![0u8; (stop - start + 1) as usize];
        file.read_exact(&mut bytes)?;
        let mut parser = FastqReader::new(Cursor::new(bytes));
        if let Some(record) = parser.next_record()? {
            if record.id() == name {
                return Ok(Some(record));
            }
        }
    }
    Ok(None)
}

fn find_indexed_gz(path: &Path, names: &[String]) -> Result<FindSummary> {
    let block_index = NbgzIndex::ensure(path)?;
    let mut reader = BlockReader::new(path)?;
    let mut summary = FindSummary::default();
    for name in names {
        match lookup_gz(&block_index, &mut reader, name)? {
            Some(record) => summary.found.push(record),
            None => summary.missing.push(name.clone()),
        }
    }
    Ok(summary)
}

/// Inflates the containing block only up to the end of the wanted record
fn lookup_gz(
    block_index: &NbgzIndex,
    reader: &mut BlockReader,
    name: &str,
) -> Result<Option<Record>> {
    let Some(entries) = block_index.get(name) else {
        return Ok(None);
    };
    for entry in entries {
        if entry.start > entry.end {
            return Err(IndexError::EntryOutOfBounds {
                name: name.to_string(),
                start: entry.start,
                end: entry.end,
                limit: entry.end + 1,
            }
            .into());
        }
        let edge = block_index.blocks()[entry.block];
        // Errors out, rather than panicking, when end runs past the payload
        let payload = reader.read_block_prefix(edge, entry.end + 1)?;
        let mut parser = FastqReader::new(Cursor::new(&payload[entry.start as usize..]));
        if let Some(record) = parser.next_record()? {
            if record.id() == name {
                return Ok(Some(record));
            }
        }
    }
    Ok(None)
}
