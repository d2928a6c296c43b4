use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::reader::BlockReader;
use crate::error::{IndexError, RecordError, Result};

/// Where one read's record lives inside a NanoBgzip file
///
/// Offsets are relative to the uncompressed payload of the named block, with
/// `end` inclusive, so `payload[start..=end]` is exactly the 4-line record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordEntry {
    /// Position of the containing block in [`NbgzIndex::blocks`]
    pub block: usize,
    pub start: u64,
    pub end: u64,
}

/// The sidecar index of a NanoBgzip file
///
/// The text format interleaves block and record lines so each record's block
/// is implied by the closest preceding block line:
///
/// ```text
/// #<block_start>\t<block_end>
/// <read_name>\t<record_start>\t<record_end>
/// ...
/// ```
///
/// Block bounds are absolute file offsets with the end exclusive. The index
/// is written during compression and can be rebuilt from the `.gz` alone.
#[derive(Debug, Default)]
pub struct NbgzIndex {
    blocks: Vec<(u64, u64)>,
    records: HashMap<String, Vec<RecordEntry>>,
}

/// The index path that goes with a compressed file: the same name plus `.index`
pub(crate) fn index_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".index");
    PathBuf::from(name)
}

/// True when the index file exists and is at least as new as its source
pub(crate) fn index_is_fresh(source: &Path, index: &Path) -> Result<bool> {
    if !index.exists() {
        return Ok(false);
    }
    let source_mtime = std::fs::metadata(source)?.modified()?;
    let index_mtime = std::fs::metadata(index)?.modified()?;
    Ok(index_mtime >= source_mtime)
}

impl NbgzIndex {
    /// Loads an index file written during compression or by [`Self::build`]
    ///
    /// # Errors
    /// Returns an [`IndexError`] if the file is missing or malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IndexError::Missing {
                path: path.to_path_buf(),
            }
            .into());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut blocks: Vec<(u64, u64)> = Vec::new();
        let mut records: HashMap<String, Vec<RecordEntry>> = HashMap::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let malformed = || IndexError::MalformedLine {
                line_number: number + 1,
                line: line.clone(),
            };
            if let Some(rest) = line.strip_prefix('#') {
                let (start, end) = rest.split_once('\t').ok_or_else(malformed)?;
                let start: u64 = start.parse().map_err(|_| malformed())?;
                let end: u64 = end.parse().map_err(|_| malformed())?;
                blocks.push((start, end));
            } else {
                let mut fields = line.split('\t');
                let name = fields.next().ok_or_else(malformed)?;
                let start: u64 = fields
                    .next()
                    .ok_or_else(malformed)?
                    .parse()
                    .map_err(|_| malformed())?;
                let end: u64 = fields
                    .next()
                    .ok_or_else(malformed)?
                    .parse()
                    .map_err(|_| malformed())?;
                if name.is_empty() || fields.next().is_some() {
                    return Err(malformed().into());
                }
                if blocks.is_empty() {
                    return Err(IndexError::MissingHeader.into());
                }
                records.entry(name.to_string()).or_default().push(RecordEntry {
                    block: blocks.len() - 1,
                    start,
                    end,
                });
            }
        }
        Ok(Self { blocks, records })
    }

    /// Rebuilds the index by inflating every block of a NanoBgzip file
    ///
    /// Writes the index file next to the source and returns the loaded form.
    ///
    /// # Errors
    /// Returns a [`crate::error::FormatError`] if the file is not NanoBgzip
    /// or a block fails to inflate, and a [`RecordError`] if a block payload
    /// is not well-formed 4-line FASTQ.
    pub fn build<P: AsRef<Path>>(gz_path: P) -> Result<Self> {
        let gz_path = gz_path.as_ref();
        let mut reader = BlockReader::new(gz_path)?;
        let edges = reader.edges()?;

        let mut out = BufWriter::new(File::create(index_path_for(gz_path))?);
        let mut blocks = Vec::with_capacity(edges.len());
        let mut records: HashMap<String, Vec<RecordEntry>> = HashMap::new();

        for edge in edges {
            let payload = reader.read_block(edge)?;
            writeln!(out, "#{}\t{}", edge.0, edge.1)?;
            blocks.push(edge);
            scan_payload(&payload, |name, start, end| {
                writeln!(out, "{name}\t{start}\t{end}")?;
                records.entry(name.to_string()).or_default().push(RecordEntry {
                    block: blocks.len() - 1,
                    start,
                    end,
                });
                Ok(())
            })?;
        }
        out.flush()?;
        Ok(Self { blocks, records })
    }

    /// Loads a fresh index or rebuilds a missing or stale one
    ///
    /// The index counts as stale when the compressed file has been modified
    /// after the index was written.
    ///
    /// # Errors
    /// Propagates [`Self::load`] and [`Self::build`] failures.
    pub fn ensure<P: AsRef<Path>>(gz_path: P) -> Result<Self> {
        let gz_path = gz_path.as_ref();
        let index_path = index_path_for(gz_path);
        if index_is_fresh(gz_path, &index_path)? {
            Self::load(&index_path)
        } else {
            Self::build(gz_path)
        }
    }

    /// Absolute byte bounds of every block, end exclusive
    #[must_use]
    pub fn blocks(&self) -> &[(u64, u64)] {
        &self.blocks
    }

    /// All entries recorded for a read name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[RecordEntry]> {
        self.records.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn num_records(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Walks a block payload as 4-line FASTQ records, reporting each record's
/// name and its inclusive byte range within the payload
fn scan_payload<F>(payload: &[u8], mut f: F) -> Result<()>
where
    F: FnMut(&str, u64, u64) -> Result<()>,
{
    let mut pos = 0usize;
    while pos < payload.len() {
        let rec_start = pos;
        let Some(header_end) = next_line(payload, &mut pos) else {
            return Err(RecordError::Truncated {
                id: String::from_utf8_lossy(&payload[rec_start..]).into_owned(),
            }
            .into());
        };
        let header = &payload[rec_start..header_end];
        if !header.starts_with(b"@") {
            return Err(RecordError::InvalidHeader {
                line: String::from_utf8_lossy(header).into_owned(),
            }
            .into());
        }
        let name_end = memchr::memchr(b' ', header).unwrap_or(header.len());
        let name = String::from_utf8(header[1..name_end].to_vec())?;

        let mut rec_end = header_end;
        for _ in 0..3 {
            match next_line(payload, &mut pos) {
                Some(line_end) => rec_end = line_end,
                None => return Err(RecordError::Truncated { id: name }.into()),
            }
        }
        f(&name, rec_start as u64, rec_end as u64)?;
    }
    Ok(())
}

/// Returns the offset of the next newline and advances `pos` past it
fn next_line(payload: &[u8], pos: &mut usize) -> Option<usize> {
    memchr::memchr(b'\n', &payload[*pos..]).map(|nl| {
        let at = *pos + nl;
        *pos = at + 1;
        at
    })
}
