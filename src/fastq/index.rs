use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{ConfigError, IndexError, RecordError, Result};
use crate::nbgz::{index_is_fresh, index_path_for};

/// Allowed range for the index key length
pub const KEY_LEN_RANGE: (usize, usize) = (8, 100);

/// Line index of a plain-text FASTQ file, keyed by read-name prefix
///
/// Keys are the first `key_len` characters of each read name, so the index
/// stays compact for the long UUID names nanopore basecallers emit. A key
/// can map to several byte ranges when prefixes collide; lookups verify the
/// full name against each candidate record.
///
/// The text format is one header line naming the key length, then one line
/// per key carrying its ranges as absolute byte offsets with the stop offset
/// inclusive:
///
/// ```text
/// #<key_len>
/// <prefix>\t<start>\t<stop>[\t<start>\t<stop>...]
/// ```
#[derive(Debug)]
pub struct FastqIndex {
    key_len: usize,
    entries: BTreeMap<String, Vec<(u64, u64)>>,
}

/// Truncates a read name to at most `key_len` characters
fn truncate_key(name: &str, key_len: usize) -> &str {
    name.char_indices()
        .nth(key_len)
        .map_or(name, |(at, _)| &name[..at])
}

fn validate_key_len(key_len: usize) -> Result<()> {
    let (min, max) = KEY_LEN_RANGE;
    if key_len < min || key_len > max {
        return Err(ConfigError::LengthOutOfRange {
            parameter: "index key length",
            value: key_len,
            min,
            max,
        }
        .into());
    }
    Ok(())
}

impl FastqIndex {
    /// Scans a plain FASTQ file and writes its index alongside it
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the key length is out of range or the
    /// file is compressed, a [`RecordError`] if the file is not well-formed
    /// 4-line FASTQ, and I/O errors.
    pub fn build<P: AsRef<Path>>(path: P, key_len: usize) -> Result<Self> {
        validate_key_len(key_len)?;
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "gz") {
            return Err(ConfigError::InputAlreadyCompressed {
                path: path.to_path_buf(),
            }
            .into());
        }

        let mut reader = BufReader::new(File::open(path)?);
        let mut entries: BTreeMap<String, Vec<(u64, u64)>> = BTreeMap::new();
        let mut offset = 0u64;
        let mut buf = Vec::new();
        loop {
            let rec_start = offset;
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }
            offset += n as u64;

            let header = trim_line(&buf);
            if header.is_empty() {
                continue;
            }
            if header[0] != b'@' {
                return Err(RecordError::InvalidHeader {
                    line: String::from_utf8_lossy(header).into_owned(),
                }
                .into());
            }
            let name_end = memchr::memchr(b' ', header).unwrap_or(header.len());
            let name = String::from_utf8(header[1..name_end].to_vec())?;

            for _ in 0..3 {
                buf.clear();
                let n = reader.read_until(b'\n', &mut buf)?;
                if n == 0 {
                    return Err(RecordError::Truncated { id: name }.into());
                }
                offset += n as u64;
            }
            let rec_end = offset - 1;
            entries
                .entry(truncate_key(&name, key_len).to_string())
                .or_default()
                .push((rec_start, rec_end));
        }

        let mut out = BufWriter::new(File::create(index_path_for(path))?);
        writeln!(out, "#{key_len}")?;
        for (key, ranges) in &entries {
            write!(out, "{key}")?;
            for (start, stop) in ranges {
                write!(out, "\t{start}\t{stop}")?;
            }
            writeln!(out)?;
        }
        out.flush()?;

        Ok(Self { key_len, entries })
    }

    /// Loads an index file, taking the key length from its header line
    ///
    /// # Errors
    /// Returns an [`IndexError`] if the file is missing or malformed.
    pub fn load<P: AsRef<Path>>(index_path: P) -> Result<Self> {
        let index_path = index_path.as_ref();
        if !index_path.exists() {
            return Err(IndexError::Missing {
                path: index_path.to_path_buf(),
            }
            .into());
        }
        let reader = BufReader::new(File::open(index_path)?);
        let mut lines = reader.lines().enumerate();

        let Some((_, first)) = lines.next() else {
            return Err(IndexError::MissingHeader.into());
        };
        let first = first?;
        let key_len: usize = first
            .strip_prefix('#')
            .and_then(|rest| rest.parse().ok())
            .ok_or(IndexError::MissingHeader)?;
        validate_key_len(key_len)?;

        let mut entries: BTreeMap<String, Vec<(u64, u64)>> = BTreeMap::new();
        for (number, line) in lines {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let malformed = || IndexError::MalformedLine {
                line_number: number + 1,
                line: line.clone(),
            };
            let mut fields = line.split('\t');
            let key = fields.next().ok_or_else(malformed)?;
            if key.is_empty() {
                return Err(malformed().into());
            }
            let mut ranges = Vec::new();
            loop {
                let Some(start) = fields.next() else { break };
                let stop = fields.next().ok_or_else(malformed)?;
                let start: u64 = start.parse().map_err(|_| malformed())?;
                let stop: u64 = stop.parse().map_err(|_| malformed())?;
                ranges.push((start, stop));
            }
            if ranges.is_empty() {
                return Err(malformed().into());
            }
            entries.insert(key.to_string(), ranges);
        }
        Ok(Self { key_len, entries })
    }

    /// Loads a fresh index or rebuilds a missing or stale one
    ///
    /// A fresh index keeps the key length it was written with, even when a
    /// different one was requested.
    ///
    /// # Errors
    /// Propagates [`Self::load`] and [`Self::build`] failures.
    pub fn ensure<P: AsRef<Path>>(path: P, key_len: usize) -> Result<Self> {
        let path = path.as_ref();
        let index_path = index_path_for(path);
        if index_is_fresh(path, &index_path)? {
            Self::load(&index_path)
        } else {
            Self::build(path, key_len)
        }
    }

    #[must_use]
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Candidate byte ranges for a read name, keyed by its prefix
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[(u64, u64)]> {
        self.entries
            .get(truncate_key(name, self.key_len))
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn num_keys(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strips the trailing newline and any carriage return
fn trim_line(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}
