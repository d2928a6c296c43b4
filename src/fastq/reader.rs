use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{RecordError, Result};
use crate::record::Record;

/// Default number of records pulled per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 20_000;

/// Streaming 4-line FASTQ parser
///
/// Reads records one at a time or in bounded chunks, so memory stays
/// proportional to the chunk size rather than the file. Malformed input is
/// fatal: a record that fails to parse poisons trust in the whole file.
pub struct FastqReader<R: BufRead> {
    reader: R,
    chunk_size: usize,
    finished: bool,
    records_read: u64,
    line: String,
}

impl FastqReader<BufReader<Box<dyn Read + Send>>> {
    /// Opens a FASTQ file, transparently decoding `.gz` inputs
    ///
    /// Compressed files go through a multi-member gzip decoder, so plain
    /// gzip, BGZF, and NanoBgzip all stream the same way.
    ///
    /// # Errors
    /// Propagates I/O failures from opening the file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let inner: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::new(BufReader::new(inner)))
    }
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            chunk_size: DEFAULT_CHUNK_SIZE,
            finished: false,
            records_read: 0,
            line: String::new(),
        }
    }

    /// Set how many records [`Self::read_chunk`] pulls at a time
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// True once the underlying input is exhausted
    #[must_use]
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Number of records parsed so far
    #[must_use]
    pub fn num_records(&self) -> u64 {
        self.records_read
    }

    /// Reads one line, stripping the newline and any carriage return
    fn next_line(&mut self) -> Result<Option<String>> {
        self.line.clear();
        let n = self.reader.read_line(&mut self.line)?;
        if n == 0 {
            return Ok(None);
        }
        while self.line.ends_with('\n') || self.line.ends_with('\r') {
            self.line.pop();
        }
        Ok(Some(self.line.clone()))
    }

    /// Parses the next record, or `None` at end of input
    ///
    /// Blank lines between records are skipped; anything else out of place
    /// is an error.
    ///
    /// # Errors
    /// Returns a [`RecordError`] for malformed records and I/O errors from
    /// the underlying reader.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        if self.finished {
            return Ok(None);
        }
        let header = loop {
            match self.next_line()? {
                None => {
                    self.finished = true;
                    return Ok(None);
                }
                Some(line) if line.is_empty() => {}
                Some(line) => break line,
            }
        };
        if !header.starts_with('@') {
            return Err(RecordError::InvalidHeader { line: header }.into());
        }
        let (id, desc) = match header[1..].split_once(' ') {
            Some((id, desc)) => (id.to_string(), Some(desc.to_string())),
            None => (header[1..].to_string(), None),
        };

        let Some(sequence) = self.next_line()? else {
            return Err(RecordError::Truncated { id }.into());
        };
        let Some(separator) = self.next_line()? else {
            return Err(RecordError::Truncated { id }.into());
        };
        if !separator.starts_with('+') {
            return Err(RecordError::InvalidSeparator { id }.into());
        }
        let Some(quality) = self.next_line()? else {
            return Err(RecordError::Truncated { id }.into());
        };

        let record = Record::new(id, desc, sequence, quality)?;
        self.records_read += 1;
        Ok(Some(record))
    }

    /// Reads up to one chunk of records
    ///
    /// An empty chunk means the input is exhausted.
    ///
    /// # Errors
    /// Propagates [`Self::next_record`] failures.
    pub fn read_chunk(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(self.chunk_size);
        while records.len() < self.chunk_size {
            match self.next_record()? {
                Some(record) => records.push(record),
                None => break,
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use std::io::Cursor;

    const TWO_RECORDS: &str =
        "@read1 ch=4 start_time=2023\nACGTACGT\n+\nIIIIIIII\n@read2\nTTTT\n+\n!!!!\n";

    #[test]
    fn test_parse_two_records() {
        let mut reader = FastqReader::new(Cursor::new(TWO_RECORDS));

        let first = reader.next_record().unwrap().unwrap();
        assert_eq!(first.id(), "read1");
        assert_eq!(first.desc(), Some("ch=4 start_time=2023"));
        assert_eq!(first.sequence(), "ACGTACGT");
        assert_eq!(first.quality(), "IIIIIIII");

        let second = reader.next_record().unwrap().unwrap();
        assert_eq!(second.id(), "read2");
        assert_eq!(second.desc(), None);

        assert!(reader.next_record().unwrap().is_none());
        assert!(reader.finished());
        assert_eq!(reader.num_records(), 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = "@read1\r\nACGT\r\n+\r\nIIII\r\n";
        let mut reader = FastqReader::new(Cursor::new(input));
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.id(), "read1");
        assert_eq!(record.sequence(), "ACGT");
        assert_eq!(record.quality(), "IIII");
    }

    #[test]
    fn test_trailing_blank_lines() {
        let input = "@read1\nACGT\n+\nIIII\n\n\n";
        let mut reader = FastqReader::new(Cursor::new(input));
        assert!(reader.next_record().unwrap().is_some());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_missing_at_sign() {
        let input = "read1\nACGT\n+\nIIII\n";
        let mut reader = FastqReader::new(Cursor::new(input));
        let err = reader.next_record().unwrap_err();
        assert!(err.is_malformed_record());
        assert!(err.to_string().contains("does not start with '@'"));
    }

    #[test]
    fn test_bad_separator() {
        let input = "@read1\nACGT\n-\nIIII\n";
        let mut reader = FastqReader::new(Cursor::new(input));
        let err = reader.next_record().unwrap_err();
        assert!(err.to_string().contains("does not start with '+'"));
    }

    #[test]
    fn test_truncated_record() {
        let input = "@read1\nACGT\n";
        let mut reader = FastqReader::new(Cursor::new(input));
        let err = reader.next_record().unwrap_err();
        assert!(err.to_string().contains("Truncated record"));
    }

    #[test]
    fn test_length_mismatch_is_fatal() {
        let input = "@read1\nACGTACGT\n+\nIIII\n";
        let mut reader = FastqReader::new(Cursor::new(input));
        let err = reader.next_record().unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn test_separator_may_repeat_header() {
        let input = "@read1\nACGT\n+read1\nIIII\n";
        let mut reader = FastqReader::new(Cursor::new(input));
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.quality(), "IIII");
    }

    #[test]
    fn test_read_chunk_bounds() {
        let input = TWO_RECORDS.repeat(3);
        let mut reader = FastqReader::new(Cursor::new(input)).with_chunk_size(4);

        let chunk = reader.read_chunk().unwrap();
        assert_eq!(chunk.len(), 4);
        let chunk = reader.read_chunk().unwrap();
        assert_eq!(chunk.len(), 2);
        let chunk = reader.read_chunk().unwrap();
        assert!(chunk.is_empty());
        assert!(reader.finished());
    }

    #[test]
    fn test_from_path_plain_and_gzip() {
        let dir = std::env::temp_dir();
        let plain = dir.join(format!("nanofq_reader_plain_{}.fastq", std::process::id()));
        std::fs::write(&plain, TWO_RECORDS).unwrap();

        let mut reader = FastqReader::from_path(&plain).unwrap();
        assert_eq!(reader.next_record().unwrap().unwrap().id(), "read1");

        let gz = dir.join(format!("nanofq_reader_gz_{}.fastq.gz", std::process::id()));
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        std::io::Write::write_all(&mut encoder, TWO_RECORDS.as_bytes()).unwrap();
        std::fs::write(&gz, encoder.finish().unwrap()).unwrap();

        let mut reader = FastqReader::from_path(&gz).unwrap();
        assert_eq!(reader.next_record().unwrap().unwrap().id(), "read1");
        assert_eq!(reader.next_record().unwrap().unwrap().id(), "read2");
        assert!(reader.next_record().unwrap().is_none());

        std::fs::remove_file(&plain).ok();
        std::fs::remove_file(&gz).ok();
    }
}
