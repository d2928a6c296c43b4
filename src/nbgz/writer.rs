use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::{Compress, Compression, FlushCompress, Status};

use super::header::{BlockHeader, HEADER_LEN, TRAILER_LEN};
use super::index::index_path_for;
use super::DEFAULT_READS_PER_BLOCK;
use crate::error::{ConfigError, FormatError, Result};
use crate::fastq::FastqReader;
use crate::record::Record;

/// Builder for [`NanoBgzipWriter`] instances
#[derive(Debug, Clone)]
pub struct NanoBgzipWriterBuilder {
    reads_per_block: Option<usize>,
}

impl Default for NanoBgzipWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NanoBgzipWriterBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            reads_per_block: None,
        }
    }

    /// Set how many records each compressed block holds
    #[must_use]
    pub fn reads_per_block(mut self, n: usize) -> Self {
        self.reads_per_block = Some(n);
        self
    }

    /// Build the writer over a compressed-data sink and an index sink
    ///
    /// Any positive block granularity is accepted; small values cost
    /// compression ratio but sharpen random access.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the records-per-block setting is zero.
    pub fn build<W: Write, I: Write>(self, out: W, index_out: I) -> Result<NanoBgzipWriter<W, I>> {
        let reads_per_block = self.reads_per_block.unwrap_or(DEFAULT_READS_PER_BLOCK);
        if reads_per_block == 0 {
            return Err(ConfigError::ZeroCount {
                parameter: "reads per block",
            }
            .into());
        }
        Ok(NanoBgzipWriter {
            out,
            index_out,
            reads_per_block,
            cctx: Compress::new(Compression::default(), false),
            payload: Vec::new(),
            zbuf: Vec::new(),
            pending: Vec::new(),
            offset: 0,
            blocks_written: 0,
            records_written: 0,
        })
    }
}

/// Streaming writer producing NanoBgzip blocks and their index in one pass
///
/// Records accumulate as FASTQ text until the block holds its configured
/// record count, then the block is deflated in a single pass and emitted as
/// one complete gzip member. The index sink receives one `#start\tend` line
/// per block followed by one `name\tstart\tend` line per record, with record
/// offsets relative to the block's uncompressed payload and the end offset
/// inclusive.
#[derive(Debug)]
pub struct NanoBgzipWriter<W: Write, I: Write> {
    out: W,
    index_out: I,
    reads_per_block: usize,

    /// Reusable compression context
    cctx: Compress,
    /// Uncompressed text of the block under construction
    payload: Vec<u8>,
    /// Reusable deflate output buffer
    zbuf: Vec<u8>,
    /// Index entries for the block under construction
    pending: Vec<(String, u64, u64)>,

    /// Absolute file offset where the next block starts
    offset: u64,
    blocks_written: u64,
    records_written: u64,
}

impl<W: Write, I: Write> NanoBgzipWriter<W, I> {
    /// Append one record to the block under construction
    ///
    /// Flushes a full block to the sink as a complete gzip member.
    ///
    /// # Errors
    /// Propagates I/O and deflate failures.
    pub fn push(&mut self, record: &Record) -> Result<()> {
        let start = self.payload.len() as u64;
        self.payload.extend_from_slice(record.to_fastq().as_bytes());
        let end = self.payload.len() as u64 - 1;
        self.pending.push((record.id().to_string(), start, end));
        self.records_written += 1;
        if self.pending.len() == self.reads_per_block {
            self.flush_block()?;
        }
        Ok(())
    }

    /// Flush any partial block and both sinks
    ///
    /// # Errors
    /// Propagates I/O and deflate failures.
    pub fn finish(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            self.flush_block()?;
        }
        self.out.flush()?;
        self.index_out.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn num_blocks(&self) -> u64 {
        self.blocks_written
    }

    #[must_use]
    pub fn num_records(&self) -> u64 {
        self.records_written
    }

    /// Deflate the pending payload into one gzip member and emit its index lines
    fn flush_block(&mut self) -> Result<()> {
        self.zbuf.clear();
        self.zbuf
            .reserve(self.payload.len() + self.payload.len() / 1000 + 64);
        self.cctx.reset();
        let status = self
            .cctx
            .compress_vec(&self.payload, &mut self.zbuf, FlushCompress::Finish)
            .map_err(FormatError::from)?;
        if status != Status::StreamEnd {
            return Err(FormatError::CompressIncomplete {
                bytes: self.payload.len(),
            }
            .into());
        }

        let mut crc = flate2::Crc::new();
        crc.update(&self.payload);

        let block_size = (HEADER_LEN + self.zbuf.len() + TRAILER_LEN) as u32;
        let header = BlockHeader { block_size };
        header.write_to(&mut self.out)?;
        self.out.write_all(&self.zbuf)?;
        self.out.write_u32::<LittleEndian>(crc.sum())?;
        self.out.write_u32::<LittleEndian>(self.payload.len() as u32)?;

        let block_start = self.offset;
        let block_end = block_start + u64::from(block_size);
        writeln!(self.index_out, "#{block_start}\t{block_end}")?;
        for (name, start, end) in &self.pending {
            writeln!(self.index_out, "{name}\t{start}\t{end}")?;
        }

        self.offset = block_end;
        self.blocks_written += 1;
        self.payload.clear();
        self.pending.clear();
        Ok(())
    }
}

/// Compress a plain FASTQ file into NanoBgzip, writing the index alongside
///
/// The output must carry a `.gz` suffix; the index lands next to it with an
/// extra `.index` suffix. Returns the number of blocks written.
///
/// # Errors
/// Returns a [`ConfigError`] if the input is already compressed, the output
/// path lacks a `.gz` suffix, or `reads_per_block` is zero. Record parsing,
/// I/O, and deflate failures propagate.
pub fn compress_path<P, Q>(input: P, output: Q, reads_per_block: usize) -> Result<u64>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output = output.as_ref();
    if input.extension().is_some_and(|ext| ext == "gz") {
        return Err(ConfigError::InputAlreadyCompressed {
            path: input.to_path_buf(),
        }
        .into());
    }
    if !output.extension().is_some_and(|ext| ext == "gz") {
        return Err(ConfigError::OutputMissingGzSuffix {
            path: output.to_path_buf(),
        }
        .into());
    }

    let mut reader = FastqReader::from_path(input)?;
    let mut writer = NanoBgzipWriterBuilder::new()
        .reads_per_block(reads_per_block)
        .build(
            BufWriter::new(File::create(output)?),
            BufWriter::new(File::create(index_path_for(output))?),
        )?;
    while let Some(record) = reader.next_record()? {
        writer.push(&record)?;
    }
    writer.finish()?;
    Ok(writer.num_blocks())
}
