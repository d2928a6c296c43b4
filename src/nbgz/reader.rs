use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use flate2::{Decompress, FlushDecompress, Status};
use memmap2::Mmap;

use super::header::{BlockHeader, HEADER_LEN, TRAILER_LEN};
use super::GzipFormat;
use crate::error::{FormatError, Result};

/// One parsed gzip member inside a NanoBgzip file
struct Member<'a> {
    deflate: &'a [u8],
    isize: u32,
}

/// Validates the member at `edge` and returns its deflate payload and trailer
fn parse_member(data: &[u8], edge: (u64, u64)) -> Result<Member<'_>> {
    let (start, end) = edge;
    if start >= end || end > data.len() as u64 {
        return Err(FormatError::UnexpectedEof(start).into());
    }
    let slice = &data[start as usize..end as usize];
    if slice.len() < HEADER_LEN + TRAILER_LEN {
        return Err(FormatError::UnexpectedEof(start).into());
    }
    let header = BlockHeader::read_from(&mut Cursor::new(slice))?;
    if u64::from(header.block_size) != end - start {
        return Err(FormatError::BlockSizeMismatch {
            declared: header.block_size,
            expected: end - start,
        }
        .into());
    }
    let trailer_start = slice.len() - TRAILER_LEN;
    let isize = LittleEndian::read_u32(&slice[trailer_start + 4..]);
    Ok(Member {
        deflate: &slice[HEADER_LEN..trailer_start],
        isize,
    })
}

/// Inflates a whole deflate stream, checking it terminates where declared
fn inflate_full(dctx: &mut Decompress, deflate: &[u8], isize: u32) -> Result<Vec<u8>> {
    dctx.reset(false);
    let mut out = Vec::with_capacity(isize as usize);
    let status = dctx
        .decompress_vec(deflate, &mut out, FlushDecompress::Finish)
        .map_err(FormatError::from)?;
    if status != Status::StreamEnd {
        return Err(FormatError::MissingStreamEnd {
            produced: out.len() as u64,
            expected: u64::from(isize),
        }
        .into());
    }
    if out.len() as u64 != u64::from(isize) {
        return Err(FormatError::IsizeMismatch {
            produced: out.len() as u64,
            declared: isize,
        }
        .into());
    }
    Ok(out)
}

/// Inflates only the first `need` bytes of a deflate stream
fn inflate_prefix(dctx: &mut Decompress, deflate: &[u8], need: usize) -> Result<Vec<u8>> {
    dctx.reset(false);
    let mut out = Vec::with_capacity(need);
    loop {
        let consumed = dctx.total_in() as usize;
        let status = dctx
            .decompress_vec(&deflate[consumed..], &mut out, FlushDecompress::None)
            .map_err(FormatError::from)?;
        if out.len() >= need {
            return Ok(out);
        }
        match status {
            Status::StreamEnd => {
                return Err(FormatError::UnexpectedStreamEnd {
                    produced: out.len() as u64,
                    requested: need as u64,
                }
                .into());
            }
            Status::Ok | Status::BufError => {
                // output space remains, so no progress means the input ran dry
                if dctx.total_in() as usize == consumed {
                    return Err(FormatError::MissingStreamEnd {
                        produced: out.len() as u64,
                        expected: need as u64,
                    }
                    .into());
                }
            }
        }
    }
}

/// Inflates the whole block at `edge` from an in-memory NanoBgzip image
pub(crate) fn decompress_block(data: &[u8], edge: (u64, u64)) -> Result<Vec<u8>> {
    let member = parse_member(data, edge)?;
    inflate_full(&mut Decompress::new(false), member.deflate, member.isize)
}

/// Inflates only the first `need` payload bytes of the block at `edge`
pub(crate) fn decompress_block_prefix(data: &[u8], edge: (u64, u64), need: u64) -> Result<Vec<u8>> {
    let member = parse_member(data, edge)?;
    inflate_prefix(&mut Decompress::new(false), member.deflate, need as usize)
}

/// Random-access reader over a memory-mapped NanoBgzip file
///
/// Each block is a self-contained gzip member, so reads touch only the pages
/// of the requested block. Cloning shares the map and allocates a fresh
/// decompression context, which makes clones cheap to hand to worker threads.
#[derive(Debug)]
pub struct BlockReader {
    inner: Arc<Mmap>,

    /// Reusable decompression context
    dctx: Decompress,
}

impl Clone for BlockReader {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            dctx: Decompress::new(false),
        }
    }
}

impl BlockReader {
    /// Memory-maps a NanoBgzip file
    ///
    /// # Errors
    /// Returns a [`FormatError`] if the file is empty or is not NanoBgzip,
    /// and I/O errors from opening or mapping it.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(FormatError::EmptyFile.into());
        }
        let inner = unsafe { Mmap::map(&file) }?;
        match super::classify(&mut Cursor::new(&inner[..]))? {
            GzipFormat::NanoBGzip => {}
            found => return Err(FormatError::NotNanoBgzip { found }.into()),
        }
        Ok(Self {
            inner: Arc::new(inner),
            dctx: Decompress::new(false),
        })
    }

    /// Total file length in bytes
    #[must_use]
    pub fn len(&self) -> u64 {
        self.inner.len() as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Walks the block headers and returns every block's absolute byte bounds
    ///
    /// # Errors
    /// Returns a [`FormatError`] if a header fails to parse or a declared
    /// block size runs past the end of the file.
    pub fn edges(&self) -> Result<Vec<(u64, u64)>> {
        let data = &self.inner[..];
        let mut edges = Vec::new();
        let mut offset = 0u64;
        while (offset as usize) < data.len() {
            let remaining = &data[offset as usize..];
            if remaining.len() < HEADER_LEN {
                return Err(FormatError::UnexpectedEof(offset).into());
            }
            let header = BlockHeader::read_from(&mut Cursor::new(remaining))?;
            let end = offset + u64::from(header.block_size);
            if end > data.len() as u64 {
                return Err(FormatError::UnexpectedEof(offset).into());
            }
            edges.push((offset, end));
            offset = end;
        }
        Ok(edges)
    }

    /// Inflates the whole block at `edge`
    ///
    /// The header's declared size must match the requested bounds, and the
    /// inflated length must match the member's stored uncompressed size.
    ///
    /// # Errors
    /// Returns a [`FormatError`] on any mismatch and inflate failures.
    pub fn read_block(&mut self, edge: (u64, u64)) -> Result<Vec<u8>> {
        let member = parse_member(&self.inner, edge)?;
        inflate_full(&mut self.dctx, member.deflate, member.isize)
    }

    /// Inflates only the first `need` payload bytes of the block at `edge`
    ///
    /// Stops as soon as `need` bytes are produced, leaving the rest of the
    /// member's compressed data untouched.
    ///
    /// # Errors
    /// Returns a [`FormatError`] if the deflate stream ends before `need`
    /// bytes, plus the same validation errors as [`Self::read_block`].
    pub fn read_block_prefix(&mut self, edge: (u64, u64), need: u64) -> Result<Vec<u8>> {
        let member = parse_member(&self.inner, edge)?;
        inflate_prefix(&mut self.dctx, member.deflate, need as usize)
    }
}
