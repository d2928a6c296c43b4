use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::GzipFormat;
use crate::error::{FormatError, Result};

/// Gzip magic bytes
pub const MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Compression method byte for deflate
pub const CM_DEFLATE: u8 = 8;
/// Flag byte with only the extra-field bit set
pub const FLG_FEXTRA: u8 = 0b100;
/// Operating system byte for "unknown"
pub const OS_UNKNOWN: u8 = 255;
/// Extra field length: subfield id + subfield length + block size
pub const XLEN: u16 = 8;
/// Subfield id marking a NanoBgzip member
pub const SID: [u8; 2] = [b'N', b'A'];
/// Subfield id marking a BGZF member
pub const SID_BGZF: [u8; 2] = [b'B', b'C'];
/// Declared length of the block-size subfield payload
pub const SUB_LEN: u16 = 2;

/// Fixed gzip header length including the NanoBgzip extra field
pub const HEADER_LEN: usize = 20;
/// CRC32 plus ISIZE
pub const TRAILER_LEN: usize = 8;
/// Smallest possible member: header and trailer around an empty payload
pub const MIN_BLOCK_LEN: u32 = (HEADER_LEN + TRAILER_LEN) as u32;

/// The fixed-layout header of one NanoBgzip block
///
/// Every block is a complete gzip member whose extra field carries the total
/// member length, so a reader can hop block to block without inflating. The
/// layout (offsets, little endian):
///
/// ```text
///  0  magic 0x1f 0x8b
///  2  compression method (8)
///  3  flags (FEXTRA only)
///  4  mtime (zero)
///  8  extra flags (zero)
///  9  OS (255)
/// 10  xlen (8)
/// 12  subfield id "NA"
/// 14  subfield length (2)
/// 16  total member length, u32
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Total member length in bytes: header, deflate payload, and trailer
    pub block_size: u32,
}

impl BlockHeader {
    /// Serializes the 20-byte header
    ///
    /// # Errors
    /// Propagates write failures from the sink.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&MAGIC)?;
        out.write_u8(CM_DEFLATE)?;
        out.write_u8(FLG_FEXTRA)?;
        out.write_u32::<LittleEndian>(0)?;
        out.write_u8(0)?;
        out.write_u8(OS_UNKNOWN)?;
        out.write_u16::<LittleEndian>(XLEN)?;
        out.write_all(&SID)?;
        out.write_u16::<LittleEndian>(SUB_LEN)?;
        out.write_u32::<LittleEndian>(self.block_size)?;
        Ok(())
    }

    /// Parses a header that must be a NanoBgzip member
    ///
    /// Used at every block boundary while walking a file, so each field gets
    /// its own precise error instead of a blanket classification failure.
    ///
    /// # Errors
    /// Returns a [`FormatError`] for anything that is not a well-formed
    /// NanoBgzip header, including plain gzip members.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 2];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(FormatError::InvalidMagic(magic[0], magic[1]).into());
        }
        let cm = reader.read_u8()?;
        if cm != CM_DEFLATE {
            return Err(FormatError::InvalidMethod(cm).into());
        }
        let flg = reader.read_u8()?;
        if flg & FLG_FEXTRA == 0 {
            return Err(FormatError::MissingExtraField(flg).into());
        }
        let mut skipped = [0u8; 6];
        reader.read_exact(&mut skipped)?;
        let _xlen = reader.read_u16::<LittleEndian>()?;
        let mut sid = [0u8; 2];
        reader.read_exact(&mut sid)?;
        let sub_len = reader.read_u16::<LittleEndian>()?;
        if sid != SID || sub_len != SUB_LEN {
            return Err(FormatError::InvalidExtraField {
                sid0: sid[0],
                sid1: sid[1],
                sub_len,
            }
            .into());
        }
        let block_size = reader.read_u32::<LittleEndian>()?;
        if block_size < MIN_BLOCK_LEN {
            return Err(FormatError::BlockTooShort(block_size).into());
        }
        Ok(Self { block_size })
    }
}

/// Classifies a gzip stream by its leading header
///
/// Reads exactly the bytes needed for classification. The block size is only
/// returned for NanoBgzip members, where the extra field declares it.
///
/// # Errors
/// Returns a [`FormatError`] if the bytes are not a gzip member at all.
pub fn read_format<R: Read>(reader: &mut R) -> Result<(GzipFormat, Option<u32>)> {
    let mut magic = [0u8; 2];
    if let Err(e) = reader.read_exact(&mut magic) {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Err(FormatError::EmptyFile.into());
        }
        return Err(e.into());
    }
    if magic != MAGIC {
        return Err(FormatError::InvalidMagic(magic[0], magic[1]).into());
    }
    let cm = reader.read_u8()?;
    if cm != CM_DEFLATE {
        return Err(FormatError::InvalidMethod(cm).into());
    }
    let flg = reader.read_u8()?;
    // mtime, xfl, os carry no classification signal
    let mut skipped = [0u8; 6];
    reader.read_exact(&mut skipped)?;
    if flg & FLG_FEXTRA == 0 {
        return Ok((GzipFormat::Gzip, None));
    }
    let _xlen = reader.read_u16::<LittleEndian>()?;
    let mut sid = [0u8; 2];
    reader.read_exact(&mut sid)?;
    let sub_len = reader.read_u16::<LittleEndian>()?;
    if sid == SID_BGZF && sub_len == SUB_LEN {
        return Ok((GzipFormat::BGzip, None));
    }
    if sid == SID && sub_len == SUB_LEN {
        let block_size = reader.read_u32::<LittleEndian>()?;
        return Ok((GzipFormat::NanoBGzip, Some(block_size)));
    }
    Ok((GzipFormat::Gzip, None))
}
