//! Tagged chunk envelope
//!
//! Every subsystem block is wrapped as `tag[4] version[4] size[4]` followed
//! by `size` payload bytes. Chunks appear in a fixed order and a load must
//! consume them in exactly that order.

use log::debug;

use crate::error::{LoadError, Result};
use crate::yss::reader::StateReader;

/// Four-byte chunk identifier, space padded.
pub type ChunkTag = [u8; 4];

pub const CART: ChunkTag = *b"CART";
pub const CS2: ChunkTag = *b"CS2 ";
pub const MSH2: ChunkTag = *b"MSH2";
pub const SSH2: ChunkTag = *b"SSH2";
pub const SCSP: ChunkTag = *b"SCSP";
pub const SCU: ChunkTag = *b"SCU ";
pub const SMPC: ChunkTag = *b"SMPC";
pub const VDP1: ChunkTag = *b"VDP1";
pub const VDP2: ChunkTag = *b"VDP2";
pub const OTHR: ChunkTag = *b"OTHR";

/// Order in which chunks are written by the emulator.
pub const CHUNK_ORDER: [ChunkTag; 10] = [CART, CS2, MSH2, SSH2, SCSP, SCU, SMPC, VDP1, VDP2, OTHR];

/// Printable form of a tag.
pub fn tag_name(tag: &ChunkTag) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

/// Header of one chunk, as found in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub tag: ChunkTag,
    pub version: i32,
    pub size: u32,
    /// Absolute offset of the first payload byte.
    pub payload_offset: u64,
}

impl ChunkHeader {
    /// Absolute offset just past the payload.
    pub fn end(&self) -> u64 {
        self.payload_offset + self.size as u64
    }

    /// Take the payload as a reader bounded to `size` bytes. `reader` is
    /// left at the end of the chunk.
    pub fn payload<'a>(&self, reader: &mut StateReader<'a>) -> Result<StateReader<'a>> {
        reader.sub_reader(self.size as u64)
    }

    pub fn name(&self) -> String {
        tag_name(&self.tag)
    }
}

/// Read the next chunk header and require it to carry `tag`.
///
/// A mismatch aborts the load with [`LoadError::ChunkTagMismatch`]
/// naming the expected tag.
pub fn expect_chunk(reader: &mut StateReader, tag: &ChunkTag) -> Result<ChunkHeader> {
    let found = reader.read_array::<4>()?;
    if &found != tag {
        return Err(LoadError::ChunkTagMismatch {
            expected: tag_name(tag),
            found,
        });
    }

    let version = reader.read_i32()?;
    let size = reader.read_u32()?;
    let header = ChunkHeader {
        tag: found,
        version,
        size,
        payload_offset: reader.position(),
    };
    debug!(
        "{} chunk v{} at {:#x}, {:#x} bytes",
        header.name(),
        version,
        header.payload_offset,
        size
    );
    Ok(header)
}

/// Skip a payload the current pipeline does not interpret.
pub fn skip_chunk(reader: &mut StateReader, header: &ChunkHeader) -> Result<()> {
    reader.skip(header.size as u64)?;
    Ok(())
}
