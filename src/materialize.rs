//! Copy decoded memory into host segments

use log::{debug, warn};

use crate::error::{LoadError, Result};
use crate::host::AnalysisHost;
use crate::yss::reader::StateReader;

/// Byte reordering applied while copying a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Two 16-bit units composed as `first << 16 | second`.
    WordSwap,
    /// One 32-bit unit copied as read.
    Straight,
    /// One 32-bit unit byte-swapped and written at the mirrored offset
    /// from the end of the region.
    Reverse,
}

/// Address range and name of a region to materialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSpec {
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
}

impl SegmentSpec {
    pub fn new(name: &'static str, start: u32, end: u32) -> Self {
        SegmentSpec { name, start, end }
    }

    /// Region of `len` bytes starting at `start`.
    pub fn at(name: &'static str, start: u32, len: u32) -> Result<Self> {
        let end = start
            .checked_add(len)
            .ok_or_else(|| LoadError::AddressOverflow {
                region: name.to_string(),
                base: start,
                len,
            })?;
        Ok(SegmentSpec::new(name, start, end))
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Declare `[start, end)` and fill it from the stream, 4 bytes at a time.
///
/// Consumes exactly `end - start` bytes of the stream. Nothing is declared
/// when the stream holds fewer.
pub fn load_segment<H: AnalysisHost + ?Sized>(
    reader: &mut StateReader,
    host: &mut H,
    spec: &SegmentSpec,
    transform: Transform,
) -> Result<()> {
    let len = spec.len();
    let mut reader = reader.sub_reader(len as u64)?;
    if !host.add_segment(spec.start, spec.end, spec.name) {
        warn!(
            "host refused segment {} [{:#010x}, {:#010x})",
            spec.name, spec.start, spec.end
        );
    }

    let mut offset = 0u32;
    while offset < len {
        match transform {
            Transform::WordSwap => {
                let hi = reader.read_u16()? as u32;
                let lo = reader.read_u16()? as u32;
                host.put_long(spec.start + offset, (hi << 16) | lo);
            }
            Transform::Straight => {
                let value = reader.read_u32()?;
                host.put_long(spec.start + offset, value);
            }
            Transform::Reverse => {
                let value = reader.read_u32()?.swap_bytes();
                host.put_long(spec.end - 4 - offset, value);
            }
        }
        offset += 4;
    }

    debug!(
        "materialized {} [{:#010x}, {:#010x}) with {:?}",
        spec.name, spec.start, spec.end, transform
    );
    Ok(())
}

/// Declare a segment and fill it word for word from already decoded data.
pub fn store_words<H: AnalysisHost + ?Sized>(host: &mut H, spec: &SegmentSpec, words: &[u32]) {
    if !host.add_segment(spec.start, spec.end, spec.name) {
        warn!(
            "host refused segment {} [{:#010x}, {:#010x})",
            spec.name, spec.start, spec.end
        );
    }
    for (i, word) in words.iter().enumerate() {
        let addr = match spec.start.checked_add(i as u32 * 4) {
            Some(addr) if addr < spec.end => addr,
            _ => break,
        };
        host.put_long(addr, *word);
    }
    debug!(
        "stored {} words in {} at {:#010x}",
        words.len(),
        spec.name,
        spec.start
    );
}
