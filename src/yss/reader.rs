//! Sequential, seekable reader over a save-state blob

use crate::error::{LoadError, Result};
use std::io::SeekFrom;

/// Byte order of the emulator that produced the save state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Interpret the header's endianness flag: zero means a little-endian
    /// producer, anything else big-endian.
    pub fn from_flag(flag: u8) -> Self {
        if flag == 0 {
            Endian::Little
        } else {
            Endian::Big
        }
    }
}

/// Cursor over the raw save-state bytes.
///
/// Every read either returns exactly the requested bytes or fails with
/// [`LoadError::TruncatedStream`]; there are no partial reads.
pub struct StateReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
    /// Absolute offset of `data[0]` in the file, for error reports.
    origin: u64,
}

impl<'a> StateReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        StateReader {
            data,
            pos: 0,
            endian: Endian::Little,
            origin: 0,
        }
    }

    /// Split off the next `len` bytes as a reader of their own.
    ///
    /// The new reader keeps this reader's byte order and can never see
    /// past those bytes; this reader moves past them.
    pub fn sub_reader(&mut self, len: u64) -> Result<StateReader<'a>> {
        let origin = self.origin + self.position();
        let n = usize::try_from(len).map_err(|_| self.truncated(len))?;
        let data = self.read_bytes(n)?;
        Ok(StateReader {
            data,
            pos: 0,
            endian: self.endian,
            origin,
        })
    }

    /// Byte order used for multi-byte reads.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Current absolute position.
    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    /// Total stream length.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end of the stream.
    pub fn remaining(&self) -> u64 {
        (self.data.len() - self.pos) as u64
    }

    fn truncated(&self, wanted: u64) -> LoadError {
        LoadError::TruncatedStream {
            offset: self.origin + self.position(),
            wanted,
            available: self.remaining(),
        }
    }

    /// Read `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.data.len() - self.pos {
            return Err(self.truncated(n as u64));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let raw = self.read_array::<2>()?;
        Ok(match self.endian {
            Endian::Little => u16::from_le_bytes(raw),
            Endian::Big => u16::from_be_bytes(raw),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let raw = self.read_array::<4>()?;
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let raw = self.read_array::<8>()?;
        Ok(match self.endian {
            Endian::Little => i64::from_le_bytes(raw),
            Endian::Big => i64::from_be_bytes(raw),
        })
    }

    /// Move the cursor. Targets outside `[0, len]` are rejected.
    pub fn seek(&mut self, target: SeekFrom) -> Result<u64> {
        let (base, delta) = match target {
            SeekFrom::Start(offset) => (0i128, offset as i128),
            SeekFrom::Current(delta) => (self.pos as i128, delta as i128),
            SeekFrom::End(delta) => (self.data.len() as i128, delta as i128),
        };
        let new_pos = base + delta;
        if new_pos < 0 || new_pos > self.data.len() as i128 {
            let wanted = (new_pos - self.pos as i128).unsigned_abs() as u64;
            return Err(self.truncated(wanted));
        }
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }

    /// Skip forward `n` bytes.
    pub fn skip(&mut self, n: u64) -> Result<u64> {
        self.seek(SeekFrom::Current(n as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_advance_and_honour_endianness() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut r = StateReader::new(&data);
        assert_eq!(r.read_u16().unwrap(), 0x0201);
        r.set_endian(Endian::Big);
        assert_eq!(r.read_u32().unwrap(), 0x0304_0506);
        assert_eq!(r.position(), 6);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn short_read_is_truncation() {
        let data = [0u8; 3];
        let mut r = StateReader::new(&data);
        r.read_u8().unwrap();
        match r.read_u32() {
            Err(LoadError::TruncatedStream {
                offset,
                wanted,
                available,
            }) => {
                assert_eq!(offset, 1);
                assert_eq!(wanted, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncation, got {:?}", other.map(|_| ())),
        }
        // failed reads leave the cursor alone
        assert_eq!(r.position(), 1);
    }

    #[test]
    fn seek_bounds() {
        let data = [0u8; 8];
        let mut r = StateReader::new(&data);
        assert_eq!(r.seek(SeekFrom::Start(3)).unwrap(), 3);
        assert_eq!(r.seek(SeekFrom::Current(5)).unwrap(), 8);
        assert_eq!(r.seek(SeekFrom::End(-2)).unwrap(), 6);
        assert!(r.seek(SeekFrom::Current(3)).is_err());
        assert!(r.seek(SeekFrom::Current(-7)).is_err());
        assert_eq!(r.position(), 6);
    }

    #[test]
    fn sub_reader_is_bounded() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut r = StateReader::new(&data);
        r.set_endian(Endian::Big);
        r.skip(2).unwrap();
        let mut inner = r.sub_reader(4).unwrap();
        assert_eq!(r.position(), 6);
        assert_eq!(inner.len(), 4);
        assert_eq!(inner.endian(), Endian::Big);
        assert_eq!(inner.read_u16().unwrap(), 0x0304);
        match inner.read_u32() {
            Err(LoadError::TruncatedStream {
                offset, available, ..
            }) => {
                // reported against the whole file
                assert_eq!(offset, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncation, got {:?}", other.map(|_| ())),
        }
        assert!(r.sub_reader(3).is_err());
    }

    #[test]
    fn endian_flag() {
        assert_eq!(Endian::from_flag(0), Endian::Little);
        assert_eq!(Endian::from_flag(1), Endian::Big);
    }
}
