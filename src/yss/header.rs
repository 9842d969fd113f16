//! YSS file header
//!
//! ```text
//! 0..3   "YSS"
//! 3      endianness flag (0 = little endian producer)
//! 4..8   header version (1 or 2)
//! 8..12  payload size
//! 12..20 reserved, version 2 only
//! ```

use std::fmt::{Display, Error, Formatter};
use std::io::SeekFrom;

use log::debug;

use crate::error::{LoadError, Result};
use crate::yss::reader::{Endian, StateReader};

/// Header length for version 1 files.
pub const HEADER_LEN_V1: u64 = 0xC;
/// Extra reserved bytes carried by version 2 headers.
pub const HEADER_V2_EXTRA: u64 = 8;

/// Decoded top-level header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YssHeader {
    pub endian: Endian,
    pub version: u32,
    pub declared_size: u32,
    /// Bytes occupied by the header itself; chunks start here.
    pub header_len: u64,
}

impl YssHeader {
    /// Decode the header and check the declared size against the stream.
    ///
    /// The magic is not checked again here; see [`accept`](crate::yss::accept).
    /// On success the reader is left at the first chunk and switched to the
    /// producer's byte order.
    pub fn read(reader: &mut StateReader) -> Result<YssHeader> {
        reader.seek(SeekFrom::Start(3))?;
        let endian = Endian::from_flag(reader.read_u8()?);
        reader.set_endian(endian);

        let version = reader.read_u32()?;
        let declared_size = reader.read_u32()?;

        let mut header_len = HEADER_LEN_V1;
        if version == 2 {
            reader.skip(HEADER_V2_EXTRA)?;
            header_len += HEADER_V2_EXTRA;
        }

        let expected = reader.len() as i64 - header_len as i64;
        if declared_size as i64 != expected {
            return Err(LoadError::HeaderSizeMismatch {
                declared: declared_size,
                expected,
            });
        }

        debug!(
            "YSS header v{} ({:?} endian), {:#x} payload bytes",
            version, endian, declared_size
        );

        Ok(YssHeader {
            endian,
            version,
            declared_size,
            header_len,
        })
    }
}

impl Display for YssHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), Error> {
        write!(
            f,
            "
Header version:           {}
Producer byte order:      {:?}
Header length:            {:#x}
Payload size:             {:#x}
",
            self.version, self.endian, self.header_len, self.declared_size
        )
    }
}
