//! YSS save-state container format
//!
//! YSS is the snapshot format written by the Yabause Sega Saturn emulator:
//! a short header followed by a fixed sequence of tagged subsystem chunks.

pub mod chunks;
pub mod header;
pub mod reader;

pub use chunks::{expect_chunk, ChunkHeader, ChunkTag};
pub use header::YssHeader;
pub use reader::{Endian, StateReader};

/// Magic bytes at offset 0.
pub const MAGIC: &[u8; 3] = b"YSS";

/// Label reported for recognised files.
pub const FORMAT_NAME: &str = "YSS File";

/// Check whether `bytes` looks like a YSS save state.
///
/// Only the three magic bytes are inspected.
pub fn accept(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= MAGIC.len() && &bytes[..MAGIC.len()] == MAGIC {
        Some(FORMAT_NAME)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_magic_only() {
        assert_eq!(accept(b"YSS"), Some("YSS File"));
        assert_eq!(accept(b"YSS\x00\x01\x00"), Some("YSS File"));
        assert_eq!(accept(b"YS"), None);
        assert_eq!(accept(b""), None);
        assert_eq!(accept(b"YSX\0"), None);
        assert_eq!(accept(b"yss\0"), None);
    }
}
