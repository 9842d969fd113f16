//! Error handling for save-state loading

use thiserror::Error;

/// Result alias used throughout the loader.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Structural errors that abort a load.
///
/// All of these are fatal: the pipeline stops at the first one and no
/// state is rolled back.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Fewer bytes were available than a read or seek required.
    #[error("truncated file: needed {wanted} bytes at offset {offset:#x}, {available} available")]
    TruncatedStream {
        /// Stream position where the access started.
        offset: u64,
        /// Number of bytes the access needed.
        wanted: u64,
        /// Number of bytes left in the stream.
        available: u64,
    },
    /// The header's declared payload size disagrees with the file length.
    #[error("header size isn't valid: declared {declared:#x}, file carries {expected:#x}")]
    HeaderSizeMismatch {
        /// Payload size written in the header.
        declared: u32,
        /// File length minus header length.
        expected: i64,
    },
    /// The chunk at the current position does not carry the expected tag.
    #[error("invalid {} chunk", .expected.trim_end())]
    ChunkTagMismatch {
        /// Tag the pipeline expected at this position.
        expected: String,
        /// Raw tag bytes found in the stream.
        found: [u8; 4],
    },
    /// A region placed at `base` would run past the end of the 32-bit
    /// address space.
    #[error("{region} at {base:#010x} with {len:#x} bytes runs past the end of the address space")]
    AddressOverflow {
        region: String,
        base: u32,
        len: u32,
    },
    /// The address layout handed to the loader is unusable.
    #[error(transparent)]
    Layout(#[from] ConfigError),
}

impl LoadError {
    /// Name of the failing chunk, for tag mismatches.
    pub fn chunk_tag(&self) -> Option<&str> {
        match self {
            LoadError::ChunkTagMismatch { expected, .. } => Some(expected.as_str()),
            _ => None,
        }
    }
}

/// Errors raised while reading a layout file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The layout file could not be read.
    #[error("cannot read layout file: {0}")]
    Io(#[from] std::io::Error),
    /// The layout file is not valid TOML for a [`SaturnLayout`](crate::config::SaturnLayout).
    #[error("invalid layout file: {0}")]
    Parse(#[from] toml::de::Error),
    /// A layout region does not fit in the 32-bit address space.
    #[error("layout region {region} at {base:#010x} with {len:#x} bytes runs past the end of the address space")]
    RegionOverflow {
        region: &'static str,
        base: u32,
        len: u32,
    },
    /// A layout range whose start lies past its end.
    #[error("layout range {name} [{start:#010x}, {end:#010x}) is reversed")]
    ReversedRange {
        name: &'static str,
        start: u32,
        end: u32,
    },
}
