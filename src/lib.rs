#![crate_name = "yssload"]

pub mod config;
pub mod database;
pub mod error;
pub mod heuristics;
pub mod host;
pub mod loader;
pub mod materialize;
pub mod subsystems;
pub mod yss;

#[cfg(test)]
mod test_utils;

pub use config::SaturnLayout;
pub use database::Database;
pub use error::{ConfigError, LoadError, Result};
pub use host::{AnalysisHost, DataKind};
pub use loader::{load, LoadReport, TargetFamily};
pub use yss::accept;

/*
Saturn memory map as mapped by the loader (SH-2 view)

0x00200000  LWRAM     low work RAM, 1MB
0x05A00000  SNDRAM    sound RAM, 512KB
0x05C00000  VDP1RAM   sprite RAM, 512KB
0x05E00000  VDP2RAM   background VRAM, 512KB
0x05F00000  VDP2CRAM  color RAM, 4KB
0x06000000  HWRAM     high work RAM, 1MB
            0x06000000  master vector table
            0x06000200  BIOS work area
            0x06000400  slave vector table
            0x06000C00  IP header copy (boot)
            0x06002000  IP header (1st read)

68000 view: SNDRAM at 0x000000
DSP view:   DSPPRG at 0x000000, 256 words
*/
