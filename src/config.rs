//! Address layout used by the loader
//!
//! Every fixed address the pipeline touches lives here so a load can be
//! pointed at a different memory map without touching the decoders.
//! Region sizes are properties of the save-state format and stay in the
//! subsystem modules.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::heuristics::ip::IP_CODE_OFFSET;
use crate::loader::{HWRAM_LEN, LWRAM_LEN};
use crate::subsystems::scsp::SOUND_RAM_LEN;
use crate::subsystems::scu_dsp::PROGRAM_LEN;
use crate::subsystems::vdp::{VDP1_RAM_LEN, VDP2_CRAM_LEN, VDP2_VRAM_LEN};

/// Half-open address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AddrRange {
    pub start: u32,
    pub end: u32,
}

impl AddrRange {
    pub const fn new(start: u32, end: u32) -> Self {
        AddrRange { start, end }
    }
}

/// Location of a possible executable ("IP") header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IpHeaderSite {
    pub address: u32,
    /// Also create a function at the code following the header.
    #[serde(default)]
    pub parse_code: bool,
}

/// Saturn memory map as seen by the analysis host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SaturnLayout {
    pub hwram_base: u32,
    pub lwram_base: u32,
    pub vdp1_ram_base: u32,
    pub vdp2_vram_base: u32,
    pub vdp2_cram_base: u32,
    /// Sound RAM when the 68000 is the analysed processor.
    pub sound_ram_base: u32,
    /// Sound RAM as mapped into the SH-2 address space.
    pub sound_ram_sh2_base: u32,
    pub dsp_program_base: u32,
    /// Backup RAM image at the start of the OTHR chunk, skipped.
    pub backup_ram_len: u32,
    pub vector_tables: Vec<AddrRange>,
    pub ip_headers: Vec<IpHeaderSite>,
    /// Windows searched, in order, for middleware version strings.
    pub signature_windows: Vec<AddrRange>,
}

impl Default for SaturnLayout {
    fn default() -> Self {
        SaturnLayout {
            hwram_base: 0x0600_0000,
            lwram_base: 0x0020_0000,
            vdp1_ram_base: 0x05C0_0000,
            vdp2_vram_base: 0x05E0_0000,
            vdp2_cram_base: 0x05F0_0000,
            sound_ram_base: 0x0000_0000,
            sound_ram_sh2_base: 0x05A0_0000,
            dsp_program_base: 0x0000_0000,
            backup_ram_len: 0x1_0000,
            // master then slave SH-2 vector tables
            vector_tables: vec![
                AddrRange::new(0x0600_0000, 0x0600_0200),
                AddrRange::new(0x0600_0400, 0x0600_0600),
            ],
            ip_headers: vec![
                IpHeaderSite {
                    address: 0x0600_0C00,
                    parse_code: false,
                },
                IpHeaderSite {
                    address: 0x0600_2000,
                    parse_code: true,
                },
            ],
            signature_windows: vec![
                AddrRange::new(0x0600_0000, 0x0610_0000),
                AddrRange::new(0x0020_0000, 0x0030_0000),
            ],
        }
    }
}

impl SaturnLayout {
    /// Parse a layout from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let layout: SaturnLayout = toml::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that every region fits in the 32-bit address space and that
    /// no range is reversed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let regions = [
            ("HWRAM", self.hwram_base, HWRAM_LEN),
            ("LWRAM", self.lwram_base, LWRAM_LEN),
            ("VDP1RAM", self.vdp1_ram_base, VDP1_RAM_LEN),
            ("VDP2RAM", self.vdp2_vram_base, VDP2_VRAM_LEN),
            ("VDP2CRAM", self.vdp2_cram_base, VDP2_CRAM_LEN),
            ("SNDRAM", self.sound_ram_base, SOUND_RAM_LEN),
            ("SNDRAM (SH-2)", self.sound_ram_sh2_base, SOUND_RAM_LEN),
            ("DSPPRG", self.dsp_program_base, PROGRAM_LEN),
        ];
        for (region, base, len) in regions {
            if base.checked_add(len).is_none() {
                return Err(ConfigError::RegionOverflow { region, base, len });
            }
        }
        for site in &self.ip_headers {
            if site.address.checked_add(IP_CODE_OFFSET).is_none() {
                return Err(ConfigError::RegionOverflow {
                    region: "IP header",
                    base: site.address,
                    len: IP_CODE_OFFSET,
                });
            }
        }

        let ranges = self
            .vector_tables
            .iter()
            .map(|r| ("vector table", r))
            .chain(self.signature_windows.iter().map(|r| ("signature window", r)));
        for (name, range) in ranges {
            if range.start > range.end {
                return Err(ConfigError::ReversedRange {
                    name,
                    start: range.start,
                    end: range.end,
                });
            }
        }
        Ok(())
    }
}
