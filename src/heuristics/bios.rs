//! Fixed BIOS work area layout
//!
//! The Saturn BIOS leaves a jump table and assorted system variables at
//! the bottom of high work RAM. Their positions never change, so they are
//! described by a literal table.

use log::debug;

use crate::heuristics::vectors::make_vector;
use crate::host::{AnalysisHost, DataKind};

/// One annotation in the BIOS area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiosEntry {
    Str(u32, u32),
    Bytes(u32, u32),
    Words(u32, u32),
    Dwords(u32, u32),
    Vector(u32, Option<&'static str>),
    /// Every slot in `[start, end)`.
    Vectors(u32, u32),
    Name(u32, &'static str),
    Function(u32),
}

use BiosEntry::*;

pub const BIOS_LAYOUT: &[BiosEntry] = &[
    Str(0x0600_0200, 16),
    Bytes(0x0600_0210, 36),
    Vector(0x0600_0234, None),
    Vector(0x0600_0238, None),
    Vector(0x0600_023C, None),
    Str(0x0600_0240, 4),
    Str(0x0600_0244, 4),
    Dwords(0x0600_0248, 4),
    Dwords(0x0600_024C, 4),
    Vector(0x0600_0250, None),
    Dwords(0x0600_0264, 4),
    Vector(0x0600_0268, None),
    Vector(0x0600_026C, Some("bios_run_cd_player")),
    Vector(0x0600_0270, None),
    Vector(0x0600_0274, Some("bios_is_mpeg_card_present")),
    Dwords(0x0600_0278, 4),
    Dwords(0x0600_027C, 4),
    Vector(0x0600_0280, None),
    Vector(0x0600_0284, None),
    Vector(0x0600_0288, None),
    Vector(0x0600_028C, None),
    Dwords(0x0600_0290, 4),
    Dwords(0x0600_0294, 4),
    Vector(0x0600_0298, Some("bios_get_mpeg_rom")),
    Vector(0x0600_029C, None),
    Dwords(0x0600_02A0, 4),
    Dwords(0x0600_02A4, 4),
    Dwords(0x0600_02A8, 4),
    Dwords(0x0600_02AC, 4),
    Vector(0x0600_02B0, None),
    Dwords(0x0600_02B4, 4),
    Dwords(0x0600_02B8, 4),
    Dwords(0x0600_02BC, 4),
    Dwords(0x0600_02C0, 4),
    Vectors(0x0600_02C4, 0x0600_0324),
    Name(0x0600_0300, "bios_set_scu_interrupt"),
    Name(0x0600_0304, "bios_get_scu_interrupt"),
    Name(0x0600_0310, "bios_set_sh2_interrupt"),
    Name(0x0600_0314, "bios_get_sh2_interrupt"),
    Name(0x0600_0320, "bios_set_clock_speed"),
    Dwords(0x0600_0324, 4),
    Name(0x0600_0324, "bios_get_clock_speed"),
    Vectors(0x0600_0328, 0x0600_0348),
    Name(0x0600_0340, "bios_set_scu_interrupt_mask"),
    Name(0x0600_0344, "bios_change_scu_interrupt_mask"),
    Dwords(0x0600_0348, 4),
    Name(0x0600_0348, "bios_get_scu_interrupt_mask"),
    Vector(0x0600_034C, None),
    Dwords(0x0600_0350, 4),
    Dwords(0x0600_0354, 4),
    Dwords(0x0600_0358, 4),
    Dwords(0x0600_035C, 4),
    Vectors(0x0600_0360, 0x0600_0380),
    Bytes(0x0600_0380, 16),
    Words(0x0600_0390, 16),
    Dwords(0x0600_03A0, 32),
    Str(0x0600_03C0, 0x40),
    Function(0x0600_0600),
    Function(0x0600_0646),
    Str(0x0600_065C, 4),
    Function(0x0600_0678),
    Function(0x0600_067C),
    Function(0x0600_0690),
    Dwords(0x0600_0A80, 0x80),
];

/// Apply [`BIOS_LAYOUT`] in order.
pub fn annotate_bios<H: AnalysisHost + ?Sized>(host: &mut H) {
    for entry in BIOS_LAYOUT {
        match *entry {
            Str(addr, len) => host.make_string(addr, len),
            Bytes(addr, len) => host.make_data(addr, DataKind::Byte, len),
            Words(addr, len) => host.make_data(addr, DataKind::Word, len),
            Dwords(addr, len) => host.make_data(addr, DataKind::Dword, len),
            Vector(addr, name) => make_vector(host, addr, name),
            Vectors(start, end) => {
                for addr in (start..end).step_by(4) {
                    make_vector(host, addr, None);
                }
            }
            Name(addr, name) => host.set_name(addr, name),
            Function(addr) => {
                host.add_function(addr);
            }
        }
    }
    debug!("BIOS area annotated ({} entries)", BIOS_LAYOUT.len());
}
