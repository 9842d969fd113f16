//! Saturn executable header ("IP") recognition

use log::debug;

use crate::host::{AnalysisHost, DataKind};

/// Tag every IP header starts with.
pub const IP_TAG: &[u8; 16] = b"SEGA SEGASATURN ";

/// String fields of the header: offset, length.
const IP_STRINGS: &[(u32, u32)] = &[
    (0x00, 16), // hardware id
    (0x10, 16), // maker id
    (0x20, 10), // product number
    (0x2A, 6),  // version
    (0x30, 8),  // release date
    (0x38, 8),  // device info
    (0x40, 10), // area symbols
    (0x4A, 6),  // spaces
    (0x50, 16), // peripherals
    (0x60, 0x70), // title
];

/// Offset of the first-read (entry) address.
const IP_ENTRY_POINTER: u32 = 0xF0;
/// Code following the header.
pub const IP_CODE_OFFSET: u32 = 0x100;

/// Annotate an IP header at `ea`.
///
/// Returns false, touching nothing, when the 16 bytes at `ea` are not
/// the IP tag. With `parse_code` the code right after the header is also
/// made a function.
pub fn find_parse_ip<H: AnalysisHost + ?Sized>(host: &mut H, ea: u32, parse_code: bool) -> bool {
    if ea.checked_add(IP_CODE_OFFSET).is_none() {
        return false;
    }
    match host.get_bytes(ea, IP_TAG.len()) {
        Some(id) if id.as_slice() == IP_TAG => {}
        _ => return false,
    }

    for &(offset, len) in IP_STRINGS {
        host.make_string(ea + offset, len);
    }
    host.make_data(ea + 0xD0, DataKind::Byte, 16);
    for offset in (0xE0..=0xEC).step_by(4) {
        host.make_data(ea + offset, DataKind::Dword, 4);
    }
    host.make_data(ea + IP_ENTRY_POINTER, DataKind::Dword, 4);
    if let Some(entry) = host.get_long(ea + IP_ENTRY_POINTER) {
        host.add_function(entry);
    }
    for offset in (0xF4..=0xFC).step_by(4) {
        host.make_data(ea + offset, DataKind::Dword, 4);
    }
    if parse_code {
        host.add_function(ea + IP_CODE_OFFSET);
    }

    debug!("IP header parsed at {:#010x}", ea);
    true
}
