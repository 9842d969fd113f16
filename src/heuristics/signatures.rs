//! Middleware detection
//!
//! Games linked against Sega's SGL or SBL libraries carry version strings
//! such as `GFS_SGL Version 3.02`. Finding one picks the signature
//! database that matches the statically linked library code.

use log::{debug, info};

use crate::config::AddrRange;
use crate::host::AnalysisHost;

/// Longest version string read after a marker.
const MAX_VERSION_TEXT: usize = 512;

const SGL_MARKER: &[u8] = b"GFS_SGL ";
const SBL_MARKER: &[u8] = b"GFS_SBL ";
const CPK_MARKER: &[u8] = b"CPK Version";

/// Signature databases the loader knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureId {
    /// SGL up to 2.10
    Sgl20a,
    /// SGL 2.11
    Sgl211,
    /// SGL 2.12 and later
    Sgl302j,
    /// Cinepak player built on SGL
    CpkSgl,
    Sbl601,
    /// Cinepak player built on SBL
    CpkSbl,
}

impl SignatureId {
    /// Name of the signature file handed to the host.
    pub fn file_name(self) -> &'static str {
        match self {
            SignatureId::Sgl20a => "sgl20a.sig",
            // SGL 2.11, 3.00 and 3.02j share one database
            SignatureId::Sgl211 => "sgl302j.sig",
            SignatureId::Sgl302j => "sgl302j.sig",
            SignatureId::CpkSgl => "cpksgl.sig",
            SignatureId::Sbl601 => "sbl601.sig",
            SignatureId::CpkSbl => "cpksbl.sig",
        }
    }
}

/// Library family found in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    Sgl,
    Sbl,
}

/// Outcome of a middleware scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiddlewareScan {
    pub library: Option<Library>,
    pub version: Option<f64>,
    pub signatures: Vec<SignatureId>,
}

/// Parse the number out of text of the form `Version 2.11 ...`.
///
/// The text must start with `Version`; the first whitespace-separated word
/// after it is read as a decimal number, ignoring anything after the
/// numeric prefix.
pub fn parse_lib_version(text: &[u8]) -> Option<f64> {
    let rest = text.strip_prefix(b"Version")?;
    let word: Vec<u8> = rest
        .iter()
        .copied()
        .skip_while(u8::is_ascii_whitespace)
        .take_while(|b| !b.is_ascii_whitespace())
        .collect();
    leading_number(&word)
}

fn leading_number(word: &[u8]) -> Option<f64> {
    let mut end = 0;
    if matches!(word.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut digits = false;
    let mut dot = false;
    while end < word.len() {
        match word[end] {
            b'0'..=b'9' => digits = true,
            b'.' if !dot => dot = true,
            _ => break,
        }
        end += 1;
    }
    if !digits {
        return None;
    }
    std::str::from_utf8(&word[..end]).ok()?.parse().ok()
}

/// Pick the SGL database for a version number.
///
/// Versions strictly between 2.10 and 2.11, or between 2.11 and 2.12,
/// match nothing.
pub fn select_sgl_signature(version: f64) -> Option<SignatureId> {
    if version <= 2.10 {
        Some(SignatureId::Sgl20a)
    } else if version == 2.11 {
        Some(SignatureId::Sgl211)
    } else if version >= 2.12 {
        Some(SignatureId::Sgl302j)
    } else {
        None
    }
}

/// SGL database for the text following a `GFS_SGL ` marker.
pub fn sgl_signature_for(text: &[u8]) -> Option<SignatureId> {
    parse_lib_version(text).and_then(select_sgl_signature)
}

/// Search each window in order for `needle`.
pub fn find_string<H: AnalysisHost + ?Sized>(
    host: &H,
    windows: &[AddrRange],
    needle: &[u8],
) -> Option<u32> {
    windows
        .iter()
        .find_map(|w| host.find_binary(w.start, w.end, needle))
}

/// Read a NUL-terminated string of at most 512 bytes.
pub fn read_c_string<H: AnalysisHost + ?Sized>(host: &H, addr: u32) -> Vec<u8> {
    let mut text = Vec::new();
    for i in 0..MAX_VERSION_TEXT as u32 {
        let Some(at) = addr.checked_add(i) else {
            break;
        };
        match host.get_byte(at) {
            Some(0) | None => break,
            Some(b) => text.push(b),
        }
    }
    text
}

fn lib_version<H: AnalysisHost + ?Sized>(host: &H, marker: u32, offset: u32) -> Option<f64> {
    let at = marker.checked_add(offset)?;
    let text = read_c_string(host, at);
    let version = parse_lib_version(&text);
    debug!(
        "version text at {:#010x}: {:?} -> {:?}",
        at,
        String::from_utf8_lossy(&text),
        version
    );
    version
}

/// Look for SGL, then SBL, and choose signature databases.
///
/// SGL wins when both are present. Only reads from the host.
pub fn scan_middleware<H: AnalysisHost + ?Sized>(host: &H, windows: &[AddrRange]) -> MiddlewareScan {
    let mut scan = MiddlewareScan::default();

    if let Some(addr) = find_string(host, windows, SGL_MARKER) {
        info!("SGL detected at {:#010x}", addr);
        scan.library = Some(Library::Sgl);
        scan.version = lib_version(host, addr, SGL_MARKER.len() as u32);
        match scan.version.and_then(select_sgl_signature) {
            Some(id) => scan.signatures.push(id),
            None => debug!("no SGL signature for version {:?}", scan.version),
        }
        if let Some(cpk) = find_string(host, windows, CPK_MARKER) {
            lib_version(host, cpk, 4);
            scan.signatures.push(SignatureId::CpkSgl);
        }
    } else if let Some(addr) = find_string(host, windows, SBL_MARKER) {
        info!("SBL detected at {:#010x}", addr);
        scan.library = Some(Library::Sbl);
        scan.version = lib_version(host, addr, SBL_MARKER.len() as u32);
        scan.signatures.push(SignatureId::Sbl601);
        if let Some(cpk) = find_string(host, windows, CPK_MARKER) {
            lib_version(host, cpk, 4);
            scan.signatures.push(SignatureId::CpkSbl);
        }
    }

    scan
}

/// Queue every selected signature with the host.
pub fn apply_signatures<H: AnalysisHost + ?Sized>(host: &mut H, ids: &[SignatureId]) {
    for id in ids {
        debug!("planning signature {}", id.file_name());
        host.plan_signature(id.file_name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;
    use crate::database::Database;

    #[test]
    fn version_boundaries() {
        assert_eq!(sgl_signature_for(b"Version 2.10"), Some(SignatureId::Sgl20a));
        assert_eq!(sgl_signature_for(b"Version 2.11"), Some(SignatureId::Sgl211));
        assert_eq!(sgl_signature_for(b"Version 2.12"), Some(SignatureId::Sgl302j));
        assert_eq!(sgl_signature_for(b"Version 3.02"), Some(SignatureId::Sgl302j));
        assert_eq!(sgl_signature_for(b"Version 2.00"), Some(SignatureId::Sgl20a));
        assert_eq!(sgl_signature_for(b"Version 2.115"), None);
    }

    #[test]
    fn version_text_shapes() {
        assert_eq!(parse_lib_version(b"Version 3.02j 1997-11-18"), Some(3.02));
        assert_eq!(parse_lib_version(b"Version   1.0"), Some(1.0));
        assert_eq!(parse_lib_version(b"Version"), None);
        assert_eq!(parse_lib_version(b"Version abc"), None);
        assert_eq!(parse_lib_version(b" Version 2.10"), None);
        assert_eq!(parse_lib_version(b"version 2.10"), None);
    }

    fn db_with_text(at: u32, text: &[u8]) -> Database {
        let mut db = Database::new();
        db.add_segment(0x0600_0000, 0x0600_1000, "HWRAM");
        db.add_segment(0x0020_0000, 0x0020_1000, "LWRAM");
        let mut padded = text.to_vec();
        while padded.len() % 4 != 0 {
            padded.push(0);
        }
        for (i, c) in padded.chunks(4).enumerate() {
            db.put_long(at + i as u32 * 4, u32::from_be_bytes([c[0], c[1], c[2], c[3]]));
        }
        db
    }

    fn windows() -> Vec<AddrRange> {
        vec![
            AddrRange::new(0x0600_0000, 0x0610_0000),
            AddrRange::new(0x0020_0000, 0x0030_0000),
        ]
    }

    #[test]
    fn sgl_in_low_ram() {
        let db = db_with_text(0x0020_0100, b"GFS_SGL Version 2.11\0");
        let scan = scan_middleware(&db, &windows());
        assert_eq!(scan.library, Some(Library::Sgl));
        assert_eq!(scan.version, Some(2.11));
        assert_eq!(scan.signatures, vec![SignatureId::Sgl211]);
    }

    #[test]
    fn sgl_beats_sbl() {
        let mut db = db_with_text(0x0600_0100, b"GFS_SBL Version 6.01\0");
        for (i, c) in b"GFS_SGL Version 3.02\0\0\0\0".chunks(4).enumerate() {
            db.put_long(0x0020_0200 + i as u32 * 4, u32::from_be_bytes([c[0], c[1], c[2], c[3]]));
        }
        let scan = scan_middleware(&db, &windows());
        assert_eq!(scan.library, Some(Library::Sgl));
        assert_eq!(scan.signatures, vec![SignatureId::Sgl302j]);
    }

    #[test]
    fn sbl_with_cinepak() {
        let mut db = db_with_text(0x0600_0100, b"GFS_SBL Version 6.01\0");
        for (i, c) in b"CPK Version 1.00\0\0\0\0".chunks(4).enumerate() {
            db.put_long(0x0600_0400 + i as u32 * 4, u32::from_be_bytes([c[0], c[1], c[2], c[3]]));
        }
        let scan = scan_middleware(&db, &windows());
        assert_eq!(scan.library, Some(Library::Sbl));
        assert_eq!(scan.signatures, vec![SignatureId::Sbl601, SignatureId::CpkSbl]);
    }

    #[test]
    fn unreadable_sgl_version_still_checks_cinepak() {
        let mut db = db_with_text(0x0600_0100, b"GFS_SGL Ver 3\0");
        for (i, c) in b"CPK Version 1.00\0\0\0\0".chunks(4).enumerate() {
            db.put_long(0x0600_0400 + i as u32 * 4, u32::from_be_bytes([c[0], c[1], c[2], c[3]]));
        }
        let scan = scan_middleware(&db, &windows());
        assert_eq!(scan.version, None);
        assert_eq!(scan.signatures, vec![SignatureId::CpkSgl]);
    }

    #[test]
    fn marker_at_top_of_memory() {
        let mut db = Database::new();
        db.add_segment(0xFFFF_FFF0, u32::MAX, "TOP");
        db.put_long(0xFFFF_FFF8, u32::from_be_bytes(*b"Vers"));
        db.put_long(0xFFFF_FFFB, u32::from_be_bytes(*b"sion"));
        assert_eq!(read_c_string(&db, 0xFFFF_FFF8), b"Version".to_vec());
        assert_eq!(lib_version(&db, 0xFFFF_FFF0, 0x20), None);
    }

    #[test]
    fn nothing_found() {
        let db = db_with_text(0x0600_0100, b"NOTHING HERE\0");
        assert_eq!(scan_middleware(&db, &windows()), MiddlewareScan::default());
    }

    #[test]
    fn apply_uses_file_names() {
        let mut db = Database::new();
        apply_signatures(&mut db, &[SignatureId::Sgl20a, SignatureId::CpkSgl]);
        assert_eq!(db.signatures, vec!["sgl20a.sig", "cpksgl.sig"]);
    }
}
