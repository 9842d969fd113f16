//! Post-load analysis of SH-2 work RAM
//!
//! Run after the memory image is in place: vector tables, the BIOS work
//! area, executable headers and finally middleware signatures.

pub mod bios;
pub mod ip;
pub mod signatures;
pub mod vectors;

use log::{debug, info};

use crate::config::SaturnLayout;
use crate::host::AnalysisHost;

pub use bios::annotate_bios;
pub use ip::find_parse_ip;
pub use signatures::{
    apply_signatures, parse_lib_version, scan_middleware, select_sgl_signature, Library,
    MiddlewareScan, SignatureId,
};
pub use vectors::{identify_vector_tables, make_vector};

/// Apply every heuristic in order and return what the middleware scan
/// found.
pub fn run_heuristics<H: AnalysisHost + ?Sized>(host: &mut H, layout: &SaturnLayout) -> MiddlewareScan {
    identify_vector_tables(host, &layout.vector_tables);
    annotate_bios(host);

    for site in &layout.ip_headers {
        if find_parse_ip(host, site.address, site.parse_code) {
            info!("IP header found at {:#010x}", site.address);
        } else {
            debug!("no IP header at {:#010x}", site.address);
        }
    }

    let scan = scan_middleware(host, &layout.signature_windows);
    apply_signatures(host, &scan.signatures);
    scan
}
