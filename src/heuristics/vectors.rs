//! Exception vector tables

use log::debug;

use crate::config::AddrRange;
use crate::host::{AnalysisHost, DataKind};

/// Turn the long at `addr` into a code pointer: type the slot as a dword,
/// start a function at its target and link the two.
pub fn make_vector<H: AnalysisHost + ?Sized>(host: &mut H, addr: u32, name: Option<&str>) {
    host.make_data(addr, DataKind::Dword, 4);
    if let Some(target) = host.get_long(addr) {
        host.make_code(target);
        host.add_function(target);
        host.add_code_xref(addr, target);
    }
    if let Some(name) = name {
        host.set_name(addr, name);
    }
}

/// Walk every slot of each table, 4 bytes apart.
pub fn identify_vector_tables<H: AnalysisHost + ?Sized>(host: &mut H, tables: &[AddrRange]) {
    for table in tables {
        for addr in (table.start..table.end).step_by(4) {
            make_vector(host, addr, None);
        }
        debug!(
            "vector table [{:#010x}, {:#010x}) walked",
            table.start, table.end
        );
    }
}
