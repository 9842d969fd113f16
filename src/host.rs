//! Analysis host interface
//!
//! The loader never owns the analysed address space. Everything it
//! recovers is pushed through this trait, whether the receiver is a
//! disassembler database or the in-memory [`Database`](crate::database::Database).

/// Width of a plain data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Byte,
    Word,
    Dword,
}

impl DataKind {
    /// Size of one element in bytes.
    pub fn width(self) -> u32 {
        match self {
            DataKind::Byte => 1,
            DataKind::Word => 2,
            DataKind::Dword => 4,
        }
    }
}

/// Sink for segments, annotations and navigation.
pub trait AnalysisHost {
    /// Switch the host to the processor module used for this target
    fn set_processor(&mut self, name: &str);

    /// Declare the address range `[start, end)` as a named segment.
    /// Returns false when the host refuses the range.
    fn add_segment(&mut self, start: u32, end: u32, name: &str) -> bool;

    /// Store a 32-bit value, big endian, at `addr`
    fn put_long(&mut self, addr: u32, value: u32);

    /// Read a 32-bit big-endian value; None when unmapped
    fn get_long(&self, addr: u32) -> Option<u32>;

    /// Read `len` raw bytes; None when any byte is unmapped
    fn get_bytes(&self, addr: u32, len: usize) -> Option<Vec<u8>>;

    /// Read one byte
    fn get_byte(&self, addr: u32) -> Option<u8> {
        self.get_bytes(addr, 1).map(|b| b[0])
    }

    /// Mark `len` bytes at `addr` as an array of `kind` items
    fn make_data(&mut self, addr: u32, kind: DataKind, len: u32);

    /// Mark `len` bytes at `addr` as a C string
    fn make_string(&mut self, addr: u32, len: u32);

    /// Mark `addr` as the start of an instruction
    fn make_code(&mut self, addr: u32);

    /// Create a function starting at `addr`. Returns false when the host
    /// cannot place one there (e.g. the address is unmapped).
    fn add_function(&mut self, addr: u32) -> bool;

    /// Record a code reference from `from` to `to`
    fn add_code_xref(&mut self, from: u32, to: u32);

    /// Attach a name to `addr`
    fn set_name(&mut self, addr: u32, name: &str);

    /// Queue a signature database for application by name
    fn plan_signature(&mut self, name: &str);

    /// Find `pattern` in `[start, end)`, scanning forward, case sensitive
    fn find_binary(&self, start: u32, end: u32, pattern: &[u8]) -> Option<u32>;

    /// Move the host's cursor
    fn jump_to(&mut self, addr: u32);
}
