//! In-memory analysis database
//!
//! A self-contained [`AnalysisHost`] that keeps every segment and
//! annotation the loader produces. The command-line tool prints it and the
//! tests inspect it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Error, Formatter};

use indexmap::IndexMap;

use crate::host::{AnalysisHost, DataKind};

/// One named region of the emulated address space.
#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub start: u32,
    pub end: u32,
    pub data: Vec<u8>,
}

impl Segment {
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr < self.end
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Typing applied to an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Data { kind: DataKind, len: u32 },
    String { len: u32 },
    Code,
}

/// Recorded analysis state.
#[derive(Debug, Default)]
pub struct Database {
    pub processor: Option<String>,
    pub segments: Vec<Segment>,
    pub items: BTreeMap<u32, Item>,
    pub functions: BTreeSet<u32>,
    pub xrefs: Vec<(u32, u32)>,
    pub names: IndexMap<u32, String>,
    pub signatures: Vec<String>,
    pub cursor: Option<u32>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name == name)
    }

    pub fn segment_at(&self, addr: u32) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains(addr))
    }

    fn segment_at_mut(&mut self, addr: u32) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.contains(addr))
    }

    pub fn name_at(&self, addr: u32) -> Option<&str> {
        self.names.get(&addr).map(String::as_str)
    }

    pub fn item_at(&self, addr: u32) -> Option<Item> {
        self.items.get(&addr).copied()
    }

    /// Address of a name, if assigned.
    pub fn address_of(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(addr, _)| *addr)
    }

    /// Total annotation count: items, functions, xrefs and names.
    pub fn annotation_count(&self) -> usize {
        self.items.len() + self.functions.len() + self.xrefs.len() + self.names.len()
    }
}

impl AnalysisHost for Database {
    fn set_processor(&mut self, name: &str) {
        self.processor = Some(name.to_string());
    }

    fn add_segment(&mut self, start: u32, end: u32, name: &str) -> bool {
        if end <= start {
            return false;
        }
        let overlaps = self
            .segments
            .iter()
            .any(|s| start < s.end && s.start < end);
        if overlaps {
            return false;
        }
        self.segments.push(Segment {
            name: name.to_string(),
            start,
            end,
            data: vec![0; (end - start) as usize],
        });
        self.segments.sort_by_key(|s| s.start);
        true
    }

    fn put_long(&mut self, addr: u32, value: u32) {
        if let Some(seg) = self.segment_at_mut(addr) {
            let off = (addr - seg.start) as usize;
            if off + 4 <= seg.data.len() {
                seg.data[off..off + 4].copy_from_slice(&value.to_be_bytes());
            }
        }
    }

    fn get_long(&self, addr: u32) -> Option<u32> {
        let bytes = self.get_bytes(addr, 4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn get_bytes(&self, addr: u32, len: usize) -> Option<Vec<u8>> {
        let seg = self.segment_at(addr)?;
        let off = (addr - seg.start) as usize;
        seg.data.get(off..off.checked_add(len)?).map(<[u8]>::to_vec)
    }

    fn make_data(&mut self, addr: u32, kind: DataKind, len: u32) {
        self.items.insert(addr, Item::Data { kind, len });
    }

    fn make_string(&mut self, addr: u32, len: u32) {
        self.items.insert(addr, Item::String { len });
    }

    fn make_code(&mut self, addr: u32) {
        if self.segment_at(addr).is_some() {
            self.items.insert(addr, Item::Code);
        }
    }

    fn add_function(&mut self, addr: u32) -> bool {
        if self.segment_at(addr).is_none() {
            return false;
        }
        self.functions.insert(addr);
        true
    }

    fn add_code_xref(&mut self, from: u32, to: u32) {
        self.xrefs.push((from, to));
    }

    fn set_name(&mut self, addr: u32, name: &str) {
        self.names.insert(addr, name.to_string());
    }

    fn plan_signature(&mut self, name: &str) {
        self.signatures.push(name.to_string());
    }

    fn find_binary(&self, start: u32, end: u32, pattern: &[u8]) -> Option<u32> {
        if pattern.is_empty() {
            return None;
        }
        for seg in &self.segments {
            let lo = start.max(seg.start);
            let hi = end.min(seg.end);
            if lo >= hi {
                continue;
            }
            let window = &seg.data[(lo - seg.start) as usize..(hi - seg.start) as usize];
            if let Some(pos) = window.windows(pattern.len()).position(|w| w == pattern) {
                return Some(lo + pos as u32);
            }
        }
        None
    }

    fn jump_to(&mut self, addr: u32) {
        self.cursor = Some(addr);
    }
}

impl Display for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        writeln!(
            f,
            "Processor:                {}",
            self.processor.as_deref().unwrap_or("<none>")
        )?;
        writeln!(f, "\n    base        end         size")?;
        for seg in &self.segments {
            writeln!(
                f,
                "    {:#010x}  {:#010x}  {:#08x}  {}",
                seg.start,
                seg.end,
                seg.len(),
                seg.name
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Data items:               {}", self.items.len())?;
        writeln!(f, "Functions:                {}", self.functions.len())?;
        writeln!(f, "Code references:          {}", self.xrefs.len())?;
        writeln!(f, "Names:                    {}", self.names.len())?;
        if !self.signatures.is_empty() {
            writeln!(f, "Signatures:               {}", self.signatures.join(", "))?;
        }
        match self.cursor {
            Some(addr) => writeln!(f, "Cursor:                   {:#010x}", addr),
            None => writeln!(f, "Cursor:                   <unset>"),
        }
    }
}
