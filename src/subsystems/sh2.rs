//! SH-2 register block (MSH2 / SSH2 chunks)

use std::fmt::{Display, Error, Formatter};

use crate::error::Result;
use crate::yss::chunks::ChunkHeader;
use crate::yss::reader::StateReader;

/// Size of the register block: 16 general registers and 7 control registers.
pub const SH2_REGS_LEN: usize = 23 * 4;

/// Register file of one SH-2 core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sh2Registers {
    pub r: [u32; 16],
    pub sr: u32,
    pub gbr: u32,
    pub vbr: u32,
    pub mach: u32,
    pub macl: u32,
    pub pr: u32,
    pub pc: u32,
}

impl Sh2Registers {
    /// Decode the payload of an MSH2 or SSH2 chunk.
    ///
    /// The slave core's chunk carries one leading byte before its
    /// registers. Whatever follows the register block is skipped.
    pub fn read(reader: &mut StateReader, chunk: &ChunkHeader, slave: bool) -> Result<Self> {
        let mut r = chunk.payload(reader)?;
        if slave {
            r.skip(1)?;
        }

        let mut regs = Sh2Registers::default();
        for reg in regs.r.iter_mut() {
            *reg = r.read_u32()?;
        }
        regs.sr = r.read_u32()?;
        regs.gbr = r.read_u32()?;
        regs.vbr = r.read_u32()?;
        regs.mach = r.read_u32()?;
        regs.macl = r.read_u32()?;
        regs.pr = r.read_u32()?;
        regs.pc = r.read_u32()?;

        Ok(regs)
    }
}

impl Display for Sh2Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), Error> {
        for (i, row) in self.r.chunks(4).enumerate() {
            for (j, value) in row.iter().enumerate() {
                write!(f, "R{:<2} {:08x}  ", i * 4 + j, value)?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "SR  {:08x}  GBR {:08x}  VBR {:08x}",
            self.sr, self.gbr, self.vbr
        )?;
        writeln!(f, "MACH {:08x} MACL {:08x}", self.mach, self.macl)?;
        write!(f, "PR  {:08x}  PC  {:08x}", self.pr, self.pc)
    }
}
