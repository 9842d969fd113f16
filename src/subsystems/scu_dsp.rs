//! SCU DSP state (SCU chunk)
//!
//! The SCU chunk starts with the SCU register file followed by the DSP's
//! registers, program RAM and data RAM. The whole structure is read as
//! one block and decoded from there.

use bitreader::{BitReader, BitReaderError};
use log::debug;

use crate::error::Result;
use crate::host::AnalysisHost;
use crate::materialize::{store_words, SegmentSpec};
use crate::yss::chunks::ChunkHeader;
use crate::yss::reader::StateReader;

/// SCU register file preceding the DSP block.
pub const SCU_REGS_LEN: usize = 0xD0;
/// Words of DSP program RAM.
pub const PROGRAM_WORDS: usize = 256;
/// Bytes of program RAM once mapped.
pub const PROGRAM_LEN: u32 = PROGRAM_WORDS as u32 * 4;
pub const DATA_BANKS: usize = 4;
pub const DATA_BANK_WORDS: usize = 64;
/// DSP registers ahead of program RAM.
pub const DSP_REGS_LEN: usize = 72;
pub const DSP_BLOCK_LEN: usize =
    DSP_REGS_LEN + PROGRAM_WORDS * 4 + DATA_BANKS * DATA_BANK_WORDS * 4;
/// Everything read from the start of the SCU payload.
pub const SCU_DSP_BLOCK_LEN: usize = SCU_REGS_LEN + DSP_BLOCK_LEN;

/// Program control port, decoded from its hardware bit positions.
///
/// ```text
/// 31..27  -
/// 26      PR  pause reset
/// 25      EP  execute pause
/// 24      -
/// 23      T0  D0 bus in use
/// 22..19  S Z C V
/// 18      E   end interrupt
/// 17      ES  step
/// 16      EX  execute
/// 15      LE  program address load enable
/// 14..8   -
/// 7..0    P   program address
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DspControlPort {
    pub program_address: u8,
    pub load_enable: bool,
    pub execute: bool,
    pub step: bool,
    pub end: bool,
    pub overflow: bool,
    pub carry: bool,
    pub zero: bool,
    pub sign: bool,
    pub bus_in_use: bool,
    pub execute_pause: bool,
    pub pause_reset: bool,
}

impl DspControlPort {
    pub fn from_word(word: u32) -> std::result::Result<Self, BitReaderError> {
        let bytes = word.to_be_bytes();
        let mut br = BitReader::new(&bytes);

        br.skip(5)?;
        let pause_reset = br.read_bool()?;
        let execute_pause = br.read_bool()?;
        br.skip(1)?;
        let bus_in_use = br.read_bool()?;
        let sign = br.read_bool()?;
        let zero = br.read_bool()?;
        let carry = br.read_bool()?;
        let overflow = br.read_bool()?;
        let end = br.read_bool()?;
        let step = br.read_bool()?;
        let execute = br.read_bool()?;
        let load_enable = br.read_bool()?;
        br.skip(7)?;
        let program_address = br.read_u8(8)?;

        Ok(DspControlPort {
            program_address,
            load_enable,
            execute,
            step,
            end,
            overflow,
            carry,
            zero,
            sign,
            bus_in_use,
            execute_pause,
            pause_reset,
        })
    }
}

/// 48-bit DSP register stored in a 64-bit slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reg48(pub i64);

impl Reg48 {
    pub fn low(self) -> u32 {
        self.0 as u32
    }

    pub fn high(self) -> u16 {
        (self.0 >> 32) as u16
    }

    /// Signed value of the low 48 bits.
    pub fn value(self) -> i64 {
        (self.0 << 16) >> 16
    }
}

/// Decoded SCU DSP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScuDspState {
    pub control: DspControlPort,
    pub raw_control: u32,
    pub pc: u8,
    /// Loop top register.
    pub top: u8,
    /// Loop counter.
    pub lop: u16,
    pub jump_address: i32,
    pub delayed: i32,
    pub data_ram_page: u8,
    pub data_ram_read_address: u8,
    /// Data RAM address counters, one per bank.
    pub ct: [u8; 4],
    pub rx: u32,
    pub ry: u32,
    pub ra0: u32,
    pub wa0: u32,
    pub ac: Reg48,
    pub p: Reg48,
    pub alu: Reg48,
    pub mul: Reg48,
    pub program: Vec<u32>,
    pub data: [[u32; DATA_BANK_WORDS]; DATA_BANKS],
}

impl ScuDspState {
    /// Decode the SCU chunk payload and leave the reader at the chunk end.
    pub fn read(reader: &mut StateReader, chunk: &ChunkHeader) -> Result<Self> {
        let mut body = chunk.payload(reader)?;
        let mut r = body.sub_reader(SCU_DSP_BLOCK_LEN as u64)?;
        r.skip(SCU_REGS_LEN as u64)?;

        let raw_control = r.read_u32()?;
        // four bytes always hold the 32 bits the decoder asks for
        let control = DspControlPort::from_word(raw_control).unwrap_or_default();
        let pc = r.read_u8()?;
        let top = r.read_u8()?;
        let lop = r.read_u16()?;
        let jump_address = r.read_i32()?;
        let delayed = r.read_i32()?;
        let data_ram_page = r.read_u8()?;
        let data_ram_read_address = r.read_u8()?;
        let ct = r.read_array::<4>()?;
        r.skip(2)?;
        let rx = r.read_u32()?;
        let ry = r.read_u32()?;
        let ra0 = r.read_u32()?;
        let wa0 = r.read_u32()?;
        let ac = Reg48(r.read_i64()?);
        let p = Reg48(r.read_i64()?);
        let alu = Reg48(r.read_i64()?);
        let mul = Reg48(r.read_i64()?);

        let mut program = Vec::with_capacity(PROGRAM_WORDS);
        for _ in 0..PROGRAM_WORDS {
            program.push(r.read_u32()?);
        }
        let mut data = [[0u32; DATA_BANK_WORDS]; DATA_BANKS];
        for bank in data.iter_mut() {
            for word in bank.iter_mut() {
                *word = r.read_u32()?;
            }
        }

        debug!(
            "SCU DSP: P={:#04x} PC={:#04x} EX={} E={}",
            control.program_address, pc, control.execute, control.end
        );

        Ok(ScuDspState {
            control,
            raw_control,
            pc,
            top,
            lop,
            jump_address,
            delayed,
            data_ram_page,
            data_ram_read_address,
            ct,
            rx,
            ry,
            ra0,
            wa0,
            ac,
            p,
            alu,
            mul,
            program,
            data,
        })
    }

    /// Program counter as reported by the control port.
    pub fn program_counter(&self) -> u8 {
        self.control.program_address
    }

    /// Copy program RAM into a segment at `base`, one word per 4 bytes.
    /// Returns the segment and the byte address of the program counter.
    pub fn load_program<H: AnalysisHost + ?Sized>(
        &self,
        host: &mut H,
        base: u32,
    ) -> Result<(SegmentSpec, u32)> {
        let spec = SegmentSpec::at("DSPPRG", base, PROGRAM_LEN)?;
        store_words(host, &spec, &self.program);
        let cursor = spec.start + self.program_counter() as u32 * 4;
        Ok((spec, cursor))
    }
}
