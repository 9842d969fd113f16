//! Sound block (SCSP chunk): 68000 registers, SCSP registers, sound RAM

use log::debug;

use crate::error::Result;
use crate::host::AnalysisHost;
use crate::materialize::{load_segment, SegmentSpec, Transform};
use crate::yss::chunks::ChunkHeader;
use crate::yss::reader::StateReader;

/// D0-D7, A0-A7 and SR of the 68000.
pub const M68K_REGS_LEN: u64 = 8 * 4 + 8 * 4 + 4;
pub const SCSP_REGS_LEN: u64 = 0x1000;
pub const SOUND_RAM_LEN: u32 = 0x8_0000;

/// Which processor the sound RAM is being mapped for.
///
/// Both views map the same 0x80000 bytes; only the base and byte order
/// differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundView {
    /// The 68000 is the analysed processor: its PC is wanted and RAM is
    /// mapped at the 68000's own base.
    M68k { base: u32 },
    /// Sound RAM as seen from the SH-2 bus.
    Sh2 { base: u32 },
}

/// Decoded sound processor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundState {
    pub m68k_running: bool,
    /// 68000 program counter, only read for the 68000 view.
    pub pc: Option<u32>,
    pub ram: SegmentSpec,
}

impl SoundState {
    /// Decode the SCSP chunk and map its RAM.
    ///
    /// Extended engine state present in later chunk versions is not
    /// decoded. `reader` is left at the chunk end.
    pub fn read<H: AnalysisHost + ?Sized>(
        reader: &mut StateReader,
        chunk: &ChunkHeader,
        host: &mut H,
        view: SoundView,
    ) -> Result<Self> {
        let mut r = chunk.payload(reader)?;

        let m68k_running = r.read_u8()? != 0;
        r.skip(M68K_REGS_LEN)?;
        let pc = match view {
            SoundView::M68k { .. } => Some(r.read_u32()?),
            SoundView::Sh2 { .. } => {
                r.skip(4)?;
                None
            }
        };
        r.skip(SCSP_REGS_LEN)?;

        let (ram, transform) = match view {
            SoundView::M68k { base } => (
                SegmentSpec::at("SNDRAM", base, SOUND_RAM_LEN)?,
                Transform::Reverse,
            ),
            SoundView::Sh2 { base } => (
                SegmentSpec::at("SNDRAM", base, SOUND_RAM_LEN)?,
                Transform::WordSwap,
            ),
        };
        load_segment(&mut r, host, &ram, transform)?;

        debug!(
            "SCSP v{}: 68000 {}, pc {:?}",
            chunk.version,
            if m68k_running { "running" } else { "stopped" },
            pc
        );

        Ok(SoundState {
            m68k_running,
            pc,
            ram,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;
    use crate::database::Database;
    use crate::error::LoadError;
    use crate::yss::chunks::{expect_chunk, SCSP, SCU};

    fn scsp_chunk(extended: usize) -> Vec<u8> {
        let mut payload = vec![1u8];
        payload.extend(std::iter::repeat(0).take(M68K_REGS_LEN as usize));
        payload.extend_from_slice(&0x0000_1234u32.to_le_bytes());
        payload.extend(std::iter::repeat(0).take(SCSP_REGS_LEN as usize));
        let mut ram = vec![0u8; SOUND_RAM_LEN as usize];
        ram[..4].copy_from_slice(&[0x11, 0x22, 0x33, 0x44]);
        payload.extend_from_slice(&ram);
        payload.extend(std::iter::repeat(0xEE).take(extended));

        let mut bytes = SCSP.to_vec();
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);
        bytes
    }

    #[test]
    fn m68k_view_reads_pc_and_reverses_ram() {
        let bytes = scsp_chunk(0);
        let mut r = StateReader::new(&bytes);
        let chunk = expect_chunk(&mut r, &SCSP).unwrap();
        let mut db = Database::new();
        let state = SoundState::read(&mut r, &chunk, &mut db, SoundView::M68k { base: 0 }).unwrap();

        assert!(state.m68k_running);
        assert_eq!(state.pc, Some(0x1234));
        assert_eq!(r.position(), chunk.end());
        // first unit lands byte-swapped in the last slot
        assert_eq!(db.get_long(SOUND_RAM_LEN - 4), Some(0x1122_3344));
    }

    #[test]
    fn sh2_view_skips_pc_and_extended_state() {
        let bytes = scsp_chunk(0x200);
        let mut r = StateReader::new(&bytes);
        let chunk = expect_chunk(&mut r, &SCSP).unwrap();
        let mut db = Database::new();
        let state = SoundState::read(
            &mut r,
            &chunk,
            &mut db,
            SoundView::Sh2 { base: 0x05A0_0000 },
        )
        .unwrap();

        assert_eq!(state.pc, None);
        assert_eq!(state.ram.start, 0x05A0_0000);
        assert_eq!(r.position(), chunk.end());
        // (22 11)(44 33) read as little-endian halfwords
        assert_eq!(db.get_long(0x05A0_0000), Some(0x2211_4433));
    }

    #[test]
    fn short_chunk_does_not_borrow_from_the_next() {
        // an empty SCSP chunk followed by a large one
        let mut bytes = SCSP.to_vec();
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let mut next = scsp_chunk(0);
        next[..4].copy_from_slice(&SCU);
        bytes.extend_from_slice(&next);

        let mut r = StateReader::new(&bytes);
        let chunk = expect_chunk(&mut r, &SCSP).unwrap();
        let mut db = Database::new();
        let err = SoundState::read(
            &mut r,
            &chunk,
            &mut db,
            SoundView::Sh2 { base: 0x05A0_0000 },
        )
        .unwrap_err();

        assert!(matches!(
            err,
            LoadError::TruncatedStream {
                offset: 12,
                wanted: 1,
                available: 0
            }
        ));
        assert!(db.segment("SNDRAM").is_none());
    }

    #[test]
    fn chunk_cut_inside_ram_maps_nothing() {
        let mut bytes = scsp_chunk(0);
        let cut = (1 + M68K_REGS_LEN + 4 + SCSP_REGS_LEN) as u32 + 0x100;
        bytes[8..12].copy_from_slice(&cut.to_le_bytes());

        let mut r = StateReader::new(&bytes);
        let chunk = expect_chunk(&mut r, &SCSP).unwrap();
        let mut db = Database::new();
        let err = SoundState::read(&mut r, &chunk, &mut db, SoundView::M68k { base: 0 }).unwrap_err();

        assert!(matches!(err, LoadError::TruncatedStream { available: 0x100, .. }));
        assert!(db.segment("SNDRAM").is_none());
    }
}
