//! Video processor memory (VDP1 / VDP2 chunks)
//!
//! Both chunks are a register block, which is skipped, followed by linear
//! RAM regions that are mapped with a word swap.

use crate::error::Result;
use crate::host::AnalysisHost;
use crate::materialize::{load_segment, SegmentSpec, Transform};
use crate::yss::chunks::ChunkHeader;
use crate::yss::reader::StateReader;

pub const VDP1_REGS_LEN: u64 = 0x30;
pub const VDP1_RAM_LEN: u32 = 0x8_0000;
pub const VDP2_REGS_LEN: u64 = 0x120;
pub const VDP2_VRAM_LEN: u32 = 0x8_0000;
pub const VDP2_CRAM_LEN: u32 = 0x1000;

/// VDP1 regions mapped at `ram_base`.
pub fn vdp1_regions(ram_base: u32) -> Result<Vec<SegmentSpec>> {
    Ok(vec![SegmentSpec::at("VDP1RAM", ram_base, VDP1_RAM_LEN)?])
}

/// VDP2 VRAM and color RAM.
pub fn vdp2_regions(vram_base: u32, cram_base: u32) -> Result<Vec<SegmentSpec>> {
    Ok(vec![
        SegmentSpec::at("VDP2RAM", vram_base, VDP2_VRAM_LEN)?,
        SegmentSpec::at("VDP2CRAM", cram_base, VDP2_CRAM_LEN)?,
    ])
}

/// Skip `regs_len` register bytes and map each region in order. `reader`
/// is left at the chunk end.
pub fn read_video_chunk<H: AnalysisHost + ?Sized>(
    reader: &mut StateReader,
    chunk: &ChunkHeader,
    host: &mut H,
    regs_len: u64,
    regions: &[SegmentSpec],
) -> Result<()> {
    let mut r = chunk.payload(reader)?;
    r.skip(regs_len)?;
    for region in regions {
        load_segment(&mut r, host, region, Transform::WordSwap)?;
    }
    Ok(())
}
