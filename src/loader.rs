//! Save-state loading pipeline
//!
//! Every target walks the same fixed chunk sequence. What differs is which
//! chunks are decoded, which are skipped and where the cursor ends up, so
//! each target family is described by a list of `(tag, action)` pairs.

use std::fmt::{Display, Error, Formatter};
use std::str::FromStr;

use log::{debug, error, info};

use crate::config::SaturnLayout;
use crate::error::Result;
use crate::heuristics::{run_heuristics, MiddlewareScan};
use crate::host::AnalysisHost;
use crate::materialize::{load_segment, SegmentSpec, Transform};
use crate::subsystems::vdp::{read_video_chunk, vdp1_regions, vdp2_regions, VDP1_REGS_LEN, VDP2_REGS_LEN};
use crate::subsystems::{ScuDspState, Sh2Registers, SoundState, SoundView};
use crate::yss::chunks::{skip_chunk, ChunkTag, CHUNK_ORDER, MSH2, OTHR, SCSP, SCU, SSH2, VDP1, VDP2};
use crate::yss::{expect_chunk, ChunkHeader, Endian, StateReader, YssHeader};

pub const HWRAM_LEN: u32 = 0x10_0000;
pub const LWRAM_LEN: u32 = 0x10_0000;

/// Processor the loaded image is analysed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFamily {
    /// The sound 68000.
    M68k,
    /// The master SH-2, with the whole work RAM image.
    Sh2,
    ScuDsp,
    ScuDsp2,
}

impl TargetFamily {
    pub const ALL: [TargetFamily; 4] = [
        TargetFamily::M68k,
        TargetFamily::Sh2,
        TargetFamily::ScuDsp,
        TargetFamily::ScuDsp2,
    ];

    /// Processor module name handed to the host.
    pub fn processor_name(self) -> &'static str {
        match self {
            TargetFamily::M68k => "68000",
            TargetFamily::Sh2 => "sh3b",
            TargetFamily::ScuDsp => "scudsp",
            TargetFamily::ScuDsp2 => "scudsp2",
        }
    }

    fn is_dsp(self) -> bool {
        matches!(self, TargetFamily::ScuDsp | TargetFamily::ScuDsp2)
    }
}

impl FromStr for TargetFamily {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m68k" | "68k" | "68000" => Ok(TargetFamily::M68k),
            "sh2" | "sh" | "sh3b" => Ok(TargetFamily::Sh2),
            "scudsp" | "dsp" => Ok(TargetFamily::ScuDsp),
            "scudsp2" | "dsp2" => Ok(TargetFamily::ScuDsp2),
            other => Err(format!(
                "unknown target '{}' (expected sh2, m68k, scudsp or scudsp2)",
                other
            )),
        }
    }
}

impl Display for TargetFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), Error> {
        let name = match self {
            TargetFamily::M68k => "m68k",
            TargetFamily::Sh2 => "sh2",
            TargetFamily::ScuDsp => "scudsp",
            TargetFamily::ScuDsp2 => "scudsp2",
        };
        write!(f, "{}", name)
    }
}

/// What to do with one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkAction {
    Skip,
    Sh2 { slave: bool },
    /// Sound block; `primary` maps RAM for the 68000 and keeps its PC.
    Sound { primary: bool },
    /// SCU block; `materialize` maps DSP program RAM and keeps its PC.
    Scu { materialize: bool },
    Vdp1,
    Vdp2,
    /// Backup RAM followed by high and low work RAM.
    WorkRam,
}

/// Chunk sequence for a target family.
pub fn pipeline(family: TargetFamily) -> Vec<(ChunkTag, ChunkAction)> {
    CHUNK_ORDER
        .iter()
        .map(|&tag| (tag, action_for(family, tag)))
        .collect()
}

fn action_for(family: TargetFamily, tag: ChunkTag) -> ChunkAction {
    match family {
        TargetFamily::M68k if tag == SCSP => ChunkAction::Sound { primary: true },
        TargetFamily::Sh2 => match tag {
            MSH2 => ChunkAction::Sh2 { slave: false },
            SSH2 => ChunkAction::Sh2 { slave: true },
            SCSP => ChunkAction::Sound { primary: false },
            SCU => ChunkAction::Scu { materialize: false },
            VDP1 => ChunkAction::Vdp1,
            VDP2 => ChunkAction::Vdp2,
            OTHR => ChunkAction::WorkRam,
            _ => ChunkAction::Skip,
        },
        f if f.is_dsp() && tag == SCU => ChunkAction::Scu { materialize: true },
        _ => ChunkAction::Skip,
    }
}

/// Per-load state threaded through the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct LoadContext<'a> {
    pub endian: Endian,
    pub layout: &'a SaturnLayout,
    pub family: TargetFamily,
}

/// Everything recovered by one load.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub family: TargetFamily,
    pub header: YssHeader,
    pub chunks: Vec<ChunkHeader>,
    pub master: Option<Sh2Registers>,
    pub slave: Option<Sh2Registers>,
    pub dsp: Option<ScuDspState>,
    pub sound: Option<SoundState>,
    pub segments: Vec<SegmentSpec>,
    pub middleware: Option<MiddlewareScan>,
    pub cursor: Option<u32>,
}

impl LoadReport {
    fn new(family: TargetFamily, header: YssHeader) -> Self {
        LoadReport {
            family,
            header,
            chunks: Vec::new(),
            master: None,
            slave: None,
            dsp: None,
            sound: None,
            segments: Vec::new(),
            middleware: None,
            cursor: None,
        }
    }

    pub fn chunk(&self, tag: &ChunkTag) -> Option<&ChunkHeader> {
        self.chunks.iter().find(|c| &c.tag == tag)
    }
}

/// Decode `bytes` into `host` as the given target.
///
/// The first structural error ends the load; whatever was already mapped
/// stays in the host.
pub fn load<H: AnalysisHost + ?Sized>(
    bytes: &[u8],
    host: &mut H,
    family: TargetFamily,
    layout: &SaturnLayout,
) -> Result<LoadReport> {
    host.set_processor(family.processor_name());
    run(bytes, host, family, layout).map_err(|e| {
        error!("{}", e);
        e
    })
}

fn run<H: AnalysisHost + ?Sized>(
    bytes: &[u8],
    host: &mut H,
    family: TargetFamily,
    layout: &SaturnLayout,
) -> Result<LoadReport> {
    layout.validate()?;
    let mut reader = StateReader::new(bytes);
    let header = YssHeader::read(&mut reader)?;
    let ctx = LoadContext {
        endian: header.endian,
        layout,
        family,
    };
    info!(
        "loading YSS v{} ({:?} endian) as {}",
        header.version, ctx.endian, ctx.family
    );

    let mut report = LoadReport::new(family, header);
    let mut dsp_cursor = None;
    for (tag, action) in pipeline(family) {
        let chunk = expect_chunk(&mut reader, &tag)?;
        report.chunks.push(chunk);
        if let Some(addr) = decode_chunk(&mut reader, host, &ctx, &chunk, action, &mut report)? {
            dsp_cursor = Some(addr);
        }
    }

    if family == TargetFamily::Sh2 {
        report.middleware = Some(run_heuristics(host, layout));
    }

    report.cursor = match family {
        TargetFamily::M68k => report.sound.as_ref().and_then(|s| s.pc),
        TargetFamily::Sh2 => report.master.map(|r| r.pc),
        TargetFamily::ScuDsp | TargetFamily::ScuDsp2 => dsp_cursor,
    };
    if let Some(addr) = report.cursor {
        info!("cursor at {:#010x}", addr);
        host.jump_to(addr);
    }

    Ok(report)
}

/// Run one action. Returns the DSP program counter address when program
/// RAM was mapped.
fn decode_chunk<H: AnalysisHost + ?Sized>(
    reader: &mut StateReader,
    host: &mut H,
    ctx: &LoadContext,
    chunk: &ChunkHeader,
    action: ChunkAction,
    report: &mut LoadReport,
) -> Result<Option<u32>> {
    let layout = ctx.layout;
    match action {
        ChunkAction::Skip => {
            debug!("skipping {} chunk", chunk.name());
            skip_chunk(reader, chunk)?;
        }
        ChunkAction::Sh2 { slave } => {
            let regs = Sh2Registers::read(reader, chunk, slave)?;
            debug!("{} PC {:#010x}", chunk.name(), regs.pc);
            if slave {
                report.slave = Some(regs);
            } else {
                report.master = Some(regs);
            }
        }
        ChunkAction::Sound { primary } => {
            let view = if primary {
                SoundView::M68k {
                    base: layout.sound_ram_base,
                }
            } else {
                SoundView::Sh2 {
                    base: layout.sound_ram_sh2_base,
                }
            };
            let sound = SoundState::read(reader, chunk, host, view)?;
            report.segments.push(sound.ram.clone());
            report.sound = Some(sound);
        }
        ChunkAction::Scu { materialize } => {
            let dsp = ScuDspState::read(reader, chunk)?;
            let mut cursor = None;
            if materialize {
                let (program, pc) = dsp.load_program(host, layout.dsp_program_base)?;
                report.segments.push(program);
                cursor = Some(pc);
            }
            report.dsp = Some(dsp);
            return Ok(cursor);
        }
        ChunkAction::Vdp1 => {
            let regions = vdp1_regions(layout.vdp1_ram_base)?;
            read_video_chunk(reader, chunk, host, VDP1_REGS_LEN, &regions)?;
            report.segments.extend(regions);
        }
        ChunkAction::Vdp2 => {
            let regions = vdp2_regions(layout.vdp2_vram_base, layout.vdp2_cram_base)?;
            read_video_chunk(reader, chunk, host, VDP2_REGS_LEN, &regions)?;
            report.segments.extend(regions);
        }
        ChunkAction::WorkRam => {
            let mut r = chunk.payload(reader)?;
            r.skip(layout.backup_ram_len as u64)?;
            let hwram = SegmentSpec::at("HWRAM", layout.hwram_base, HWRAM_LEN)?;
            let lwram = SegmentSpec::at("LWRAM", layout.lwram_base, LWRAM_LEN)?;
            load_segment(&mut r, host, &hwram, Transform::WordSwap)?;
            load_segment(&mut r, host, &lwram, Transform::WordSwap)?;
            report.segments.push(hwram);
            report.segments.push(lwram);
        }
    }
    Ok(None)
}

impl Display for LoadReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), Error> {
        write!(f, "{}", self.header)?;
        writeln!(f, "Target:                   {}", self.family)?;
        writeln!(f, "\n    tag   ver  offset      size")?;
        for chunk in &self.chunks {
            writeln!(
                f,
                "    {}  {:>3}  {:#010x}  {:#x}",
                chunk.name(),
                chunk.version,
                chunk.payload_offset,
                chunk.size
            )?;
        }
        if let Some(regs) = &self.master {
            writeln!(f, "\nMaster SH-2:\n{}", regs)?;
        }
        if let Some(regs) = &self.slave {
            writeln!(f, "\nSlave SH-2:\n{}", regs)?;
        }
        if let Some(dsp) = &self.dsp {
            writeln!(
                f,
                "\nSCU DSP:                  P={:#04x} EX={} E={}",
                dsp.program_counter(),
                dsp.control.execute,
                dsp.control.end
            )?;
        }
        if let Some(sound) = &self.sound {
            writeln!(
                f,
                "\n68000:                    {}",
                if sound.m68k_running { "running" } else { "stopped" }
            )?;
            if let Some(pc) = sound.pc {
                writeln!(f, "68000 PC:                 {:#010x}", pc)?;
            }
        }
        if let Some(scan) = &self.middleware {
            match (scan.library, scan.version) {
                (Some(lib), Some(v)) => writeln!(f, "\nMiddleware:               {:?} {:.2}", lib, v)?,
                (Some(lib), None) => writeln!(f, "\nMiddleware:               {:?}", lib)?,
                _ => writeln!(f, "\nMiddleware:               none found")?,
            }
        }
        match self.cursor {
            Some(addr) => write!(f, "Cursor:                   {:#010x}", addr),
            None => write!(f, "Cursor:                   <unset>"),
        }
    }
}
