// Builders for synthetic YSS images used by the unit tests
use crate::subsystems::scsp::{M68K_REGS_LEN, SCSP_REGS_LEN, SOUND_RAM_LEN};
use crate::subsystems::scu_dsp::{DSP_REGS_LEN, PROGRAM_WORDS, SCU_DSP_BLOCK_LEN, SCU_REGS_LEN};
use crate::subsystems::sh2::SH2_REGS_LEN;
use crate::subsystems::vdp::{VDP1_RAM_LEN, VDP1_REGS_LEN, VDP2_CRAM_LEN, VDP2_REGS_LEN, VDP2_VRAM_LEN};
use crate::yss::chunks::{ChunkTag, CHUNK_ORDER, MSH2, OTHR, SCSP, SCU, SSH2, VDP1, VDP2};
use crate::yss::Endian;

pub const WORK_RAM_LEN: usize = 0x10_0000;
pub const BACKUP_RAM_LEN: usize = 0x1_0000;

pub fn u16_bytes(value: u16, endian: Endian) -> [u8; 2] {
    match endian {
        Endian::Little => value.to_le_bytes(),
        Endian::Big => value.to_be_bytes(),
    }
}

pub fn u32_bytes(value: u32, endian: Endian) -> [u8; 4] {
    match endian {
        Endian::Little => value.to_le_bytes(),
        Endian::Big => value.to_be_bytes(),
    }
}

/// Stream bytes that a word-swap load turns back into `image`, where
/// `image` is the big-endian memory view.
pub fn word_swap_stream(image: &[u8], endian: Endian) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.len());
    for unit in image.chunks(4) {
        let value = u32::from_be_bytes([unit[0], unit[1], unit[2], unit[3]]);
        out.extend_from_slice(&u16_bytes((value >> 16) as u16, endian));
        out.extend_from_slice(&u16_bytes(value as u16, endian));
    }
    out
}

/// Place a big-endian long into a memory view.
pub fn poke_long(image: &mut [u8], offset: usize, value: u32) {
    image[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

pub fn poke_bytes(image: &mut [u8], offset: usize, bytes: &[u8]) {
    image[offset..offset + bytes.len()].copy_from_slice(bytes);
}

pub struct YssBuilder {
    version: u32,
    endian: Endian,
    chunks: Vec<(ChunkTag, i32, Vec<u8>)>,
    size_adjust: i64,
}

impl YssBuilder {
    pub fn new(version: u32) -> Self {
        YssBuilder {
            version,
            endian: Endian::Little,
            chunks: Vec::new(),
            size_adjust: 0,
        }
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn chunk(mut self, tag: ChunkTag, payload: Vec<u8>) -> Self {
        self.chunks.push((tag, 1, payload));
        self
    }

    /// Write a declared size that is off by `delta` bytes.
    pub fn size_adjust(mut self, delta: i64) -> Self {
        self.size_adjust = delta;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for (tag, version, payload) in &self.chunks {
            body.extend_from_slice(tag);
            body.extend_from_slice(&u32_bytes(*version as u32, self.endian));
            body.extend_from_slice(&u32_bytes(payload.len() as u32, self.endian));
            body.extend_from_slice(payload);
        }

        let mut bytes = b"YSS".to_vec();
        bytes.push(match self.endian {
            Endian::Little => 0,
            Endian::Big => 1,
        });
        bytes.extend_from_slice(&u32_bytes(self.version, self.endian));
        let declared = body.len() as i64 + self.size_adjust;
        bytes.extend_from_slice(&u32_bytes(declared as u32, self.endian));
        if self.version == 2 {
            bytes.extend_from_slice(&[0u8; 8]);
        }
        bytes.extend_from_slice(&body);
        bytes
    }
}

/// SH-2 registers with `R[i] = 0x100 + i`, `PR = 0x115` and the given PC.
pub fn sh2_payload(pc: u32, slave: bool, endian: Endian) -> Vec<u8> {
    let mut payload = Vec::new();
    if slave {
        payload.push(0);
    }
    for i in 0..(SH2_REGS_LEN / 4 - 1) as u32 {
        payload.extend_from_slice(&u32_bytes(0x100 + i, endian));
    }
    payload.extend_from_slice(&u32_bytes(pc, endian));
    payload
}

/// SCU block with DSP control port `P = program_address`.
pub fn scu_payload(program_address: u8, program: &[u32], endian: Endian) -> Vec<u8> {
    let mut payload = vec![0u8; SCU_DSP_BLOCK_LEN];
    let dsp = SCU_REGS_LEN;
    payload[dsp..dsp + 4].copy_from_slice(&u32_bytes(program_address as u32, endian));
    let prg = dsp + DSP_REGS_LEN;
    for (i, word) in program.iter().take(PROGRAM_WORDS).enumerate() {
        let at = prg + i * 4;
        payload[at..at + 4].copy_from_slice(&u32_bytes(*word, endian));
    }
    payload
}

/// SCSP block with a running 68000 at `pc` and raw sound RAM bytes.
pub fn scsp_payload(pc: u32, ram: &[u8], endian: Endian) -> Vec<u8> {
    let mut payload = vec![1u8];
    payload.extend(std::iter::repeat(0).take(M68K_REGS_LEN as usize));
    payload.extend_from_slice(&u32_bytes(pc, endian));
    payload.extend(std::iter::repeat(0).take(SCSP_REGS_LEN as usize));
    let mut sound = vec![0u8; SOUND_RAM_LEN as usize];
    sound[..ram.len()].copy_from_slice(ram);
    payload.extend_from_slice(&sound);
    payload
}

pub fn vdp1_payload(vram: &[u8], endian: Endian) -> Vec<u8> {
    let mut payload = vec![0u8; VDP1_REGS_LEN as usize];
    let mut image = vec![0u8; VDP1_RAM_LEN as usize];
    image[..vram.len()].copy_from_slice(vram);
    payload.extend(word_swap_stream(&image, endian));
    payload
}

pub fn vdp2_payload(endian: Endian) -> Vec<u8> {
    let mut payload = vec![0u8; VDP2_REGS_LEN as usize];
    payload.extend(word_swap_stream(&vec![0u8; VDP2_VRAM_LEN as usize], endian));
    payload.extend(word_swap_stream(&vec![0u8; VDP2_CRAM_LEN as usize], endian));
    payload
}

/// Backup RAM followed by the two work RAM images in memory view.
pub fn othr_payload(hwram: &[u8], lwram: &[u8], endian: Endian) -> Vec<u8> {
    let mut payload = vec![0xAAu8; BACKUP_RAM_LEN];
    payload.extend(word_swap_stream(hwram, endian));
    payload.extend(word_swap_stream(lwram, endian));
    payload
}

/// Every chunk with an empty payload except the SCU block.
pub fn dsp_image(program_address: u8, program: &[u32]) -> YssBuilder {
    CHUNK_ORDER.iter().fold(YssBuilder::new(1), |b, &tag| {
        let payload = if tag == SCU {
            scu_payload(program_address, program, Endian::Little)
        } else {
            Vec::new()
        };
        b.chunk(tag, payload)
    })
}

/// Every chunk with an empty payload except the SCSP block.
pub fn m68k_image(pc: u32, ram: &[u8]) -> YssBuilder {
    CHUNK_ORDER.iter().fold(YssBuilder::new(1), |b, &tag| {
        let payload = if tag == SCSP {
            scsp_payload(pc, ram, Endian::Little)
        } else {
            Vec::new()
        };
        b.chunk(tag, payload)
    })
}

/// Payload of every chunk for a full SH-2 image, in chunk order. Chunks
/// the SH-2 pipeline decodes carry their fixed layout, the rest are empty.
pub fn sh2_payloads(pc: u32, hwram: &[u8], lwram: &[u8], endian: Endian) -> Vec<(ChunkTag, Vec<u8>)> {
    CHUNK_ORDER
        .iter()
        .map(|&tag| {
            let payload = match tag {
                MSH2 => sh2_payload(pc, false, endian),
                SSH2 => sh2_payload(0x0600_5000, true, endian),
                SCSP => scsp_payload(0, &[], endian),
                SCU => scu_payload(0, &[], endian),
                VDP1 => vdp1_payload(&[], endian),
                VDP2 => vdp2_payload(endian),
                OTHR => othr_payload(hwram, lwram, endian),
                _ => Vec::new(),
            };
            (tag, payload)
        })
        .collect()
}

pub fn image_from(payloads: Vec<(ChunkTag, Vec<u8>)>, endian: Endian) -> YssBuilder {
    payloads
        .into_iter()
        .fold(YssBuilder::new(1).endian(endian), |b, (tag, payload)| b.chunk(tag, payload))
}

pub fn sh2_image(pc: u32, hwram: &[u8], lwram: &[u8], endian: Endian) -> YssBuilder {
    image_from(sh2_payloads(pc, hwram, lwram, endian), endian)
}

pub fn blank_work_ram() -> Vec<u8> {
    vec![0u8; WORK_RAM_LEN]
}
