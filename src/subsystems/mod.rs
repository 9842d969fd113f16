//! Per-subsystem chunk decoders
//!
//! Each decoder starts at its chunk's payload and leaves the reader exactly
//! at the payload end, whether it interprets all of it or not.

pub mod scsp;
pub mod scu_dsp;
pub mod sh2;
pub mod vdp;

pub use scsp::{SoundState, SoundView};
pub use scu_dsp::{DspControlPort, Reg48, ScuDspState};
pub use sh2::Sh2Registers;
