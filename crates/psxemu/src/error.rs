//! Fatal emulation errors.
//!
//! Every unsupported address, opcode or command halts emulation. Nothing in
//! the core recovers from these; they surface through the scheduler as the
//! stop reason.

use crate::exe::ExeError;
use crate::memory::Width;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmulatorError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmulatorError {
    #[error("unmapped {width}-bit read at {addr:#010x}")]
    UnmappedRead { width: Width, addr: u32 },

    #[error("unmapped {width}-bit write at {addr:#010x} <- {data:#x}")]
    UnmappedWrite { width: Width, addr: u32, data: u32 },

    #[error("unsupported hardware {width}-bit read at {addr:#06x}")]
    HardwareRead { width: Width, addr: u32 },

    #[error("unsupported hardware {width}-bit write at {addr:#06x} <- {data:#010x}")]
    HardwareWrite { width: Width, addr: u32, data: u32 },

    #[error("unsupported GPU status command {command:#04x}")]
    GpuStatusCommand { command: u8 },

    #[error("unimplemented instruction {word:#010x} (opcode {opcode:#04x}) at {pc:#010x}")]
    UnimplementedOpcode { opcode: u32, word: u32, pc: u32 },

    #[error("unimplemented special instruction {word:#010x} (function {function:#04x}) at {pc:#010x}")]
    UnimplementedSpecial { function: u32, word: u32, pc: u32 },

    #[error("control transfers fill every delay slot from {pc:#010x} onwards")]
    RunawayDelaySlots { pc: u32 },

    #[error("unsupported GPU render primitive {opcode:#04x}")]
    UnsupportedPrimitive { opcode: u8 },

    #[error("executable image: {0}")]
    Exe(#[from] ExeError),
}
