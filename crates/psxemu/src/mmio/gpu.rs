//! GPU port handling and GP0 command assembly.
//!
//! The GPU is reached through two 32-bit ports at `0x1F80_1810` (GP0, command
//! and data FIFO) and `0x1F80_1814` (GP1, display control / status). Words
//! written to GP0, either by the CPU or by DMA channel 2, are assembled into
//! complete commands using the primitive size table and handed to the
//! [`Renderer`] once the last word arrives.
//!
//! # References
//! - [GPU I/O Ports](https://psx-spx.consoledev.net/graphicsprocessingunitgpu/#gpu-io-ports-dma-channels-commands-vram)

use crate::error::{EmulatorError, Result};
use crate::memory::{Region, Width};
use crate::render::{Renderer, Resolution};
use psx_hw::mmio::gpu::{PRIMITIVE_SIZE, gp1, registers as hw_regs, status};
use tracing::{debug, trace};

/// Capacity of the assembly buffer; the longest command is 255 words
pub const PIPE_CAPACITY: usize = 256;

/// Where the words fed into GP0 come from
#[derive(Debug, Clone, Copy)]
pub enum WordSource<'a> {
    /// `count` consecutive words read from RAM starting at `addr` (DMA)
    Ram {
        ram: &'a Region,
        addr: u32,
        count: u32,
    },
    /// A single word written directly to the data port
    Immediate(u32),
}

/// A command whose last word has just arrived
#[derive(Debug, PartialEq, Eq)]
pub struct Packet<'a> {
    pub opcode: u8,
    pub words: &'a [u32],
}

/// GP0 command assembly buffer
#[derive(Debug)]
pub struct CommandPipe {
    words: [u32; PIPE_CAPACITY],
    opcode: u8,
    /// Expected word count of the command being assembled; zero when idle
    size: usize,
    /// Next row to fill
    row: usize,
}

impl CommandPipe {
    pub fn new() -> Self {
        Self {
            words: [0; PIPE_CAPACITY],
            opcode: 0,
            size: 0,
            row: 0,
        }
    }

    pub fn reset(&mut self) {
        self.words.fill(0);
        self.opcode = 0;
        self.size = 0;
        self.row = 0;
    }

    pub fn is_idle(&self) -> bool {
        self.size == 0
    }

    /// Words still expected before the current command completes
    pub fn remaining(&self) -> usize {
        self.size - self.row
    }

    /// Feed one word. Returns the finished command when this word completes it.
    pub fn push(&mut self, word: u32) -> Option<Packet<'_>> {
        if self.size == 0 {
            let opcode = (word >> 24) as u8;
            let size = PRIMITIVE_SIZE[opcode as usize] as usize;
            if size == 0 {
                trace!("GP0 dropping non-command word {:#010X}", word);
                return None;
            }
            self.words[0] = word;
            self.opcode = opcode;
            self.size = size;
            self.row = 1;
        } else {
            self.words[self.row] = word;
            self.row += 1;
        }

        if self.row == self.size {
            let len = self.size;
            self.size = 0;
            self.row = 0;
            return Some(Packet {
                opcode: self.opcode,
                words: &self.words[..len],
            });
        }
        None
    }
}

impl Default for CommandPipe {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU state: the GP0 assembly pipe and the GPUSTAT word
#[derive(Debug)]
pub struct GpuState {
    pub pipe: CommandPipe,
    pub status: u32,
}

impl GpuState {
    #[expect(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            pipe: CommandPipe::new(),
            status: 0,
        }
    }

    /// Clear the pipe and status and tell the renderer the display was reset
    pub fn reset(&mut self, renderer: &mut impl Renderer) {
        self.pipe.reset();
        self.status = 0;
        renderer.reset(Resolution::default());
    }

    /// Stream words into GP0, dispatching every command that completes
    pub fn write(&mut self, source: WordSource<'_>, renderer: &mut impl Renderer) -> Result<()> {
        match source {
            WordSource::Immediate(word) => self.feed(word, renderer),
            WordSource::Ram { ram, addr, count } => {
                let mut addr = addr;
                for _ in 0..count {
                    self.feed(ram.load_word(addr), renderer)?;
                    addr = addr.wrapping_add(4);
                }
                Ok(())
            }
        }
    }

    fn feed(&mut self, word: u32, renderer: &mut impl Renderer) -> Result<()> {
        if let Some(packet) = self.pipe.push(word) {
            trace!(
                "GP0 command {:#04X} complete ({} words)",
                packet.opcode,
                packet.words.len()
            );
            renderer.draw(packet.opcode, packet.words)?;
        }
        Ok(())
    }

    /// Handle a write to a GPU port
    pub fn write_port(&mut self, addr: u32, data: u32, renderer: &mut impl Renderer) -> Result<()> {
        trace!("GPU port write: addr={:#X}, data={:#X}", addr, data);

        match addr & hw_regs::PORT_MASK {
            hw_regs::DATA => self.write(WordSource::Immediate(data), renderer),
            hw_regs::STATUS => self.write_control(data),
            _ => Err(EmulatorError::HardwareWrite {
                width: Width::Word,
                addr,
                data,
            }),
        }
    }

    /// Handle a read from a GPU port
    pub fn read_port(&self, addr: u32) -> Result<u32> {
        trace!("GPU port read: addr={:#X}", addr);

        match addr & hw_regs::PORT_MASK {
            // No VRAM readback
            hw_regs::DATA => Ok(0),
            hw_regs::STATUS => Ok(self.status),
            _ => Err(EmulatorError::HardwareRead {
                width: Width::Word,
                addr,
            }),
        }
    }

    fn write_control(&mut self, data: u32) -> Result<()> {
        let command = (data >> 24) as u8;
        match command {
            gp1::RESET => {
                self.status = status::READY;
                debug!("GP1 reset, status={:#010X}", self.status);
                Ok(())
            }
            gp1::DISPLAY_ENABLE
            | gp1::DMA_DIRECTION
            | gp1::DISPLAY_AREA
            | gp1::HORIZONTAL_RANGE
            | gp1::VERTICAL_RANGE
            | gp1::DISPLAY_MODE => {
                debug!("GP1 command {:#04X} ignored (data={:#010X})", command, data);
                Ok(())
            }
            _ => Err(EmulatorError::GpuStatusCommand { command }),
        }
    }
}
