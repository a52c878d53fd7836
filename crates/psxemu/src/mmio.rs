//! Memory-Mapped I/O (MMIO) handling and the guest-visible bus.
//!
//! Every CPU load and store goes through [`EmulatorState`], which decodes the
//! top address byte into a [`Segment`] and either touches a backing store
//! directly or forwards the access to a hardware register handler.
//!
//! # Memory Map
//! According to [PSX-SPX Memory Map](https://psx-spx.consoledev.net/memorymap/):
//! - `0x00xxxxxx`, `0x80xxxxxx`, `0xA0xxxxxx`: main RAM (2MB, mirrored)
//! - `0xBFxxxxxx`: BIOS ROM (512KB, read-only)
//! - `0x1Fxx0000-0x1Fxx03FF`: scratch register block, plain storage
//! - `0x1Fxx0400-0x1FxxFFFF`: hardware registers (DMA, GPU)

pub mod dma;
pub mod gpu;

pub use gpu::{CommandPipe, GpuState, WordSource};

use crate::error::{EmulatorError, Result};
use crate::memory::{Bus, Memory, Segment, Width};
use crate::render::Renderer;
use psx_hw::mmio::{dma as dma_hw, gpu as gpu_hw};
use tracing::{instrument, trace};

/// Shared emulator state: memory, GPU and the renderer receiving its output
pub struct EmulatorState<R: Renderer> {
    pub memory: Memory,
    pub gpu: GpuState,
    pub renderer: R,
}

impl<R: Renderer> EmulatorState<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            memory: Memory::new(),
            gpu: GpuState::new(),
            renderer,
        }
    }

    /// Zero RAM and registers and reset the GPU. ROM is kept.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.gpu.reset(&mut self.renderer);
    }

    /// Word write to the hardware register block
    #[instrument(level = "trace", skip(self))]
    pub fn hardware_write(&mut self, addr: u32, data: u32) -> Result<()> {
        match addr {
            dma_hw::BASE..=dma_hw::END => dma::write(
                &mut self.memory,
                &mut self.gpu,
                &mut self.renderer,
                addr,
                data,
            ),
            gpu_hw::BASE..=gpu_hw::END => self.gpu.write_port(addr, data, &mut self.renderer),
            dma_hw::DPCR | dma_hw::DICR => {
                trace!("DMA control write: addr={:#X}, data={:#X}", addr, data);
                self.memory.hwr.store_word(addr, data);
                Ok(())
            }
            _ => Err(EmulatorError::HardwareWrite {
                width: Width::Word,
                addr,
                data,
            }),
        }
    }

    /// Word read from the hardware register block
    #[instrument(level = "trace", skip(self))]
    pub fn hardware_read(&self, addr: u32) -> Result<u32> {
        match addr {
            gpu_hw::BASE..=gpu_hw::END => self.gpu.read_port(addr),
            dma_hw::BASE..=dma_hw::END | dma_hw::DPCR => Ok(self.memory.hwr.load_word(addr)),
            _ => Err(EmulatorError::HardwareRead {
                width: Width::Word,
                addr,
            }),
        }
    }
}

impl<R: Renderer> Bus for EmulatorState<R> {
    fn read(&self, width: Width, addr: u32) -> Result<u32> {
        match Segment::decode(addr) {
            Some(Segment::Ram) => Ok(self.memory.ram.load(width, addr)),
            Some(Segment::Rom) => Ok(self.memory.rom.load(width, addr)),
            Some(Segment::Scratch) => Ok(self.memory.hwr.load(width, addr)),
            Some(Segment::Hardware(offset)) => match width {
                Width::Word => self.hardware_read(offset),
                _ => Err(EmulatorError::HardwareRead {
                    width,
                    addr: offset,
                }),
            },
            None => Err(EmulatorError::UnmappedRead { width, addr }),
        }
    }

    fn write(&mut self, width: Width, addr: u32, value: u32) -> Result<()> {
        let value = width.truncate(value);
        match Segment::decode(addr) {
            Some(Segment::Ram) => {
                self.memory.ram.store(width, addr, value);
                Ok(())
            }
            Some(Segment::Scratch) => {
                self.memory.hwr.store(width, addr, value);
                Ok(())
            }
            Some(Segment::Hardware(offset)) => match width {
                Width::Word => self.hardware_write(offset, value),
                _ => Err(EmulatorError::HardwareWrite {
                    width,
                    addr: offset,
                    data: value,
                }),
            },
            Some(Segment::Rom) | None => Err(EmulatorError::UnmappedWrite {
                width,
                addr,
                data: value,
            }),
        }
    }
}
