//! Guest memory: backing stores, access widths and segment decoding.
//!
//! RAM, boot ROM and the hardware register block are flat byte buffers whose
//! sizes are powers of two. An access masks the guest address to the buffer
//! length and then aligns it down to the access width, so every access lands
//! in range and a misaligned address aliases the unit that contains it.

use crate::error::Result;
use crate::exe::ExeHeader;
use psx_hw::memory_map::{io, ram, rom, segment};
use std::fmt;
use tracing::{debug, info};

pub const RAM_SIZE: usize = ram::SIZE;
pub const ROM_SIZE: usize = rom::SIZE;
pub const IO_SIZE: usize = io::SIZE;

/// Width of a single memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Byte,
    Half,
    Word,
}

impl Width {
    /// Number of bytes covered by one access
    pub const fn bytes(self) -> usize {
        match self {
            Width::Byte => 1,
            Width::Half => 2,
            Width::Word => 4,
        }
    }

    pub const fn bits(self) -> u32 {
        (self.bytes() * 8) as u32
    }

    /// Truncate a register value to this width
    pub const fn truncate(self, value: u32) -> u32 {
        match self {
            Width::Byte => value & 0xFF,
            Width::Half => value & 0xFFFF,
            Width::Word => value,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.bits())
    }
}

/// Region selected by the top byte of a guest address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Main RAM through any of its three mirrors
    Ram,
    /// Boot ROM
    Rom,
    /// Register block below the hardware split, addressed directly
    Scratch,
    /// Hardware register decoder; carries the 16-bit block offset
    Hardware(u32),
}

impl Segment {
    pub fn decode(addr: u32) -> Option<Self> {
        match (addr >> 24) as u8 {
            segment::RAM_KUSEG | segment::RAM_KSEG0 | segment::RAM_KSEG1 => Some(Segment::Ram),
            segment::ROM => Some(Segment::Rom),
            segment::IO => {
                let offset = addr & io::OFFSET_MASK;
                if offset >= io::HARDWARE_SPLIT {
                    Some(Segment::Hardware(offset))
                } else {
                    Some(Segment::Scratch)
                }
            }
            _ => None,
        }
    }
}

/// A power-of-two sized little-endian backing store
pub struct Region {
    bytes: Box<[u8]>,
}

impl Region {
    pub fn new(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        Self {
            bytes: vec![0u8; size].into_boxed_slice(),
        }
    }

    fn offset(&self, width: Width, addr: u32) -> usize {
        (addr as usize & (self.bytes.len() - 1)) & !(width.bytes() - 1)
    }

    pub fn load(&self, width: Width, addr: u32) -> u32 {
        let at = self.offset(width, addr);
        let b = &self.bytes;
        match width {
            Width::Byte => b[at] as u32,
            Width::Half => u16::from_le_bytes([b[at], b[at + 1]]) as u32,
            Width::Word => u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]),
        }
    }

    pub fn store(&mut self, width: Width, addr: u32, value: u32) {
        let at = self.offset(width, addr);
        let bytes = value.to_le_bytes();
        self.bytes[at..at + width.bytes()].copy_from_slice(&bytes[..width.bytes()]);
    }

    pub fn load_word(&self, addr: u32) -> u32 {
        self.load(Width::Word, addr)
    }

    pub fn store_word(&mut self, addr: u32, value: u32) {
        self.store(Width::Word, addr, value)
    }

    fn fill(&mut self, value: u8) {
        self.bytes.fill(value);
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("size", &format_args!("{:#X}", self.bytes.len()))
            .finish_non_exhaustive()
    }
}

/// RAM, ROM and the register block
pub struct Memory {
    pub ram: Region,
    pub rom: Region,
    pub hwr: Region,
}

impl Memory {
    #[expect(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            ram: Region::new(RAM_SIZE),
            rom: Region::new(ROM_SIZE),
            hwr: Region::new(IO_SIZE),
        }
    }

    /// Zero RAM and the register block. ROM keeps its contents.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.hwr.fill(0);
    }

    /// Copy a boot ROM image, truncating or zero-padding it to the ROM size
    pub fn load_rom(&mut self, image: &[u8]) {
        let len = image.len().min(ROM_SIZE);
        self.rom.bytes[..len].copy_from_slice(&image[..len]);
        self.rom.bytes[len..].fill(0);
        info!("Loaded boot ROM ({} of {} bytes)", len, ROM_SIZE);
    }

    /// Copy an executable's payload into RAM and return its header
    pub fn write_executable(&mut self, image: &[u8]) -> Result<ExeHeader> {
        let header = ExeHeader::parse(image)?;
        let payload = header.payload(image)?;
        let offset = header.load_address as usize & (RAM_SIZE - 1);

        if offset + payload.len() > RAM_SIZE {
            return Err(crate::exe::ExeError::DoesNotFit {
                offset: offset as u32,
                size: header.size,
            }
            .into());
        }

        debug!(
            "  Copying {:#X} payload bytes to RAM offset {:#X}",
            payload.len(),
            offset
        );
        self.ram.bytes[offset..offset + payload.len()].copy_from_slice(payload);
        Ok(header)
    }
}

/// Guest-visible memory bus used by the CPU
pub trait Bus {
    fn read(&self, width: Width, addr: u32) -> Result<u32>;
    fn write(&mut self, width: Width, addr: u32, value: u32) -> Result<()>;
}
