//! # References
//! - <https://psx-spx.consoledev.net/memorymap/>

/// Address segments, selected by the top byte of a 32-bit guest address.
///
/// RAM is visible through three mirrors (KUSEG, KSEG0, KSEG1) that all
/// collapse onto the same physical storage.
pub mod segment {
    /// KUSEG view of main RAM
    pub const RAM_KUSEG: u8 = 0x00;
    /// KSEG0 (cached) view of main RAM
    pub const RAM_KSEG0: u8 = 0x80;
    /// KSEG1 (uncached) view of main RAM
    pub const RAM_KSEG1: u8 = 0xA0;
    /// Boot ROM, KSEG1 view
    pub const ROM: u8 = 0xBF;
    /// Scratchpad and hardware registers
    pub const IO: u8 = 0x1F;
}

/// Main RAM
///
/// Reference: <https://psx-spx.consoledev.net/memorymap/>
pub mod ram {
    /// RAM size (2 MB)
    pub const SIZE: usize = 2 * 1024 * 1024;
}

/// Boot ROM (BIOS)
pub mod rom {
    /// ROM size (512 KB)
    pub const SIZE: usize = 512 * 1024;
    /// Address the CPU starts fetching from after reset
    pub const RESET_VECTOR: u32 = 0xBFC0_0000;
}

/// Memory-mapped register block at `0x1F80_0000`
pub mod io {
    /// Size of the register block backing store (16 KB)
    pub const SIZE: usize = 16 * 1024;
    /// Offsets (low 16 bits) at or above this go through the hardware
    /// register decoder; offsets below address the block directly.
    pub const HARDWARE_SPLIT: u32 = 0x400;
    /// Mask extracting the block offset from a full address
    pub const OFFSET_MASK: u32 = 0xFFFF;
}
