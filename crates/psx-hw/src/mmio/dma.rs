//! # References
//! - <https://psx-spx.consoledev.net/dmachannels/>

/// First DMA channel register
pub const BASE: u32 = 0x1080;

/// Last DMA channel register (inclusive)
pub const END: u32 = 0x10E8;

/// DMA control register (DPCR)
pub const DPCR: u32 = 0x10F0;

/// DMA interrupt register (DICR)
pub const DICR: u32 = 0x10F4;

/// Register offsets within a channel's 16-byte block
pub mod registers {
    /// Base address (MADR)
    pub const MADR: u32 = 0x0;
    /// Channel control (CHCR)
    pub const CHCR: u32 = 0x8;

    /// Address bit that marks a channel-control register
    pub const CONTROL_BIT: u32 = 0x8;
    /// Mask selecting a channel's block from a register offset
    pub const CHANNEL_MASK: u32 = 0xFFF0;
}

/// Channel numbers
pub mod channel {
    /// Channel index of the first register block (`BASE >> 4`)
    pub const FIRST_BLOCK: u32 = 0x8;
    /// GPU command/data channel
    pub const GPU: u32 = 2;
}

/// CHCR values and bits
pub mod control {
    /// Start/busy flag (bit 24)
    pub const BUSY: u32 = 0x0100_0000;
    /// Start, linked-list (chain) mode, from RAM
    pub const START_CHAIN: u32 = 0x0100_0401;
}

/// Linked-list header layout
pub mod chain {
    /// Next-pointer value terminating a chain
    pub const END_MARKER: u32 = 0x00FF_FFFF;
    /// Mask extracting the next pointer from a header word
    pub const NEXT_MASK: u32 = 0x00FF_FFFF;
    /// Shift extracting the payload word count from a header word
    pub const COUNT_SHIFT: u32 = 24;
}
