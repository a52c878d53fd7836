//! # References
//! - <https://psx-spx.consoledev.net/graphicsprocessingunitgpu/>

/// First GPU port register
pub const BASE: u32 = 0x1810;

/// Last GPU port register (inclusive)
pub const END: u32 = 0x1814;

/// GPU port offsets (low nibble of the register address)
pub mod registers {
    /// GP0: command/data FIFO on write, GPUREAD on read
    pub const DATA: u32 = 0x0;
    /// GP1: display control on write, GPUSTAT on read
    pub const STATUS: u32 = 0x4;
    /// Mask selecting the port from a register address
    pub const PORT_MASK: u32 = 0xF;
}

/// GP1 display control commands (top byte of the written word)
pub mod gp1 {
    /// Reset GPU
    pub const RESET: u8 = 0x00;
    /// Display enable
    pub const DISPLAY_ENABLE: u8 = 0x03;
    /// DMA direction
    pub const DMA_DIRECTION: u8 = 0x04;
    /// Start of display area
    pub const DISPLAY_AREA: u8 = 0x05;
    /// Horizontal display range
    pub const HORIZONTAL_RANGE: u8 = 0x06;
    /// Vertical display range
    pub const VERTICAL_RANGE: u8 = 0x07;
    /// Display mode
    pub const DISPLAY_MODE: u8 = 0x08;
}

/// GPUSTAT values
pub mod status {
    /// Status after a GP1 reset: ready for commands, DMA and VRAM transfers
    pub const READY: u32 = 0x1480_2000;
}

/// GP0 opcodes the renderer understands
pub mod gp0 {
    /// Mask applied before matching primitive families
    pub const FAMILY_MASK: u8 = 0xFC;
    /// Gouraud-shaded four-point polygon
    pub const POLY_G4: u8 = 0x38;
    /// 8x8 sprite
    pub const SPRITE_8: u8 = 0x74;
    /// 16x16 sprite
    pub const SPRITE_16: u8 = 0x7C;

    /// Clear texture cache
    pub const FLUSH: u8 = 0x01;
    /// Fill rectangle in VRAM
    pub const BLOCK_FILL: u8 = 0x02;
    /// Copy rectangle CPU to VRAM
    pub const LOAD_IMAGE: u8 = 0xA0;
    /// Draw mode / texture page
    pub const TEXTURE_PAGE: u8 = 0xE1;
    /// Drawing area top-left
    pub const DRAW_AREA_START: u8 = 0xE3;
    /// Drawing area bottom-right
    pub const DRAW_AREA_END: u8 = 0xE4;
    /// Drawing offset
    pub const DRAW_OFFSET: u8 = 0xE5;
}

/// Number of 32-bit words each GP0 command occupies, indexed by opcode.
///
/// Zero marks a word that does not start a command; such words are dropped.
#[rustfmt::skip]
pub const PRIMITIVE_SIZE: [u8; 256] = [
    0x00,0x01,0x03,0x00,0x00,0x00,0x00,0x00, 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // 0x00
    0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // 0x10
    0x04,0x04,0x04,0x04,0x07,0x07,0x07,0x07, 0x05,0x05,0x05,0x05,0x09,0x09,0x09,0x09, // 0x20
    0x06,0x06,0x06,0x06,0x09,0x09,0x09,0x09, 0x08,0x08,0x08,0x08,0x0c,0x0c,0x0c,0x0c, // 0x30
    0x03,0x03,0x03,0x03,0x00,0x00,0x00,0x00, 0xfe,0xfe,0xfe,0xfe,0xfe,0xfe,0xfe,0xfe, // 0x40
    0x04,0x04,0x04,0x04,0x00,0x00,0x00,0x00, 0xff,0xff,0xff,0xff,0xff,0xff,0xff,0xff, // 0x50
    0x03,0x03,0x03,0x03,0x04,0x04,0x04,0x04, 0x02,0x02,0x02,0x02,0x03,0x03,0x03,0x03, // 0x60
    0x02,0x02,0x02,0x02,0x03,0x03,0x03,0x03, 0x02,0x02,0x02,0x02,0x03,0x03,0x03,0x03, // 0x70
    0x04,0x00,0x00,0x00,0x00,0x00,0x00,0x00, 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // 0x80
    0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // 0x90
    0x03,0x00,0x00,0x00,0x00,0x00,0x00,0x00, 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // 0xa0
    0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // 0xb0
    0x03,0x00,0x00,0x00,0x00,0x00,0x00,0x00, 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // 0xc0
    0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // 0xd0
    0x00,0x01,0x01,0x01,0x01,0x01,0x01,0x00, 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // 0xe0
    0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, 0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00, // 0xf0
];
