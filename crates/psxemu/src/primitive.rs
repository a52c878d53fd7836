//! Shape decoding for assembled GP0 commands.
//!
//! Colours are packed as `0xNNBBGGRR` (the top byte holds the opcode on the
//! first word and is otherwise unused); points are packed as two signed
//! 16-bit halves, `x` in the low half and `y` in the high half.

use crate::error::{EmulatorError, Result};
use psx_hw::mmio::gpu::gp0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Fourth byte of the packed word
    pub n: u8,
}

impl Color {
    pub fn unpack(word: u32) -> Self {
        let [r, g, b, n] = word.to_le_bytes();
        Self { r, g, b, n }
    }

    /// `0x00RRGGBB`, the layout of a softbuffer pixel
    pub fn to_rgb(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub fn unpack(word: u32) -> Self {
        Self {
            x: word as u16 as i16,
            y: (word >> 16) as u16 as i16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    pub color: Color,
    pub point: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Four Gouraud-shaded vertices drawn as a triangle strip
    GouraudQuad([Vertex; 4]),
    /// Square sprite with its top-left corner at `origin`
    Sprite { size: u16, color: Color, origin: Point },
    /// GPU state or VRAM operation with nothing to draw
    Operation(u8),
}

impl Primitive {
    pub fn decode(opcode: u8, words: &[u32]) -> Result<Self> {
        let word = |i: usize| words.get(i).copied().unwrap_or(0);

        match opcode & gp0::FAMILY_MASK {
            gp0::POLY_G4 => {
                let vertex = |i: usize| Vertex {
                    color: Color::unpack(word(i * 2)),
                    point: Point::unpack(word(i * 2 + 1)),
                };
                return Ok(Primitive::GouraudQuad([
                    vertex(0),
                    vertex(1),
                    vertex(2),
                    vertex(3),
                ]));
            }
            gp0::SPRITE_8 | gp0::SPRITE_16 => {
                let size = if opcode & gp0::FAMILY_MASK == gp0::SPRITE_8 {
                    8
                } else {
                    16
                };
                return Ok(Primitive::Sprite {
                    size,
                    color: Color::unpack(word(0)),
                    origin: Point::unpack(word(1)),
                });
            }
            _ => {}
        }

        match opcode {
            gp0::FLUSH
            | gp0::BLOCK_FILL
            | gp0::LOAD_IMAGE
            | gp0::TEXTURE_PAGE
            | gp0::DRAW_AREA_START
            | gp0::DRAW_AREA_END
            | gp0::DRAW_OFFSET => Ok(Primitive::Operation(opcode)),
            _ => Err(EmulatorError::UnsupportedPrimitive {
                opcode: opcode & gp0::FAMILY_MASK,
            }),
        }
    }
}
