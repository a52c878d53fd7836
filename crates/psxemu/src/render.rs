//! Interface between the GPU command pipeline and whatever draws its output.

use crate::error::Result;
use crate::primitive::Primitive;
use psx_hw::specs::display;
use tracing::{debug, trace};

/// Display resolution announced on GPU reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: display::WIDTH,
            height: display::HEIGHT,
        }
    }
}

/// Consumer of assembled GP0 commands
pub trait Renderer {
    /// The GPU was reset; drop any drawing state and use `resolution`
    fn reset(&mut self, resolution: Resolution);

    /// A complete command: its opcode and exactly the words it occupies.
    /// Shapes are decoded with [`Primitive::decode`].
    fn draw(&mut self, opcode: u8, words: &[u32]) -> Result<()>;
}

/// Headless renderer that decodes and counts primitives without drawing them
#[derive(Debug, Default)]
pub struct PrimitiveLog {
    pub resolution: Resolution,
    pub quads: usize,
    pub sprites: usize,
    pub operations: usize,
}

impl PrimitiveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.quads + self.sprites + self.operations
    }
}

impl Renderer for PrimitiveLog {
    fn reset(&mut self, resolution: Resolution) {
        debug!(
            "Renderer reset to {}x{}",
            resolution.width, resolution.height
        );
        self.resolution = resolution;
    }

    fn draw(&mut self, opcode: u8, words: &[u32]) -> Result<()> {
        let primitive = Primitive::decode(opcode, words)?;
        trace!("Primitive {:#04X}: {:?}", opcode, primitive);
        match primitive {
            Primitive::GouraudQuad(_) => self.quads += 1,
            Primitive::Sprite { .. } => self.sprites += 1,
            Primitive::Operation(_) => self.operations += 1,
        }
        Ok(())
    }
}
