//! Hardware register offsets, relative to the start of the I/O block
//! (`0x1F80_0000`).

pub mod dma;
pub mod gpu;
