//! Hardware definitions for the PlayStation.
//!
//! Plain constants only: address map, register offsets, file formats and
//! timing figures. Emulation logic lives in the `psxemu` crate.

pub mod exe;
pub mod memory_map;
pub mod mmio;
pub mod specs;
