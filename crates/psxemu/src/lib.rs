pub mod args;
pub mod core;
pub mod cpu;
pub mod cpu_types;
pub mod display;
pub mod error;
pub mod exe;
pub mod memory;
pub mod mmio;
pub mod primitive;
pub mod raster;
pub mod render;
pub mod scheduler;

// Re-export commonly used types
pub use args::{Args, load_bios_data, load_exe_data};
pub use self::core::{EmulatorConfig, EmulatorCore, StopReason};
pub use cpu::{Cpu, Instruction};
pub use cpu_types::Register;
pub use error::{EmulatorError, Result};
pub use exe::{ExeError, ExeHeader};
pub use memory::{Bus, Memory, Width};
pub use mmio::{EmulatorState, GpuState};
pub use primitive::Primitive;
pub use raster::SoftwareRenderer;
pub use render::{PrimitiveLog, Renderer, Resolution};
pub use scheduler::{QuantumResult, SchedulerConfig};
