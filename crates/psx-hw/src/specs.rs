/// CPU specifications
pub mod cpu {
    /// Number of general-purpose registers
    pub const GPR_COUNT: usize = 32;
}

/// Display specifications
pub mod display {
    /// Display width after a GPU reset
    pub const WIDTH: u32 = 320;

    /// Display height after a GPU reset
    pub const HEIGHT: u32 = 240;
}

/// Scheduling
pub mod timing {
    /// CPU steps run before yielding to the host, roughly one display frame
    pub const STEPS_PER_FRAME: usize = 100_000;
}
