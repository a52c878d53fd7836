//! CPU-related type definitions
//!
//! This module contains types related to CPU emulation that are used
//! throughout the emulator.

use std::fmt;

/// MIPS general-purpose registers by ABI name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    Zero,
    At,
    V0,
    V1,
    A0,
    A1,
    A2,
    A3,
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    T8,
    T9,
    K0,
    K1,
    Gp, // Global pointer
    Sp, // Stack pointer
    Fp,
    Ra, // Return address (link register)
}

impl Register {
    #[rustfmt::skip]
    pub const ALL: [Register; 32] = [
        Register::Zero, Register::At, Register::V0, Register::V1,
        Register::A0, Register::A1, Register::A2, Register::A3,
        Register::T0, Register::T1, Register::T2, Register::T3,
        Register::T4, Register::T5, Register::T6, Register::T7,
        Register::S0, Register::S1, Register::S2, Register::S3,
        Register::S4, Register::S5, Register::S6, Register::S7,
        Register::T8, Register::T9, Register::K0, Register::K1,
        Register::Gp, Register::Sp, Register::Fp, Register::Ra,
    ];

    /// Register selected by a 5-bit instruction field; upper bits are ignored
    pub const fn from_index(index: u32) -> Self {
        Self::ALL[(index & 0x1F) as usize]
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        #[rustfmt::skip]
        const NAMES: [&str; 32] = [
            "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3",
            "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7",
            "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7",
            "t8", "t9", "k0", "k1", "gp", "sp", "fp", "ra",
        ];
        NAMES[self as usize]
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name())
    }
}
