//! Shared helpers for integration tests: a tiny MIPS assembler, PS-X EXE
//! packaging and a renderer that records what the GPU hands it.
#![allow(dead_code)]

use psxemu::exe::build_image;
use psxemu::{EmulatorConfig, EmulatorCore, Register, Renderer, Resolution, StopReason};

/// Load address and entry point of every test program
pub const BASE: u32 = 0x8001_0000;

/// Stack pointer handed to test programs
pub const STACK: u32 = 0x801F_FF00;

/// Upper bound on steps so a broken program cannot hang a test
pub const STEP_LIMIT: usize = 100_000;

// ================================================================================================
// Encoders
// ================================================================================================

fn r(reg: Register) -> u32 {
    reg.index() as u32
}

fn i_type(op: u32, rs: Register, rt: Register, imm: u16) -> u32 {
    op << 26 | r(rs) << 21 | r(rt) << 16 | imm as u32
}

fn r_type(rs: Register, rt: Register, rd: Register, shamt: u32, funct: u32) -> u32 {
    r(rs) << 21 | r(rt) << 16 | r(rd) << 11 | (shamt & 0x1F) << 6 | funct
}

pub const NOP: u32 = 0;

pub fn sll(rd: Register, rt: Register, shamt: u32) -> u32 {
    r_type(Register::Zero, rt, rd, shamt, 0x00)
}

pub fn srl(rd: Register, rt: Register, shamt: u32) -> u32 {
    r_type(Register::Zero, rt, rd, shamt, 0x02)
}

pub fn jr(rs: Register) -> u32 {
    r_type(rs, Register::Zero, Register::Zero, 0, 0x08)
}

pub fn and(rd: Register, rs: Register, rt: Register) -> u32 {
    r_type(rs, rt, rd, 0, 0x24)
}

pub fn or(rd: Register, rs: Register, rt: Register) -> u32 {
    r_type(rs, rt, rd, 0, 0x25)
}

pub fn j(addr: u32) -> u32 {
    0x02 << 26 | (addr >> 2) & 0x03FF_FFFF
}

pub fn jal(addr: u32) -> u32 {
    0x03 << 26 | (addr >> 2) & 0x03FF_FFFF
}

pub fn beq(rs: Register, rt: Register, offset: i16) -> u32 {
    i_type(0x04, rs, rt, offset as u16)
}

pub fn bne(rs: Register, rt: Register, offset: i16) -> u32 {
    i_type(0x05, rs, rt, offset as u16)
}

pub fn bgtz(rs: Register, offset: i16) -> u32 {
    i_type(0x07, rs, Register::Zero, offset as u16)
}

pub fn addiu(rt: Register, rs: Register, imm: i16) -> u32 {
    i_type(0x09, rs, rt, imm as u16)
}

pub fn slti(rt: Register, rs: Register, imm: i16) -> u32 {
    i_type(0x0A, rs, rt, imm as u16)
}

pub fn andi(rt: Register, rs: Register, imm: u16) -> u32 {
    i_type(0x0C, rs, rt, imm)
}

pub fn ori(rt: Register, rs: Register, imm: u16) -> u32 {
    i_type(0x0D, rs, rt, imm)
}

pub fn lui(rt: Register, imm: u16) -> u32 {
    i_type(0x0F, Register::Zero, rt, imm)
}

pub fn lh(rt: Register, offset: i16, base: Register) -> u32 {
    i_type(0x21, base, rt, offset as u16)
}

pub fn lw(rt: Register, offset: i16, base: Register) -> u32 {
    i_type(0x23, base, rt, offset as u16)
}

pub fn lbu(rt: Register, offset: i16, base: Register) -> u32 {
    i_type(0x24, base, rt, offset as u16)
}

pub fn sb(rt: Register, offset: i16, base: Register) -> u32 {
    i_type(0x28, base, rt, offset as u16)
}

pub fn sh(rt: Register, offset: i16, base: Register) -> u32 {
    i_type(0x29, base, rt, offset as u16)
}

pub fn sw(rt: Register, offset: i16, base: Register) -> u32 {
    i_type(0x2B, base, rt, offset as u16)
}

/// `lui` + `ori` pair loading a full 32-bit constant
pub fn li(rt: Register, value: u32) -> [u32; 2] {
    [lui(rt, (value >> 16) as u16), ori(rt, rt, value as u16)]
}

// ================================================================================================
// Program builder
// ================================================================================================

/// Straight-line program assembled at [`BASE`] with optional data blocks
#[derive(Default)]
pub struct Program {
    words: Vec<u32>,
    data: Vec<(u32, Vec<u32>)>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, word: u32) -> &mut Self {
        self.words.push(word);
        self
    }

    pub fn emit_all(&mut self, words: impl IntoIterator<Item = u32>) -> &mut Self {
        self.words.extend(words);
        self
    }

    /// Address of the next instruction to be emitted
    pub fn here(&self) -> u32 {
        BASE + self.words.len() as u32 * 4
    }

    /// Offset for a branch emitted next that should land on `target`
    pub fn offset_to(&self, target: u32) -> i16 {
        ((target as i64 - (self.here() as i64 + 4)) / 4) as i16
    }

    /// Spin forever; returns the address of the spinning branch
    pub fn halt(&mut self) -> u32 {
        let at = self.here();
        self.emit(beq(Register::Zero, Register::Zero, -1));
        self.emit(NOP);
        at
    }

    /// Place words at a guest address inside the loaded payload
    pub fn data(&mut self, addr: u32, words: &[u32]) -> &mut Self {
        self.data.push((addr, words.to_vec()));
        self
    }

    pub fn image(&self) -> Vec<u8> {
        let mut payload: Vec<u32> = self.words.clone();
        for (addr, words) in &self.data {
            let start = ((addr - BASE) / 4) as usize;
            if payload.len() < start + words.len() {
                payload.resize(start + words.len(), 0);
            }
            payload[start..start + words.len()].copy_from_slice(words);
        }
        let bytes: Vec<u8> = payload.iter().flat_map(|w| w.to_le_bytes()).collect();
        build_image(BASE, 0, BASE, STACK, &bytes)
    }
}

/// Run `program` until it reaches `stop_pc`
pub fn run<R: Renderer>(
    program: &Program,
    stop_pc: u32,
    renderer: R,
) -> (EmulatorCore<R>, StopReason) {
    let config = EmulatorConfig {
        stop_pc: Some(stop_pc),
        max_instructions: Some(STEP_LIMIT),
        steps_per_quantum: Some(1_000),
        ..Default::default()
    };
    let mut core = EmulatorCore::new(&program.image(), config, renderer).unwrap();
    let reason = core.run();
    (core, reason)
}

// ================================================================================================
// Recording renderer
// ================================================================================================

#[derive(Debug, Default)]
pub struct Recorder {
    pub resets: Vec<Resolution>,
    pub draws: Vec<(u8, Vec<u32>)>,
}

impl Recorder {
    /// Every word dispatched, in order
    pub fn words(&self) -> Vec<u32> {
        self.draws.iter().flat_map(|(_, w)| w.iter().copied()).collect()
    }
}

impl Renderer for Recorder {
    fn reset(&mut self, resolution: Resolution) {
        self.resets.push(resolution);
    }

    fn draw(&mut self, opcode: u8, words: &[u32]) -> psxemu::Result<()> {
        self.draws.push((opcode, words.to_vec()));
        Ok(())
    }
}
