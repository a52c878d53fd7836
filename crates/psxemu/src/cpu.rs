//! MIPS R3000A interpreter.
//!
//! Each step fetches the word at `pc`, advances `pc` by four, decodes the word
//! into an [`Instruction`] and executes it against a [`Bus`]. A taken control
//! transfer runs its delay slot within the same step before the new `pc` takes
//! effect, so the instruction after a branch always executes whether or not the
//! branch is taken. A transfer found in a delay slot runs its own delay slot in
//! turn, and the outermost target wins.
//!
//! # References
//! - [CPU Specifications](https://psx-spx.consoledev.net/cpuspecifications/)

use crate::cpu_types::Register;
use crate::error::{EmulatorError, Result};
use crate::exe::ExeHeader;
use crate::memory::{Bus, Width};
use psx_hw::memory_map::{ram, rom};
use psx_hw::specs::cpu::GPR_COUNT;
use std::fmt;
use tracing::{debug, trace};

/// Primary opcodes (bits 31..26)
mod op {
    pub const SPECIAL: u32 = 0x00;
    pub const J: u32 = 0x02;
    pub const JAL: u32 = 0x03;
    pub const BEQ: u32 = 0x04;
    pub const BNE: u32 = 0x05;
    pub const BGTZ: u32 = 0x07;
    pub const ADDIU: u32 = 0x09;
    pub const SLTI: u32 = 0x0A;
    pub const ANDI: u32 = 0x0C;
    pub const ORI: u32 = 0x0D;
    pub const LUI: u32 = 0x0F;
    pub const LH: u32 = 0x21;
    pub const LW: u32 = 0x23;
    pub const LBU: u32 = 0x24;
    pub const SB: u32 = 0x28;
    pub const SH: u32 = 0x29;
    pub const SW: u32 = 0x2B;
}

/// SPECIAL-class function codes (bits 5..0)
mod funct {
    pub const SLL: u32 = 0x00;
    pub const SRL: u32 = 0x02;
    pub const JR: u32 = 0x08;
    pub const AND: u32 = 0x24;
    pub const OR: u32 = 0x25;
}

/// Longest run of transfers in each other's delay slots before a step gives
/// up; one for every word of RAM
pub const MAX_DELAY_CHAIN: usize = ram::SIZE / 4;

/// A decoded instruction with its operand fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Sll { rd: Register, rt: Register, shamt: u32 },
    Srl { rd: Register, rt: Register, shamt: u32 },
    Jr { rs: Register },
    And { rd: Register, rs: Register, rt: Register },
    Or { rd: Register, rs: Register, rt: Register },
    /// `target` is the raw 26-bit field
    J { target: u32 },
    Jal { target: u32 },
    Beq { rs: Register, rt: Register, offset: i16 },
    Bne { rs: Register, rt: Register, offset: i16 },
    Bgtz { rs: Register, offset: i16 },
    Addiu { rt: Register, rs: Register, imm: i16 },
    Slti { rt: Register, rs: Register, imm: i16 },
    Andi { rt: Register, rs: Register, imm: u16 },
    Ori { rt: Register, rs: Register, imm: u16 },
    Lui { rt: Register, imm: u16 },
    Lh { rt: Register, base: Register, offset: i16 },
    Lw { rt: Register, base: Register, offset: i16 },
    Lbu { rt: Register, base: Register, offset: i16 },
    Sb { rt: Register, base: Register, offset: i16 },
    Sh { rt: Register, base: Register, offset: i16 },
    Sw { rt: Register, base: Register, offset: i16 },
}

impl Instruction {
    /// Decode `word`, fetched from `pc`
    pub fn decode(word: u32, pc: u32) -> Result<Self> {
        let rs = Register::from_index(word >> 21);
        let rt = Register::from_index(word >> 16);
        let rd = Register::from_index(word >> 11);
        let shamt = (word >> 6) & 0x1F;
        let imm = word as u16;
        let simm = word as u16 as i16;
        let target = word & 0x03FF_FFFF;

        let instruction = match word >> 26 {
            op::SPECIAL => match word & 0x3F {
                funct::SLL => Instruction::Sll { rd, rt, shamt },
                funct::SRL => Instruction::Srl { rd, rt, shamt },
                funct::JR => Instruction::Jr { rs },
                funct::AND => Instruction::And { rd, rs, rt },
                funct::OR => Instruction::Or { rd, rs, rt },
                function => {
                    return Err(EmulatorError::UnimplementedSpecial { function, word, pc });
                }
            },
            op::J => Instruction::J { target },
            op::JAL => Instruction::Jal { target },
            op::BEQ => Instruction::Beq { rs, rt, offset: simm },
            op::BNE => Instruction::Bne { rs, rt, offset: simm },
            op::BGTZ => Instruction::Bgtz { rs, offset: simm },
            op::ADDIU => Instruction::Addiu { rt, rs, imm: simm },
            op::SLTI => Instruction::Slti { rt, rs, imm: simm },
            op::ANDI => Instruction::Andi { rt, rs, imm },
            op::ORI => Instruction::Ori { rt, rs, imm },
            op::LUI => Instruction::Lui { rt, imm },
            op::LH => Instruction::Lh { rt, base: rs, offset: simm },
            op::LW => Instruction::Lw { rt, base: rs, offset: simm },
            op::LBU => Instruction::Lbu { rt, base: rs, offset: simm },
            op::SB => Instruction::Sb { rt, base: rs, offset: simm },
            op::SH => Instruction::Sh { rt, base: rs, offset: simm },
            op::SW => Instruction::Sw { rt, base: rs, offset: simm },
            opcode => return Err(EmulatorError::UnimplementedOpcode { opcode, word, pc }),
        };
        Ok(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Sll {
                rd: Register::Zero,
                rt: Register::Zero,
                shamt: 0,
            } => write!(f, "nop"),
            Sll { rd, rt, shamt } => write!(f, "sll {rd}, {rt}, {shamt}"),
            Srl { rd, rt, shamt } => write!(f, "srl {rd}, {rt}, {shamt}"),
            Jr { rs } => write!(f, "jr {rs}"),
            And { rd, rs, rt } => write!(f, "and {rd}, {rs}, {rt}"),
            Or { rd, rs, rt } => write!(f, "or {rd}, {rs}, {rt}"),
            J { target } => write!(f, "j {:#x}", target << 2),
            Jal { target } => write!(f, "jal {:#x}", target << 2),
            Beq { rs, rt, offset } => write!(f, "beq {rs}, {rt}, {}", (offset as i32) << 2),
            Bne { rs, rt, offset } => write!(f, "bne {rs}, {rt}, {}", (offset as i32) << 2),
            Bgtz { rs, offset } => write!(f, "bgtz {rs}, {}", (offset as i32) << 2),
            Addiu { rt, rs, imm } => write!(f, "addiu {rt}, {rs}, {imm}"),
            Slti { rt, rs, imm } => write!(f, "slti {rt}, {rs}, {imm}"),
            Andi { rt, rs, imm } => write!(f, "andi {rt}, {rs}, {imm:#x}"),
            Ori { rt, rs, imm } => write!(f, "ori {rt}, {rs}, {imm:#x}"),
            Lui { rt, imm } => write!(f, "lui {rt}, {imm:#x}"),
            Lh { rt, base, offset } => write!(f, "lh {rt}, {offset}({base})"),
            Lw { rt, base, offset } => write!(f, "lw {rt}, {offset}({base})"),
            Lbu { rt, base, offset } => write!(f, "lbu {rt}, {offset}({base})"),
            Sb { rt, base, offset } => write!(f, "sb {rt}, {offset}({base})"),
            Sh { rt, base, offset } => write!(f, "sh {rt}, {offset}({base})"),
            Sw { rt, base, offset } => write!(f, "sw {rt}, {offset}({base})"),
        }
    }
}

/// Register file and program counter
#[derive(Debug, Clone)]
pub struct Cpu {
    regs: [u32; GPR_COUNT],
    pub pc: u32,
}

impl Cpu {
    #[expect(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            regs: [0; GPR_COUNT],
            pc: rom::RESET_VECTOR,
        }
    }

    /// Zero every register and point `pc` at the boot ROM entry
    pub fn reset(&mut self) {
        self.regs = [0; GPR_COUNT];
        self.pc = rom::RESET_VECTOR;
    }

    /// Start executing a loaded executable
    pub fn bootstrap(&mut self, header: &ExeHeader) {
        self.set_reg(Register::Gp, header.gp);
        self.set_reg(Register::Sp, header.sp);
        self.pc = header.pc;
        debug!(
            "CPU bootstrap: pc={:#010X} gp={:#010X} sp={:#010X}",
            header.pc, header.gp, header.sp
        );
    }

    pub fn reg(&self, reg: Register) -> u32 {
        self.regs[reg.index()]
    }

    /// Write a register; writes to `$zero` are discarded
    pub fn set_reg(&mut self, reg: Register, value: u32) {
        if reg != Register::Zero {
            self.regs[reg.index()] = value;
        }
    }

    pub fn regs(&self) -> &[u32; GPR_COUNT] {
        &self.regs
    }

    /// Execute `count` instructions, stopping at the first error
    pub fn run<B: Bus + ?Sized>(&mut self, bus: &mut B, count: usize) -> Result<()> {
        for _ in 0..count {
            self.step(bus)?;
        }
        Ok(())
    }

    /// Execute one instruction, plus its delay slot if it transfers control
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()> {
        let start = self.pc;
        let mut target = None;

        for _ in 0..MAX_DELAY_CHAIN {
            match self.execute_next(bus)? {
                Some(next) => {
                    target.get_or_insert(next);
                }
                None => {
                    if let Some(target) = target {
                        self.pc = target;
                    }
                    return Ok(());
                }
            }
        }
        Err(EmulatorError::RunawayDelaySlots { pc: start })
    }

    /// Fetch, decode and execute the instruction at `pc`, returning the
    /// target of a taken control transfer
    fn execute_next<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<Option<u32>> {
        let pc = self.pc;
        let word = bus.read(Width::Word, pc)?;
        self.pc = pc.wrapping_add(4);

        let instruction = Instruction::decode(word, pc)?;
        trace!("{:#010X}: {}", pc, instruction);
        self.execute(instruction, bus)
    }

    fn jump_target(&self, target: u32) -> u32 {
        (self.pc & 0xF000_0000) | (target << 2)
    }

    fn branch_target(&self, offset: i16) -> u32 {
        self.pc.wrapping_add(((offset as i32) << 2) as u32)
    }

    fn address(&self, base: Register, offset: i16) -> u32 {
        self.reg(base).wrapping_add(offset as i32 as u32)
    }

    /// Apply `instruction`; a taken control transfer yields its target
    /// instead of writing `pc`
    fn execute<B: Bus + ?Sized>(
        &mut self,
        instruction: Instruction,
        bus: &mut B,
    ) -> Result<Option<u32>> {
        use Instruction::*;
        match instruction {
            Sll { rd, rt, shamt } => self.set_reg(rd, self.reg(rt) << shamt),
            Srl { rd, rt, shamt } => self.set_reg(rd, self.reg(rt) >> shamt),
            Jr { rs } => return Ok(Some(self.reg(rs))),
            And { rd, rs, rt } => self.set_reg(rd, self.reg(rs) & self.reg(rt)),
            Or { rd, rs, rt } => self.set_reg(rd, self.reg(rs) | self.reg(rt)),
            J { target } => return Ok(Some(self.jump_target(target))),
            Jal { target } => {
                self.set_reg(Register::Ra, self.pc.wrapping_add(4));
                return Ok(Some(self.jump_target(target)));
            }
            Beq { rs, rt, offset } => {
                if self.reg(rs) == self.reg(rt) {
                    return Ok(Some(self.branch_target(offset)));
                }
            }
            Bne { rs, rt, offset } => {
                if self.reg(rs) != self.reg(rt) {
                    return Ok(Some(self.branch_target(offset)));
                }
            }
            Bgtz { rs, offset } => {
                if (self.reg(rs) as i32) > 0 {
                    return Ok(Some(self.branch_target(offset)));
                }
            }
            Addiu { rt, rs, imm } => {
                self.set_reg(rt, self.reg(rs).wrapping_add(imm as i32 as u32))
            }
            Slti { rt, rs, imm } => {
                self.set_reg(rt, ((self.reg(rs) as i32) < imm as i32) as u32)
            }
            Andi { rt, rs, imm } => self.set_reg(rt, self.reg(rs) & imm as u32),
            Ori { rt, rs, imm } => self.set_reg(rt, self.reg(rs) | imm as u32),
            Lui { rt, imm } => self.set_reg(rt, (imm as u32) << 16),
            Lh { rt, base, offset } => {
                let value = bus.read(Width::Half, self.address(base, offset))?;
                self.set_reg(rt, value as u16 as i16 as i32 as u32);
            }
            Lw { rt, base, offset } => {
                let value = bus.read(Width::Word, self.address(base, offset))?;
                self.set_reg(rt, value);
            }
            Lbu { rt, base, offset } => {
                let value = bus.read(Width::Byte, self.address(base, offset))?;
                self.set_reg(rt, value);
            }
            Sb { rt, base, offset } => {
                bus.write(Width::Byte, self.address(base, offset), self.reg(rt))?
            }
            Sh { rt, base, offset } => {
                bus.write(Width::Half, self.address(base, offset), self.reg(rt))?
            }
            Sw { rt, base, offset } => {
                bus.write(Width::Word, self.address(base, offset), self.reg(rt))?
            }
        }
        Ok(None)
    }
}
