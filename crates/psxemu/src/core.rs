//! Core emulator API.
//!
//! This module provides the main emulator interface that can be used both
//! for headless testing and as the backend for graphical frontends.

use crate::cpu::Cpu;
use crate::cpu_types::Register;
use crate::error::EmulatorError;
use crate::memory::{Bus, Width};
use crate::mmio::EmulatorState;
use crate::render::Renderer;
use crate::scheduler::{QuantumResult, STEPS_PER_QUANTUM, Scheduler, SchedulerConfig};
use std::time::Instant;
use tracing::info;

/// Configuration for the emulator
#[derive(Debug, Clone, Default)]
pub struct EmulatorConfig {
    /// Optional boot ROM image
    pub bios: Option<Vec<u8>>,
    /// Stop when the PC reaches this address
    pub stop_pc: Option<u32>,
    /// Stop after this many total instructions
    pub max_instructions: Option<usize>,
    /// Optional timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// CPU steps per quantum; `None` uses [`STEPS_PER_QUANTUM`]
    pub steps_per_quantum: Option<usize>,
}

/// Result of running the emulator
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// Reached a stop condition (PC match, max instructions)
    StopCondition,
    /// Timeout reached
    Timeout,
    /// Emulation error occurred
    Error(EmulatorError),
}

pub struct EmulatorCore<R: Renderer> {
    cpu: Cpu,
    state: EmulatorState<R>,
    scheduler: Scheduler,

    timeout_ms: Option<u64>,
    start_time: Instant,
}

impl<R: Renderer> EmulatorCore<R> {
    /// Reset the machine and load an executable into it
    pub fn new(
        exe_data: &[u8],
        config: EmulatorConfig,
        renderer: R,
    ) -> Result<Self, EmulatorError> {
        info!("=== Reset ===");
        let mut cpu = Cpu::new();
        let mut state = EmulatorState::new(renderer);
        cpu.reset();
        state.reset();

        if let Some(bios) = &config.bios {
            state.memory.load_rom(bios);
        }

        info!("=== Loading Executable ===");
        let header = state.memory.write_executable(exe_data)?;
        info!("Entry: {:#010X}", header.pc);
        info!(
            "Payload: {:#X} bytes at {:#010X}",
            header.size, header.load_address
        );
        cpu.bootstrap(&header);

        let scheduler = Scheduler::new(SchedulerConfig {
            steps_per_quantum: config.steps_per_quantum.unwrap_or(STEPS_PER_QUANTUM),
            stop_pc: config.stop_pc,
            max_instructions: config.max_instructions,
        });

        Ok(Self {
            cpu,
            state,
            scheduler,
            timeout_ms: config.timeout_ms,
            start_time: Instant::now(),
        })
    }

    /// Run a single quantum of execution
    pub fn step(&mut self) -> QuantumResult {
        self.scheduler.run_quantum(&mut self.cpu, &mut self.state)
    }

    /// Check if any stop condition is met
    pub fn should_stop(&self) -> bool {
        self.scheduler.check_stop_conditions() || self.timed_out()
    }

    fn timed_out(&self) -> bool {
        if let Some(timeout_ms) = self.timeout_ms {
            let elapsed_ms = self.start_time.elapsed().as_millis() as u64;
            if elapsed_ms >= timeout_ms {
                info!("Timeout reached: {} ms", elapsed_ms);
                return true;
            }
        }
        false
    }

    /// Run until a stop condition is reached
    pub fn run(&mut self) -> StopReason {
        loop {
            if self.scheduler.check_stop_conditions() {
                return StopReason::StopCondition;
            }
            if self.timed_out() {
                return StopReason::Timeout;
            }

            match self.step() {
                QuantumResult::Continue => {}
                QuantumResult::Error(e) => return StopReason::Error(e),
            }
        }
    }

    pub fn pc(&self) -> u32 {
        self.cpu.pc
    }

    pub fn reg(&self, reg: Register) -> u32 {
        self.cpu.reg(reg)
    }

    /// Check if the CPU has stopped (reached the stop PC)
    pub fn stopped(&self) -> bool {
        self.scheduler.stopped()
    }

    /// Get total instructions executed
    pub fn total_executed(&self) -> usize {
        self.scheduler.total_executed()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    pub fn renderer(&self) -> &R {
        &self.state.renderer
    }

    /// Read a word through the guest bus
    pub fn read_word(&self, addr: u32) -> Result<u32, EmulatorError> {
        self.state.read(Width::Word, addr)
    }

    /// Print final emulator state
    pub fn print_final_state(&self) {
        info!("Total instructions executed: {}", self.total_executed());
        info!("Elapsed time: {:.2?}", self.elapsed());

        let r = |reg| self.reg(reg);
        info!(
            "CPU: pc={:#x} v0={:#x} v1={:#x} a0={:#x} a1={:#x} a2={:#x} a3={:#x} gp={:#x} sp={:#x} ra={:#x}",
            self.pc(),
            r(Register::V0),
            r(Register::V1),
            r(Register::A0),
            r(Register::A1),
            r(Register::A2),
            r(Register::A3),
            r(Register::Gp),
            r(Register::Sp),
            r(Register::Ra)
        );
    }
}
