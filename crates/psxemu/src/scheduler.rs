//! CPU scheduling in host-sized quanta.
//!
//! The interpreter never throttles itself to real time. Instead the host
//! runs it in fixed batches of steps (roughly one display frame each) and
//! gets control back between batches to present output and check stop
//! conditions.

use crate::cpu::Cpu;
use crate::error::EmulatorError;
use crate::memory::Bus;
use psx_hw::specs::timing;
use tracing::{debug, error, warn};

// ================================================================================================
// Emulation Timing Constants
// ================================================================================================

/// CPU steps per quantum; the host yields once per quantum
pub const STEPS_PER_QUANTUM: usize = timing::STEPS_PER_FRAME;

/// Result of running a single quantum
#[derive(Debug, Clone, PartialEq)]
pub enum QuantumResult {
    /// Quantum completed successfully, continue execution
    Continue,
    /// An error occurred during execution
    Error(EmulatorError),
}

/// Configuration for the scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// CPU steps per quantum; 0 is raised to 1
    pub steps_per_quantum: usize,
    /// Stop when the PC reaches this address.
    ///
    /// Only checked between steps. A delay slot runs inside the step of its
    /// branch, so an address reached only as a delay slot never stops the
    /// run.
    pub stop_pc: Option<u32>,
    /// Stop after this many total instructions
    pub max_instructions: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            steps_per_quantum: STEPS_PER_QUANTUM,
            stop_pc: None,
            max_instructions: None,
        }
    }
}

pub struct Scheduler {
    config: SchedulerConfig,
    total_executed: usize,
    stopped: bool,
}

impl Scheduler {
    pub fn new(mut config: SchedulerConfig) -> Self {
        if config.steps_per_quantum == 0 {
            warn!("Quantum of 0 steps would never advance, using 1");
            config.steps_per_quantum = 1;
        }
        Self {
            config,
            total_executed: 0,
            stopped: false,
        }
    }

    /// Whether the CPU reached the stop PC
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn total_executed(&self) -> usize {
        self.total_executed
    }

    /// Check if any stop condition is met
    pub fn check_stop_conditions(&self) -> bool {
        if self.stopped {
            return true;
        }

        if let Some(max) = self.config.max_instructions
            && self.total_executed >= max
        {
            return true;
        }

        false
    }

    fn is_stop_pc(&self, pc: u32) -> bool {
        self.config.stop_pc == Some(pc)
    }

    /// Run up to one quantum of CPU steps.
    ///
    /// The quantum ends early when the PC reaches the stop address or the
    /// instruction limit is hit; the CPU is left at the instruction that
    /// would have run next.
    pub fn run_quantum<B: Bus + ?Sized>(&mut self, cpu: &mut Cpu, bus: &mut B) -> QuantumResult {
        let _span = tracing::error_span!("CPU").entered();

        for _ in 0..self.config.steps_per_quantum {
            if self.is_stop_pc(cpu.pc) {
                debug!("Reached stop PC {:#010X}", cpu.pc);
                self.stopped = true;
                break;
            }
            if self.check_stop_conditions() {
                break;
            }

            if let Err(e) = cpu.step(bus) {
                error!("{}", e);
                return QuantumResult::Error(e);
            }
            self.total_executed += 1;
        }

        // Catch a stop PC landed on by the last step of the quantum
        if self.is_stop_pc(cpu.pc) {
            self.stopped = true;
        }

        QuantumResult::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Region, Width};

    struct FlatBus(Region);

    impl Bus for FlatBus {
        fn read(&self, width: Width, addr: u32) -> crate::error::Result<u32> {
            Ok(self.0.load(width, addr))
        }

        fn write(&mut self, width: Width, addr: u32, value: u32) -> crate::error::Result<()> {
            self.0.store(width, addr, value);
            Ok(())
        }
    }

    /// A tight loop at 0x0: `addiu $t0, $t0, 1; beq $zero, $zero, -2; nop`
    fn counting_loop() -> FlatBus {
        let mut region = Region::new(0x100);
        region.store_word(0x0, 0x2508_0001);
        region.store_word(0x4, 0x1000_FFFE);
        region.store_word(0x8, 0x0000_0000);
        FlatBus(region)
    }

    fn cpu_at_zero() -> Cpu {
        let mut cpu = Cpu::new();
        cpu.pc = 0;
        cpu
    }

    #[test]
    fn quantum_runs_configured_steps() {
        let mut bus = counting_loop();
        let mut cpu = cpu_at_zero();
        let mut scheduler = Scheduler::new(SchedulerConfig {
            steps_per_quantum: 10,
            ..Default::default()
        });

        assert_eq!(scheduler.run_quantum(&mut cpu, &mut bus), QuantumResult::Continue);
        assert_eq!(scheduler.total_executed(), 10);
        assert!(!scheduler.check_stop_conditions());

        // Each iteration is two steps: the addiu and the branch (which runs
        // its delay slot inside the same step)
        assert_eq!(cpu.reg(crate::cpu_types::Register::T0), 5);
    }

    #[test]
    fn stops_at_max_instructions() {
        let mut bus = counting_loop();
        let mut cpu = cpu_at_zero();
        let mut scheduler = Scheduler::new(SchedulerConfig {
            steps_per_quantum: 100,
            max_instructions: Some(7),
            ..Default::default()
        });

        scheduler.run_quantum(&mut cpu, &mut bus);

        assert_eq!(scheduler.total_executed(), 7);
        assert!(scheduler.check_stop_conditions());
        assert!(!scheduler.stopped());
    }

    #[test]
    fn stops_at_pc() {
        let mut bus = counting_loop();
        let mut cpu = cpu_at_zero();
        let mut scheduler = Scheduler::new(SchedulerConfig {
            steps_per_quantum: 100,
            stop_pc: Some(0x4),
            ..Default::default()
        });

        scheduler.run_quantum(&mut cpu, &mut bus);

        assert!(scheduler.stopped());
        assert_eq!(cpu.pc, 0x4);
        assert_eq!(scheduler.total_executed(), 1);
    }

    #[test]
    fn empty_quantum_still_advances() {
        let mut bus = counting_loop();
        let mut cpu = cpu_at_zero();
        let mut scheduler = Scheduler::new(SchedulerConfig {
            steps_per_quantum: 0,
            ..Default::default()
        });

        scheduler.run_quantum(&mut cpu, &mut bus);
        assert_eq!(scheduler.total_executed(), 1);
    }

    #[test]
    fn stop_pc_in_delay_slot_is_not_seen() {
        let mut bus = counting_loop();
        let mut cpu = cpu_at_zero();
        let mut scheduler = Scheduler::new(SchedulerConfig {
            steps_per_quantum: 100,
            stop_pc: Some(0x8),
            ..Default::default()
        });

        scheduler.run_quantum(&mut cpu, &mut bus);

        assert!(!scheduler.stopped());
        assert_eq!(scheduler.total_executed(), 100);
    }

    #[test]
    fn error_ends_quantum() {
        let mut region = Region::new(0x100);
        region.store_word(0x0, 0x2508_0001); // addiu $t0, $t0, 1
        region.store_word(0x4, 0xFC00_0000); // unimplemented opcode 0x3f
        let mut bus = FlatBus(region);
        let mut cpu = cpu_at_zero();
        let mut scheduler = Scheduler::new(SchedulerConfig::default());

        let result = scheduler.run_quantum(&mut cpu, &mut bus);

        assert_eq!(
            result,
            QuantumResult::Error(EmulatorError::UnimplementedOpcode {
                opcode: 0x3F,
                word: 0xFC00_0000,
                pc: 0x4
            })
        );
        assert_eq!(scheduler.total_executed(), 1);
    }
}
