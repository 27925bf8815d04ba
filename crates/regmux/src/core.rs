//! Live CPU handle.
//!
//! This module provides the register API of a running CPU: the state record
//! the execution engine works on, the mode it runs in, the guest memory used
//! for descriptor fetches and the latch that tells the engine to re-dispatch.

use crate::access::RegisterAccess;
use crate::arch::{AccessEnv, Arch, Mode, RegisterFile, StateRecord};
use crate::batch::{self, ReadSlot, WriteOutcome, WriteSlot};
use crate::context::Context;
use crate::error::{BatchError, ConfigError, ContextError};
use crate::feedback::ExitLatch;
use crate::memory::{GuestMemory, NoMemory};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Configuration for a CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuConfig {
    pub arch: Arch,
    pub mode: Mode,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            arch: Arch::X86,
            mode: Mode::Bits64,
        }
    }
}

/// A CPU whose registers the execution engine is using.
pub struct Cpu {
    record: StateRecord,
    mode: Mode,
    memory: Arc<dyn GuestMemory>,
    exit: ExitLatch,
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("arch", &self.arch())
            .field("mode", &self.mode)
            .field("pc", &self.pc())
            .finish_non_exhaustive()
    }
}

impl Cpu {
    /// Create a CPU in reset state with no guest memory mapped.
    pub fn new(config: CpuConfig) -> Result<Self, ConfigError> {
        Self::with_memory(config, NoMemory)
    }

    /// Create a CPU whose selector loads fetch descriptors from `memory`.
    pub fn with_memory(
        config: CpuConfig,
        memory: impl GuestMemory + 'static,
    ) -> Result<Self, ConfigError> {
        let CpuConfig { arch, mode } = config;
        if !arch.supports(mode) {
            return Err(ConfigError::UnsupportedMode { arch, mode });
        }
        info!(%arch, %mode, "creating cpu");
        let mut cpu = Self {
            record: StateRecord::new(arch),
            mode,
            memory: Arc::new(memory),
            exit: ExitLatch::new(),
        };
        cpu.reset();
        Ok(cpu)
    }

    /// Replace the guest memory view. Contexts saved earlier keep the
    /// view they were saved with.
    pub fn set_memory(&mut self, memory: impl GuestMemory + 'static) {
        self.memory = Arc::new(memory);
    }

    pub fn state(&self) -> &StateRecord {
        &self.record
    }

    /// Direct access for the execution engine. Changes made here bypass the
    /// accessors and never raise the exit latch.
    pub fn state_mut(&mut self) -> &mut StateRecord {
        &mut self.record
    }

    /// Handle for the execution engine to poll.
    pub fn exit_latch(&self) -> ExitLatch {
        self.exit.clone()
    }

    #[instrument(level = "trace", skip(self), fields(arch = %self.record.arch(), mode = %self.mode))]
    pub fn reset(&mut self) {
        self.record.reset(self.mode);
    }

    pub fn pc(&self) -> u64 {
        self.record.pc(self.mode)
    }

    pub fn set_pc(&mut self, pc: u64) {
        self.record.set_pc(self.mode, pc);
        self.exit.raise();
    }

    #[instrument(level = "trace", skip(self))]
    pub fn save_context(&self) -> Context {
        Context::from_record(self.record.clone(), self.mode, Arc::clone(&self.memory))
    }

    /// Overwrite this CPU's registers with a saved context.
    #[instrument(level = "trace", skip(self, context))]
    pub fn restore_context(&mut self, context: &Context) -> Result<(), ContextError> {
        let (arch, mode) = (self.arch(), self.mode);
        if context.arch() != arch || context.mode() != mode {
            return Err(ContextError::Mismatch {
                saved_arch: context.arch(),
                saved_mode: context.mode(),
                arch,
                mode,
            });
        }
        self.record = context.record().clone();
        debug!(pc = self.pc(), "context restored");
        self.exit.raise();
        Ok(())
    }
}

impl RegisterAccess for Cpu {
    fn arch(&self) -> Arch {
        self.record.arch()
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn reg_read(&mut self, slots: &mut [ReadSlot<'_>]) -> Result<(), BatchError> {
        let mut env = AccessEnv::new(self.mode, self.memory.as_ref());
        batch::read_batch(&mut self.record, &mut env, slots)
    }

    fn reg_write(&mut self, slots: &[WriteSlot<'_>]) -> Result<WriteOutcome, BatchError> {
        let mut env = AccessEnv::new(self.mode, self.memory.as_ref());
        let result = batch::write_batch(&mut self.record, &mut env, slots);
        // committed PC writes stand even when a later element failed
        let pc_changed = env.pc_dirty();
        if pc_changed {
            self.exit.raise();
        }
        result.map(|()| WriteOutcome { pc_changed })
    }

    fn register_width(&self, id: u32) -> Option<usize> {
        self.record.width(self.mode, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::x86::X86Reg;

    #[test]
    fn rejects_unsupported_modes() {
        let err = Cpu::new(CpuConfig {
            arch: Arch::Sparc,
            mode: Mode::Bits64,
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedMode {
                arch: Arch::Sparc,
                mode: Mode::Bits64
            }
        );
    }

    #[test]
    fn set_pc_raises_the_latch() {
        let mut cpu = Cpu::new(CpuConfig::default()).unwrap();
        let latch = cpu.exit_latch();
        cpu.set_pc(0x40_0000);
        assert_eq!(cpu.pc(), 0x40_0000);
        assert!(latch.take());
        assert_eq!(cpu.read::<u64>(X86Reg::Rip).unwrap(), 0x40_0000);
    }

    #[test]
    fn restore_requires_matching_mode() {
        let cpu32 = Cpu::new(CpuConfig {
            arch: Arch::X86,
            mode: Mode::Bits32,
        })
        .unwrap();
        let mut cpu64 = Cpu::new(CpuConfig::default()).unwrap();
        let err = cpu64.restore_context(&cpu32.save_context()).unwrap_err();
        assert!(matches!(err, ContextError::Mismatch { .. }));
    }
}
