//! Saved CPU contexts.
//!
//! A [`Context`] is a detached copy of a CPU's state record. It is read and
//! written through exactly the same accessors as the live CPU, but nothing is
//! executing from it, so program counter writes have nobody to notify.
//!
//! A saved context shares the guest memory of the CPU it came from, so
//! selector loads fetch the same descriptors on both. A deserialized context
//! has no memory until one is attached with [`Context::set_memory`].

use crate::access::RegisterAccess;
use crate::arch::{AccessEnv, Arch, Mode, RegisterFile, StateRecord};
use crate::batch::{self, ReadSlot, WriteOutcome, WriteSlot};
use crate::error::BatchError;
use crate::memory::{GuestMemory, NoMemory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Serialize, Deserialize)]
pub struct Context {
    mode: Mode,
    record: StateRecord,
    #[serde(skip, default = "detached")]
    memory: Arc<dyn GuestMemory>,
}

fn detached() -> Arc<dyn GuestMemory> {
    Arc::new(NoMemory)
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && self.record == other.record
    }
}

impl Eq for Context {}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("mode", &self.mode)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl Context {
    pub(crate) fn from_record(
        record: StateRecord,
        mode: Mode,
        memory: Arc<dyn GuestMemory>,
    ) -> Self {
        Self {
            mode,
            record,
            memory,
        }
    }

    /// Attach the guest memory selector loads read descriptors from.
    pub fn set_memory(&mut self, memory: impl GuestMemory + 'static) {
        self.memory = Arc::new(memory);
    }

    pub fn arch(&self) -> Arch {
        self.record.arch()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn record(&self) -> &StateRecord {
        &self.record
    }

    pub fn pc(&self) -> u64 {
        self.record.pc(self.mode)
    }

    /// Write batch whose selector loads fetch descriptors from `memory`
    /// instead of the attached view.
    pub fn reg_write_with_memory(
        &mut self,
        memory: &dyn GuestMemory,
        slots: &[WriteSlot<'_>],
    ) -> Result<WriteOutcome, BatchError> {
        let mut env = AccessEnv::new(self.mode, memory);
        batch::write_batch(&mut self.record, &mut env, slots)?;
        Ok(WriteOutcome {
            pc_changed: env.pc_dirty(),
        })
    }
}

impl RegisterAccess for Context {
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
        let memory = Arc::clone(&self.memory);
        self.reg_write_with_memory(memory.as_ref(), slots)
    }

    fn register_width(&self, id: u32) -> Option<usize> {
        self.record.width(self.mode, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::mips::MipsReg;
    use crate::core::{Cpu, CpuConfig};

    #[test]
    fn context_is_a_copy() {
        let mut cpu = Cpu::new(CpuConfig {
            arch: Arch::Mips,
            mode: Mode::Bits32,
        })
        .unwrap();
        cpu.write(MipsReg::R4, 4u32).unwrap();
        let mut context = cpu.save_context();
        context.write(MipsReg::R4, 5u32).unwrap();
        let outcome = context.write(MipsReg::Pc, 0x8000_0000u32).unwrap();
        assert!(outcome.pc_changed);

        assert_eq!(cpu.read::<u32>(MipsReg::R4).unwrap(), 4);
        assert_eq!(context.read::<u32>(MipsReg::R4).unwrap(), 5);
        assert_eq!(context.pc(), 0x8000_0000);
        assert!(!cpu.exit_latch().is_pending());
    }
}
