//! s390x register accessor.
//!
//! The condition code lives outside the PSW mask while code runs, so reading
//! PSWM folds it back in and writing PSWM splits it out again.

use crate::arch::{AccessEnv, Mode, RegisterFile};
use crate::error::{RegError, Result};
use crate::regid::{family_index, register_ids};
use crate::value::{ValueCell, ValueRef, get_scalar, put_scalar};
use regmux_hw::s390x::psw;
use serde::{Deserialize, Serialize};

register_ids! {
    pub enum S390xReg {
        Invalid = "invalid",
        R0 = "r0",
        R1 = "r1",
        R2 = "r2",
        R3 = "r3",
        R4 = "r4",
        R5 = "r5",
        R6 = "r6",
        R7 = "r7",
        R8 = "r8",
        R9 = "r9",
        R10 = "r10",
        R11 = "r11",
        R12 = "r12",
        R13 = "r13",
        R14 = "r14",
        R15 = "r15",
        A0 = "a0",
        A1 = "a1",
        A2 = "a2",
        A3 = "a3",
        A4 = "a4",
        A5 = "a5",
        A6 = "a6",
        A7 = "a7",
        A8 = "a8",
        A9 = "a9",
        A10 = "a10",
        A11 = "a11",
        A12 = "a12",
        A13 = "a13",
        A14 = "a14",
        A15 = "a15",
        Pc = "pc",
        Pswm = "pswm",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Gpr(usize),
    Access(usize),
    Pc,
    Pswm,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S390xState {
    pub regs: [u64; 16],
    pub aregs: [u32; 16],
    pub psw_addr: u64,
    /// PSW mask without the condition code.
    pub psw_mask: u64,
    pub cc_op: u64,
}

impl S390xState {
    /// The architectural PSW mask, condition code included.
    pub fn psw_mask(&self) -> u64 {
        (self.psw_mask & !psw::MASK_CC) | ((self.cc_op & 3) << psw::SHIFT_CC)
    }

    pub fn set_psw_mask(&mut self, mask: u64) {
        self.psw_mask = mask;
        self.cc_op = (mask >> psw::SHIFT_CC) & 3;
    }

    fn lookup(mode: Mode, id: u32) -> Result<Slot> {
        let slot = if mode != Mode::Bits64 {
            None
        } else if let Some(n) = family_index(id, S390xReg::R0, 16) {
            Some(Slot::Gpr(n))
        } else if let Some(n) = family_index(id, S390xReg::A0, 16) {
            Some(Slot::Access(n))
        } else if id == S390xReg::Pc.id() {
            Some(Slot::Pc)
        } else if id == S390xReg::Pswm.id() {
            Some(Slot::Pswm)
        } else {
            None
        };
        slot.ok_or(RegError::UnknownRegister { id, mode })
    }
}

fn slot_width(slot: Slot) -> usize {
    match slot {
        Slot::Access(_) => 4,
        _ => 8,
    }
}

impl RegisterFile for S390xState {
    fn width(&self, mode: Mode, id: u32) -> Option<usize> {
        Self::lookup(mode, id).ok().map(slot_width)
    }

    fn read(&mut self, env: &mut AccessEnv<'_>, id: u32, cell: &mut ValueCell<'_>) -> Result<()> {
        let slot = Self::lookup(env.mode(), id)?;
        let out = cell.claim(id, slot_width(slot))?;
        let value = match slot {
            Slot::Gpr(n) => self.regs[n],
            Slot::Access(n) => self.aregs[n] as u64,
            Slot::Pc => self.psw_addr,
            Slot::Pswm => self.psw_mask(),
        };
        put_scalar(out, value);
        Ok(())
    }

    fn write(&mut self, env: &mut AccessEnv<'_>, id: u32, value: ValueRef<'_>) -> Result<()> {
        let slot = Self::lookup(env.mode(), id)?;
        let value = get_scalar(value.claim(id, slot_width(slot))?);
        match slot {
            Slot::Gpr(n) => self.regs[n] = value,
            Slot::Access(n) => self.aregs[n] = value as u32,
            Slot::Pc => {
                self.psw_addr = value;
                env.mark_pc_dirty();
            }
            Slot::Pswm => self.set_psw_mask(value),
        }
        Ok(())
    }

    fn reset(&mut self, _mode: Mode) {
        *self = S390xState::default();
    }

    fn pc(&self, _mode: Mode) -> u64 {
        self.psw_addr
    }

    fn set_pc(&mut self, _mode: Mode, pc: u64) {
        self.psw_addr = pc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_code_round_trips_through_pswm() {
        let mut state = S390xState::default();
        state.set_psw_mask(psw::MASK_64 | psw::MASK_32 | (2 << psw::SHIFT_CC));
        assert_eq!(state.cc_op, 2);
        state.cc_op = 1;
        assert_eq!(
            state.psw_mask(),
            psw::MASK_64 | psw::MASK_32 | (1 << psw::SHIFT_CC)
        );
    }

    #[test]
    fn access_registers_are_separate_from_gprs() {
        assert_eq!(S390xState::lookup(Mode::Bits64, S390xReg::A3.id()), Ok(Slot::Access(3)));
        assert_eq!(S390xState::lookup(Mode::Bits64, S390xReg::R3.id()), Ok(Slot::Gpr(3)));
        assert!(S390xState::lookup(Mode::Bits32, S390xReg::R3.id()).is_err());
    }
}
