//! MIPS32 / MIPS64 register accessor.
//!
//! Every register is one machine word wide: 4 bytes in 32-bit mode, 8 in
//! 64-bit mode. Writing CP0 Status re-derives the cached privilege state.

use crate::arch::{AccessEnv, Mode, RegisterFile};
use crate::error::{RegError, Result};
use crate::regid::{family_index, register_ids};
use crate::value::{ValueCell, ValueRef, get_scalar, put_scalar};
use bitflags::bitflags;
use regmux_hw::mips::{ksu, status};
use serde::{Deserialize, Serialize};

register_ids! {
    pub enum MipsReg {
        Invalid = "invalid",
        Pc = "pc",
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
        R16 = "r16",
        R17 = "r17",
        R18 = "r18",
        R19 = "r19",
        R20 = "r20",
        R21 = "r21",
        R22 = "r22",
        R23 = "r23",
        R24 = "r24",
        R25 = "r25",
        R26 = "r26",
        R27 = "r27",
        R28 = "r28",
        R29 = "r29",
        R30 = "r30",
        R31 = "r31",
        Hi = "hi",
        Lo = "lo",
        Cp0Config3 = "cp0_config3",
        Cp0Userlocal = "cp0_userlocal",
        Cp0Status = "cp0_status",
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Privilege {
    #[default]
    Kernel,
    Supervisor,
    User,
}

bitflags! {
    /// State cached from CP0 Status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct MipsHFlags: u32 {
        /// CP0 instructions usable
        const CP0 = 1 << 0;
        /// FPU usable
        const FPU = 1 << 1;
        /// 64-bit FPU registers
        const F64 = 1 << 2;
        /// 64-bit addressing for the current privilege level
        const ADDR64 = 1 << 3;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MipsState {
    pub gpr: [u64; 32],
    pub hi: u64,
    pub lo: u64,
    pub pc: u64,
    pub cp0_config3: u64,
    pub cp0_status: u64,
    pub cp0_userlocal: u64,
    pub privilege: Privilege,
    pub hflags: MipsHFlags,
}

impl MipsState {
    /// Recompute privilege and hflags after a Status change.
    pub fn compute_hflags(&mut self) {
        let sr = self.cp0_status as u32;
        self.privilege = if sr & (status::EXL | status::ERL) != 0 {
            Privilege::Kernel
        } else {
            match (sr & status::KSU_MASK) >> status::KSU_SHIFT {
                ksu::USER => Privilege::User,
                ksu::SUPERVISOR => Privilege::Supervisor,
                _ => Privilege::Kernel,
            }
        };

        let addr64 = match self.privilege {
            Privilege::Kernel => status::KX,
            Privilege::Supervisor => status::SX,
            Privilege::User => status::UX,
        };
        let mut flags = MipsHFlags::empty();
        flags.set(
            MipsHFlags::CP0,
            self.privilege == Privilege::Kernel || sr & status::CU0 != 0,
        );
        flags.set(MipsHFlags::FPU, sr & status::CU1 != 0);
        flags.set(MipsHFlags::F64, sr & status::FR != 0);
        flags.set(MipsHFlags::ADDR64, sr & addr64 != 0);
        self.hflags = flags;
    }

    fn slot(&mut self, reg: MipsReg) -> Option<&mut u64> {
        Some(match reg {
            MipsReg::Pc => &mut self.pc,
            MipsReg::Hi => &mut self.hi,
            MipsReg::Lo => &mut self.lo,
            MipsReg::Cp0Config3 => &mut self.cp0_config3,
            MipsReg::Cp0Userlocal => &mut self.cp0_userlocal,
            MipsReg::Cp0Status => &mut self.cp0_status,
            MipsReg::Invalid => return None,
            gpr => &mut self.gpr[family_index(gpr.id(), MipsReg::R0, 32)?],
        })
    }

    fn lookup(mode: Mode, id: u32) -> Result<MipsReg> {
        MipsReg::from_u32(id)
            .filter(|reg| *reg != MipsReg::Invalid)
            .ok_or(RegError::UnknownRegister { id, mode })
    }
}

fn word_mask(mode: Mode) -> u64 {
    if mode == Mode::Bits64 {
        u64::MAX
    } else {
        u32::MAX as u64
    }
}

impl RegisterFile for MipsState {
    fn width(&self, mode: Mode, id: u32) -> Option<usize> {
        Self::lookup(mode, id).ok().map(|_| mode.word_size())
    }

    fn read(&mut self, env: &mut AccessEnv<'_>, id: u32, cell: &mut ValueCell<'_>) -> Result<()> {
        let mode = env.mode();
        let reg = Self::lookup(mode, id)?;
        let out = cell.claim(id, mode.word_size())?;
        let value = self.slot(reg).map_or(0, |slot| *slot);
        put_scalar(out, value);
        Ok(())
    }

    fn write(&mut self, env: &mut AccessEnv<'_>, id: u32, value: ValueRef<'_>) -> Result<()> {
        let mode = env.mode();
        let reg = Self::lookup(mode, id)?;
        let value = get_scalar(value.claim(id, mode.word_size())?) & word_mask(mode);
        if let Some(slot) = self.slot(reg) {
            *slot = value;
        }
        match reg {
            MipsReg::Pc => env.mark_pc_dirty(),
            MipsReg::Cp0Status => self.compute_hflags(),
            _ => {}
        }
        Ok(())
    }

    fn reset(&mut self, _mode: Mode) {
        *self = MipsState::default();
        self.compute_hflags();
    }

    fn pc(&self, _mode: Mode) -> u64 {
        self.pc
    }

    fn set_pc(&mut self, mode: Mode, pc: u64) {
        self.pc = pc & word_mask(mode);
    }
}
