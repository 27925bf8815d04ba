//! RH850 register accessor.
//!
//! Thirty-two general registers, the PC and eight banks of 32 system
//! registers addressed by selection ID. The documented system registers have
//! names; every bank slot is also reachable through the raw identifier
//! returned by [`sysreg_id`].

use crate::arch::{AccessEnv, Mode, RegisterFile};
use crate::error::{RegError, Result};
use crate::regid::{family_index, register_ids};
use crate::value::{ValueCell, ValueRef, get_scalar, put_scalar};
use regmux_hw::rh850::{BANK_SIZE, GPRS, SYSREG_BANKS, sysreg};
use serde::{Deserialize, Serialize};

register_ids! {
    pub enum Rh850Reg {
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
        Pc = "pc",
        Eipc = "eipc",
        Eipsw = "eipsw",
        Fepc = "fepc",
        Fepsw = "fepsw",
        Psw = "psw",
        Fpsr = "fpsr",
        Fpepc = "fpepc",
        Fpst = "fpst",
        Fpcc = "fpcc",
        Fpcfg = "fpcfg",
        Fpec = "fpec",
        Eiic = "eiic",
        Feic = "feic",
        Ctpc = "ctpc",
        Ctpsw = "ctpsw",
        Ctbp = "ctbp",
        Eiwr = "eiwr",
        Fewr = "fewr",
        Bsel = "bsel",
        Mcfg0 = "mcfg0",
        Rbase = "rbase",
        Ebase = "ebase",
        Intbp = "intbp",
        Mctl = "mctl",
        Pid = "pid",
        Sccfg = "sccfg",
        Scbp = "scbp",
        Htcfg0 = "htcfg0",
        Mea = "mea",
        Asid = "asid",
        Mei = "mei",
    }
}

const WIDTH: usize = 4;

/// Raw identifier of system register bank 0, slot 0. Bank `sel`, slot `n`
/// is `SYSREG_BASE + sel * BANK_SIZE + n`.
pub const SYSREG_BASE: u32 = 0x100;

/// Raw identifier of system register `n` in bank `sel`.
pub fn sysreg_id(sel: usize, n: usize) -> Option<u32> {
    (sel < SYSREG_BANKS && n < BANK_SIZE).then(|| SYSREG_BASE + (sel * BANK_SIZE + n) as u32)
}

impl Rh850Reg {
    /// Bank and slot of a named system register.
    pub fn sysreg(self) -> Option<sysreg::Loc> {
        use Rh850Reg as R;
        let loc = match self {
            R::Eipc => sysreg::EIPC,
            R::Eipsw => sysreg::EIPSW,
            R::Fepc => sysreg::FEPC,
            R::Fepsw => sysreg::FEPSW,
            R::Psw => sysreg::PSW,
            R::Fpsr => sysreg::FPSR,
            R::Fpepc => sysreg::FPEPC,
            R::Fpst => sysreg::FPST,
            R::Fpcc => sysreg::FPCC,
            R::Fpcfg => sysreg::FPCFG,
            R::Fpec => sysreg::FPEC,
            R::Eiic => sysreg::EIIC,
            R::Feic => sysreg::FEIC,
            R::Ctpc => sysreg::CTPC,
            R::Ctpsw => sysreg::CTPSW,
            R::Ctbp => sysreg::CTBP,
            R::Eiwr => sysreg::EIWR,
            R::Fewr => sysreg::FEWR,
            R::Bsel => sysreg::BSEL,
            R::Mcfg0 => sysreg::MCFG0,
            R::Rbase => sysreg::RBASE,
            R::Ebase => sysreg::EBASE,
            R::Intbp => sysreg::INTBP,
            R::Mctl => sysreg::MCTL,
            R::Pid => sysreg::PID,
            R::Sccfg => sysreg::SCCFG,
            R::Scbp => sysreg::SCBP,
            R::Htcfg0 => sysreg::HTCFG0,
            R::Mea => sysreg::MEA,
            R::Asid => sysreg::ASID,
            R::Mei => sysreg::MEI,
            _ => return None,
        };
        Some(loc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Gpr(usize),
    Pc,
    Sys(usize, usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rh850State {
    pub gpr: [u32; GPRS],
    pub pc: u32,
    /// System registers, indexed by selection ID then register number.
    pub sysregs: [[u32; BANK_SIZE]; SYSREG_BANKS],
}

impl Rh850State {
    fn lookup(mode: Mode, id: u32) -> Result<Slot> {
        let unknown = RegError::UnknownRegister { id, mode };
        if mode != Mode::Bits32 {
            return Err(unknown);
        }
        if let Some(n) = family_index(id, Rh850Reg::R0, GPRS) {
            return Ok(Slot::Gpr(n));
        }
        if let Some(n) = family_index(id, SYSREG_BASE, SYSREG_BANKS * BANK_SIZE) {
            return Ok(Slot::Sys(n / BANK_SIZE, n % BANK_SIZE));
        }
        match Rh850Reg::from_u32(id) {
            Some(Rh850Reg::Pc) => Ok(Slot::Pc),
            Some(reg) => reg.sysreg().map(|(sel, n)| Slot::Sys(sel, n)).ok_or(unknown),
            None => Err(unknown),
        }
    }

    fn slot(&mut self, slot: Slot) -> &mut u32 {
        match slot {
            Slot::Gpr(n) => &mut self.gpr[n],
            Slot::Pc => &mut self.pc,
            Slot::Sys(sel, n) => &mut self.sysregs[sel][n],
        }
    }
}

impl RegisterFile for Rh850State {
    fn width(&self, mode: Mode, id: u32) -> Option<usize> {
        Self::lookup(mode, id).ok().map(|_| WIDTH)
    }

    fn read(&mut self, env: &mut AccessEnv<'_>, id: u32, cell: &mut ValueCell<'_>) -> Result<()> {
        let slot = Self::lookup(env.mode(), id)?;
        let out = cell.claim(id, WIDTH)?;
        put_scalar(out, *self.slot(slot) as u64);
        Ok(())
    }

    fn write(&mut self, env: &mut AccessEnv<'_>, id: u32, value: ValueRef<'_>) -> Result<()> {
        let mode = env.mode();
        let slot = Self::lookup(mode, id)?;
        let value = get_scalar(value.claim(id, WIDTH)?) as u32;
        if slot == Slot::Pc {
            self.set_pc(mode, value as u64);
            env.mark_pc_dirty();
        } else {
            *self.slot(slot) = value;
        }
        Ok(())
    }

    fn reset(&mut self, _mode: Mode) {
        *self = Rh850State::default();
    }

    fn pc(&self, _mode: Mode) -> u64 {
        self.pc as u64
    }

    fn set_pc(&mut self, _mode: Mode, pc: u64) {
        self.pc = pc as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::NoMemory;

    fn write(state: &mut Rh850State, id: u32, value: u32) -> bool {
        let mut env = AccessEnv::new(Mode::Bits32, &NoMemory);
        state
            .write(&mut env, id, ValueRef::new(&value.to_le_bytes()))
            .unwrap();
        env.pc_dirty()
    }

    #[test]
    fn named_system_registers_alias_their_bank_slot() {
        let mut state = Rh850State::default();
        write(&mut state, Rh850Reg::Psw.id(), 0x20);
        assert_eq!(state.sysregs[0][5], 0x20);

        let raw = sysreg_id(1, 3).unwrap();
        write(&mut state, raw, 0xfe00_0000);
        assert_eq!(state.sysregs[sysreg::EBASE.0][sysreg::EBASE.1], 0xfe00_0000);
        assert_eq!(sysreg_id(SYSREG_BANKS, 0), None);
        assert_eq!(state.width(Mode::Bits32, sysreg_id(7, 31).unwrap()), Some(4));
        assert_eq!(state.width(Mode::Bits32, sysreg_id(7, 31).unwrap() + 1), None);
    }

    #[test]
    fn only_pc_writes_mark_the_pc_dirty() {
        let mut state = Rh850State::default();
        assert!(!write(&mut state, Rh850Reg::R31.id(), 1));
        assert!(!write(&mut state, Rh850Reg::Eipc.id(), 0x100));
        assert!(write(&mut state, Rh850Reg::Pc.id(), 0x8000));
        assert_eq!(state.pc(Mode::Bits32), 0x8000);
    }

    #[test]
    fn only_32_bit_mode_exists() {
        let state = Rh850State::default();
        assert_eq!(state.width(Mode::Bits64, Rh850Reg::R1.id()), None);
        assert_eq!(state.width(Mode::Bits32, Rh850Reg::Invalid.id()), None);
    }
}
