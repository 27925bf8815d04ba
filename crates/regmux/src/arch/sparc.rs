//! SPARC V8 register accessor.
//!
//! Out, local and in registers are resolved through the current window
//! pointer. The ins of window `cwp` are the same storage as the outs of
//! window `cwp + 1`, so a value written as `%i0` shows up as `%o0` once the
//! window rotates.

use crate::arch::{AccessEnv, Mode, RegisterFile};
use crate::error::{RegError, Result};
use crate::regid::{family_index, register_ids};
use crate::value::{ValueCell, ValueRef, get_scalar, put_scalar};
use regmux_hw::sparc::{INSN_SIZE, NWINDOWS, WINDOW_GROUP, WINDOW_STRIDE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

register_ids! {
    pub enum SparcReg {
        Invalid = "invalid",
        G0 = "g0",
        G1 = "g1",
        G2 = "g2",
        G3 = "g3",
        G4 = "g4",
        G5 = "g5",
        G6 = "g6",
        G7 = "g7",
        O0 = "o0",
        O1 = "o1",
        O2 = "o2",
        O3 = "o3",
        O4 = "o4",
        O5 = "o5",
        O6 = "o6",
        O7 = "o7",
        L0 = "l0",
        L1 = "l1",
        L2 = "l2",
        L3 = "l3",
        L4 = "l4",
        L5 = "l5",
        L6 = "l6",
        L7 = "l7",
        I0 = "i0",
        I1 = "i1",
        I2 = "i2",
        I3 = "i3",
        I4 = "i4",
        I5 = "i5",
        I6 = "i6",
        I7 = "i7",
        Pc = "pc",
        Npc = "npc",
    }
}

const WIDTH: usize = 4;

const WINDOW_REGS: usize = NWINDOWS * WINDOW_STRIDE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("register window file holds {len} registers, expected {expected}")]
pub struct WindowFileLen {
    pub len: usize,
    pub expected: usize,
}

/// Outs and locals of every window, `WINDOW_STRIDE` registers per window.
///
/// Serialized as a flat sequence; anything but exactly `NWINDOWS *
/// WINDOW_STRIDE` entries is rejected when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct WindowFile([u32; WINDOW_REGS]);

impl Default for WindowFile {
    fn default() -> Self {
        WindowFile([0; WINDOW_REGS])
    }
}

impl TryFrom<Vec<u32>> for WindowFile {
    type Error = WindowFileLen;

    fn try_from(regs: Vec<u32>) -> std::result::Result<Self, Self::Error> {
        let len = regs.len();
        <[u32; WINDOW_REGS]>::try_from(regs)
            .map(WindowFile)
            .map_err(|_| WindowFileLen {
                len,
                expected: WINDOW_REGS,
            })
    }
}

impl From<WindowFile> for Vec<u32> {
    fn from(file: WindowFile) -> Self {
        file.0.to_vec()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparcState {
    pub gregs: [u32; WINDOW_GROUP],
    pub windows: WindowFile,
    /// Current window pointer.
    pub cwp: usize,
    pub pc: u32,
    pub npc: u32,
}

impl SparcState {
    /// Index into `windows` of the `n`th register of `group` (0 = outs,
    /// 1 = locals, 2 = ins) as seen from the current window.
    fn window_slot(&self, group: usize, n: usize) -> usize {
        let cwp = self.cwp % NWINDOWS;
        match group {
            0 => cwp * WINDOW_STRIDE + n,
            1 => cwp * WINDOW_STRIDE + WINDOW_GROUP + n,
            _ => ((cwp + 1) % NWINDOWS) * WINDOW_STRIDE + n,
        }
    }

    fn slot(&mut self, mode: Mode, reg: SparcReg) -> Result<&mut u32> {
        let id = reg.id();
        if let Some(n) = family_index(id, SparcReg::G0, WINDOW_GROUP) {
            return Ok(&mut self.gregs[n]);
        }
        for (group, first) in [SparcReg::O0, SparcReg::L0, SparcReg::I0].into_iter().enumerate() {
            if let Some(n) = family_index(id, first, WINDOW_GROUP) {
                let index = self.window_slot(group, n);
                return Ok(&mut self.windows.0[index]);
            }
        }
        match reg {
            SparcReg::Pc => Ok(&mut self.pc),
            SparcReg::Npc => Ok(&mut self.npc),
            _ => Err(RegError::UnknownRegister { id, mode }),
        }
    }

    fn lookup(mode: Mode, id: u32) -> Result<SparcReg> {
        SparcReg::from_u32(id)
            .filter(|reg| *reg != SparcReg::Invalid && mode == Mode::Bits32)
            .ok_or(RegError::UnknownRegister { id, mode })
    }
}

impl RegisterFile for SparcState {
    fn width(&self, mode: Mode, id: u32) -> Option<usize> {
        Self::lookup(mode, id).ok().map(|_| WIDTH)
    }

    fn read(&mut self, env: &mut AccessEnv<'_>, id: u32, cell: &mut ValueCell<'_>) -> Result<()> {
        let mode = env.mode();
        let reg = Self::lookup(mode, id)?;
        let out = cell.claim(id, WIDTH)?;
        put_scalar(out, *self.slot(mode, reg)? as u64);
        Ok(())
    }

    fn write(&mut self, env: &mut AccessEnv<'_>, id: u32, value: ValueRef<'_>) -> Result<()> {
        let mode = env.mode();
        let reg = Self::lookup(mode, id)?;
        if reg == SparcReg::Npc {
            return Err(RegError::ReadOnly { id, mode });
        }
        let value = get_scalar(value.claim(id, WIDTH)?) as u32;
        if reg == SparcReg::Pc {
            self.set_pc(mode, value as u64);
            env.mark_pc_dirty();
        } else {
            *self.slot(mode, reg)? = value;
        }
        Ok(())
    }

    fn reset(&mut self, _mode: Mode) {
        *self = SparcState::default();
    }

    fn pc(&self, _mode: Mode) -> u64 {
        self.pc as u64
    }

    fn set_pc(&mut self, _mode: Mode, pc: u64) {
        self.pc = pc as u32;
        self.npc = self.pc.wrapping_add(INSN_SIZE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::NoMemory;

    fn write(state: &mut SparcState, reg: SparcReg, value: u32) -> bool {
        let mut env = AccessEnv::new(Mode::Bits32, &NoMemory);
        state
            .write(&mut env, reg.id(), ValueRef::new(&value.to_le_bytes()))
            .unwrap();
        env.pc_dirty()
    }

    fn read(state: &mut SparcState, reg: SparcReg) -> u32 {
        let mut env = AccessEnv::new(Mode::Bits32, &NoMemory);
        let mut buf = [0u8; 4];
        state
            .read(&mut env, reg.id(), &mut ValueCell::new(&mut buf))
            .unwrap();
        u32::from_le_bytes(buf)
    }

    #[test]
    fn ins_alias_outs_of_the_next_window() {
        let mut state = SparcState::default();
        state.cwp = 2;
        write(&mut state, SparcReg::I3, 0xfeed);
        write(&mut state, SparcReg::L3, 0x1111);
        state.cwp = 3;
        assert_eq!(read(&mut state, SparcReg::O3), 0xfeed);
        assert_eq!(read(&mut state, SparcReg::L3), 0);
    }

    #[test]
    fn last_window_wraps_to_the_first() {
        let mut state = SparcState::default();
        state.cwp = NWINDOWS - 1;
        write(&mut state, SparcReg::I0, 7);
        state.cwp = 0;
        assert_eq!(read(&mut state, SparcReg::O0), 7);
    }

    #[test]
    fn window_file_length_is_checked() {
        assert!(WindowFile::try_from(vec![0; WINDOW_REGS]).is_ok());
        let err = WindowFile::try_from(vec![1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            WindowFileLen {
                len: 3,
                expected: WINDOW_REGS
            }
        );
    }

    #[test]
    fn pc_write_moves_npc() {
        let mut state = SparcState::default();
        assert!(write(&mut state, SparcReg::Pc, 0x4000));
        assert_eq!(read(&mut state, SparcReg::Npc), 0x4004);
        assert!(!write(&mut state, SparcReg::G1, 1));

        let mut env = AccessEnv::new(Mode::Bits32, &NoMemory);
        let err = state
            .write(&mut env, SparcReg::Npc.id(), ValueRef::new(&[0; 4]))
            .unwrap_err();
        assert!(matches!(err, RegError::ReadOnly { .. }));
    }
}
