//! RV32 / RV64 register accessor.
//!
//! Integer registers, the program counter and CSRs are XLEN wide. The FP
//! registers are always 8 bytes, since they hold D-extension values on both
//! widths.

mod csr;
mod regs;

pub use csr::{CsrFile, Xlen};
pub use regs::RiscvReg;

use crate::arch::{AccessEnv, Mode, RegisterFile};
use crate::error::{RegError, Result};
use crate::regid::family_index;
use crate::value::{ValueCell, ValueRef, get_scalar, put_scalar};
use csr::CsrError;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Gpr(usize),
    Fpr(usize),
    Csr(u16),
    Pc,
}

impl Slot {
    fn of(id: u32) -> Option<Slot> {
        if let Some(n) = family_index(id, RiscvReg::X0, 32) {
            return Some(Slot::Gpr(n));
        }
        if let Some(n) = family_index(id, RiscvReg::F0, 32) {
            return Some(Slot::Fpr(n));
        }
        let reg = RiscvReg::from_u32(id)?;
        if reg == RiscvReg::Pc {
            return Some(Slot::Pc);
        }
        reg.csr_number().map(Slot::Csr)
    }
}

fn xlen(mode: Mode) -> Xlen {
    if mode == Mode::Bits64 {
        Xlen::Rv64
    } else {
        Xlen::Rv32
    }
}

fn xlen_mask(mode: Mode) -> u64 {
    match xlen(mode) {
        Xlen::Rv32 => u32::MAX as u64,
        Xlen::Rv64 => u64::MAX,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiscvState {
    pub gpr: [u64; 32],
    /// NaN-boxed FP registers.
    pub fpr: [u64; 32],
    pub pc: u64,
    pub csr: CsrFile,
}

impl RiscvState {
    fn lookup(mode: Mode, id: u32) -> Result<Slot> {
        let unknown = RegError::UnknownRegister { id, mode };
        let slot = Slot::of(id).ok_or(unknown.clone())?;
        match slot {
            Slot::Csr(number) if !CsrFile::exists(number, xlen(mode)) => Err(unknown),
            slot => Ok(slot),
        }
    }

    fn csr_error(err: CsrError, id: u32, mode: Mode) -> RegError {
        match err {
            CsrError::Unknown => RegError::UnknownRegister { id, mode },
            CsrError::ReadOnly => RegError::ReadOnly { id, mode },
        }
    }
}

impl RegisterFile for RiscvState {
    fn width(&self, mode: Mode, id: u32) -> Option<usize> {
        match Self::lookup(mode, id).ok()? {
            Slot::Fpr(_) => Some(8),
            _ => Some(mode.word_size()),
        }
    }

    fn read(&mut self, env: &mut AccessEnv<'_>, id: u32, cell: &mut ValueCell<'_>) -> Result<()> {
        let mode = env.mode();
        let slot = Self::lookup(mode, id)?;
        let width = self.width(mode, id).unwrap_or(8);
        let value = match slot {
            Slot::Gpr(n) => self.gpr[n] & xlen_mask(mode),
            Slot::Fpr(n) => self.fpr[n],
            Slot::Pc => self.pc & xlen_mask(mode),
            Slot::Csr(number) => self
                .csr
                .read(number, xlen(mode))
                .map_err(|err| Self::csr_error(err, id, mode))?,
        };
        put_scalar(cell.claim(id, width)?, value);
        Ok(())
    }

    fn write(&mut self, env: &mut AccessEnv<'_>, id: u32, value: ValueRef<'_>) -> Result<()> {
        let mode = env.mode();
        let slot = Self::lookup(mode, id)?;
        let width = self.width(mode, id).unwrap_or(8);
        let value = get_scalar(value.claim(id, width)?);
        match slot {
            Slot::Gpr(n) => self.gpr[n] = value & xlen_mask(mode),
            Slot::Fpr(n) => self.fpr[n] = value,
            Slot::Pc => {
                self.pc = value & xlen_mask(mode);
                env.mark_pc_dirty();
            }
            Slot::Csr(number) => {
                trace!(csr = number, value, "csr write");
                self.csr
                    .write(number, value, xlen(mode))
                    .map_err(|err| Self::csr_error(err, id, mode))?;
            }
        }
        Ok(())
    }

    fn reset(&mut self, mode: Mode) {
        *self = RiscvState {
            csr: CsrFile::new(xlen(mode)),
            ..RiscvState::default()
        };
    }

    fn pc(&self, _mode: Mode) -> u64 {
        self.pc
    }

    fn set_pc(&mut self, mode: Mode, pc: u64) {
        self.pc = pc & xlen_mask(mode);
    }
}
