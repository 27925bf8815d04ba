//! Control and status registers.
//!
//! Several CSRs are views of one another: `fflags` and `frm` are fields of
//! `fcsr`, `sstatus`/`ustatus` are masked windows onto `mstatus`, and the
//! supervisor/user interrupt enable and pending registers show the delegated
//! part of `mie`/`mip`. Each view reads and writes only its own bits of the
//! shared storage.
//!
//! # References
//! - RISC-V Privileged Architecture, 3.1.6 "Machine Status Registers"
//! - RISC-V Privileged Architecture, 4.1.3 "Supervisor Interrupt Registers"

use regmux_hw::riscv::{csr, fcsr, irq, misa, mstatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CsrError {
    /// No such CSR for this XLEN.
    Unknown,
    /// Exists, but software cannot write it.
    ReadOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Xlen {
    Rv32,
    Rv64,
}

impl Xlen {
    fn mask(self) -> u64 {
        match self {
            Xlen::Rv32 => u32::MAX as u64,
            Xlen::Rv64 => u64::MAX,
        }
    }

    fn sd_bit(self) -> u64 {
        match self {
            Xlen::Rv32 => mstatus::SD32,
            Xlen::Rv64 => mstatus::SD64,
        }
    }
}

/// CSRs that only exist on RV32, the upper halves of 64-bit counters.
fn rv32_only(number: u16) -> bool {
    matches!(
        number,
        csr::CYCLEH..=csr::HPMCOUNTER31H
            | csr::MCYCLEH..=csr::MHPMCOUNTER31H
            | csr::MSTATUSH
            | csr::HTIMEDELTAH
    )
}

fn read_only(number: u16) -> bool {
    matches!(
        number,
        csr::CYCLE..=csr::HPMCOUNTER31
            | csr::CYCLEH..=csr::HPMCOUNTER31H
            | csr::MVENDORID..=csr::MHARTID
            | csr::MISA
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrFile {
    pub mstatus: u64,
    pub misa: u64,
    pub mie: u64,
    pub mip: u64,
    pub mideleg: u64,
    pub mhartid: u64,
    /// Accrued exceptions in bits 0..5, rounding mode in bits 5..8.
    pub fcsr: u64,
    pub cycle: u64,
    pub instret: u64,
    pub time: u64,
    /// CSRs without side effects, by number.
    pub plain: BTreeMap<u16, u64>,
}

impl Default for CsrFile {
    fn default() -> Self {
        Self::new(Xlen::Rv64)
    }
}

impl CsrFile {
    pub fn new(xlen: Xlen) -> Self {
        let mxl = match xlen {
            Xlen::Rv32 => misa::MXL_32 << 30,
            Xlen::Rv64 => misa::MXL_64 << 62,
        };
        Self {
            mstatus: 0,
            misa: mxl | misa::I | misa::M | misa::A | misa::F | misa::D | misa::C | misa::S | misa::U,
            mie: 0,
            mip: 0,
            mideleg: 0,
            mhartid: 0,
            fcsr: 0,
            cycle: 0,
            instret: 0,
            time: 0,
            plain: BTreeMap::new(),
        }
    }

    fn status_with_sd(&self, xlen: Xlen) -> u64 {
        let dirty = self.mstatus & mstatus::FS == mstatus::FS || self.mstatus & mstatus::XS == mstatus::XS;
        if dirty {
            self.mstatus | xlen.sd_bit()
        } else {
            self.mstatus
        }
    }

    fn mark_fs_dirty(&mut self) {
        self.mstatus |= mstatus::FS;
    }

    pub(crate) fn exists(number: u16, xlen: Xlen) -> bool {
        !(xlen == Xlen::Rv64 && rv32_only(number))
    }

    pub(crate) fn read(&self, number: u16, xlen: Xlen) -> Result<u64, CsrError> {
        if !Self::exists(number, xlen) {
            return Err(CsrError::Unknown);
        }
        let value = match number {
            csr::FFLAGS => self.fcsr & fcsr::FFLAGS_MASK,
            csr::FRM => (self.fcsr >> fcsr::FRM_SHIFT) & fcsr::FRM_MASK,
            csr::FCSR => self.fcsr & 0xff,
            csr::MSTATUS => self.status_with_sd(xlen),
            csr::SSTATUS => {
                self.status_with_sd(xlen) & (mstatus::SSTATUS_MASK | xlen.sd_bit())
            }
            csr::USTATUS => self.mstatus & mstatus::USTATUS_MASK,
            csr::MISA => self.misa,
            csr::MIE => self.mie,
            csr::MIP => self.mip,
            csr::MIDELEG => self.mideleg,
            csr::SIE => self.mie & self.mideleg,
            csr::SIP => self.mip & self.mideleg,
            csr::UIE => self.mie & self.mideleg & irq::USER,
            csr::UIP => self.mip & self.mideleg & irq::USER,
            csr::MHARTID => self.mhartid,
            csr::MVENDORID | csr::MARCHID | csr::MIMPID => 0,
            csr::CYCLE | csr::MCYCLE => self.cycle,
            csr::INSTRET | csr::MINSTRET => self.instret,
            csr::TIME => self.time,
            csr::CYCLEH | csr::MCYCLEH => self.cycle >> 32,
            csr::INSTRETH | csr::MINSTRETH => self.instret >> 32,
            csr::TIMEH => self.time >> 32,
            csr::HPMCOUNTER3..=csr::HPMCOUNTER31 | csr::HPMCOUNTER3H..=csr::HPMCOUNTER31H => 0,
            other => self.plain.get(&other).copied().unwrap_or(0),
        };
        Ok(value & xlen.mask())
    }

    pub(crate) fn write(&mut self, number: u16, value: u64, xlen: Xlen) -> Result<(), CsrError> {
        if !Self::exists(number, xlen) {
            return Err(CsrError::Unknown);
        }
        if read_only(number) {
            return Err(CsrError::ReadOnly);
        }
        let value = value & xlen.mask();
        let low_half = |old: u64| match xlen {
            Xlen::Rv32 => (old & !0xffff_ffff) | value,
            Xlen::Rv64 => value,
        };
        let high_half = |old: u64| (old & 0xffff_ffff) | (value << 32);

        match number {
            csr::FFLAGS => {
                self.fcsr = (self.fcsr & !fcsr::FFLAGS_MASK) | (value & fcsr::FFLAGS_MASK);
                self.mark_fs_dirty();
            }
            csr::FRM => {
                let frm = (value & fcsr::FRM_MASK) << fcsr::FRM_SHIFT;
                self.fcsr = (self.fcsr & fcsr::FFLAGS_MASK) | frm;
                self.mark_fs_dirty();
            }
            csr::FCSR => {
                self.fcsr = value & 0xff;
                self.mark_fs_dirty();
            }
            csr::MSTATUS => self.write_status(value, mstatus::WRITABLE),
            csr::SSTATUS => self.write_status(value, mstatus::WRITABLE & mstatus::SSTATUS_MASK),
            csr::USTATUS => self.write_status(value, mstatus::USTATUS_MASK),
            csr::MIE => self.mie = value & irq::ALL,
            csr::SIE => self.mie = (self.mie & !self.mideleg) | (value & self.mideleg),
            csr::UIE => {
                let mask = self.mideleg & irq::USER;
                self.mie = (self.mie & !mask) | (value & mask);
            }
            csr::MIP => {
                let mask = irq::SUPERVISOR;
                self.mip = (self.mip & !mask) | (value & mask);
            }
            csr::SIP => {
                let mask = (irq::SSIP | irq::USIP) & self.mideleg;
                self.mip = (self.mip & !mask) | (value & mask);
            }
            csr::UIP => {
                let mask = irq::USIP & self.mideleg;
                self.mip = (self.mip & !mask) | (value & mask);
            }
            csr::MIDELEG => self.mideleg = value & irq::SUPERVISOR,
            csr::MCYCLE => self.cycle = low_half(self.cycle),
            csr::MINSTRET => self.instret = low_half(self.instret),
            csr::MCYCLEH => self.cycle = high_half(self.cycle),
            csr::MINSTRETH => self.instret = high_half(self.instret),
            other => {
                self.plain.insert(other, value);
            }
        }
        Ok(())
    }

    fn write_status(&mut self, value: u64, mask: u64) {
        self.mstatus = (self.mstatus & !mask) | (value & mask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_csrs_share_fcsr() {
        let mut csrs = CsrFile::new(Xlen::Rv64);
        csrs.write(csr::FCSR, 0xff, Xlen::Rv64).unwrap();
        csrs.write(csr::FRM, 0b010, Xlen::Rv64).unwrap();
        assert_eq!(csrs.read(csr::FFLAGS, Xlen::Rv64), Ok(0x1f));
        assert_eq!(csrs.read(csr::FCSR, Xlen::Rv64), Ok(0x5f));
        assert_eq!(csrs.mstatus & mstatus::FS, mstatus::FS);
        assert_ne!(csrs.read(csr::MSTATUS, Xlen::Rv64).unwrap() & mstatus::SD64, 0);
    }

    #[test]
    fn sstatus_is_a_window_on_mstatus() {
        let mut csrs = CsrFile::new(Xlen::Rv64);
        csrs.write(csr::MSTATUS, mstatus::MIE | mstatus::SIE, Xlen::Rv64)
            .unwrap();
        assert_eq!(csrs.read(csr::SSTATUS, Xlen::Rv64), Ok(mstatus::SIE));
        csrs.write(csr::SSTATUS, 0, Xlen::Rv64).unwrap();
        assert_eq!(csrs.read(csr::MSTATUS, Xlen::Rv64), Ok(mstatus::MIE));
    }

    #[test]
    fn sie_shows_only_delegated_bits() {
        let mut csrs = CsrFile::new(Xlen::Rv64);
        csrs.write(csr::MIE, irq::ALL, Xlen::Rv64).unwrap();
        assert_eq!(csrs.read(csr::SIE, Xlen::Rv64), Ok(0));
        csrs.write(csr::MIDELEG, irq::STIP, Xlen::Rv64).unwrap();
        assert_eq!(csrs.read(csr::SIE, Xlen::Rv64), Ok(irq::STIP));
        csrs.write(csr::SIE, 0, Xlen::Rv64).unwrap();
        assert_eq!(csrs.read(csr::MIE, Xlen::Rv64), Ok(irq::ALL & !irq::STIP));
    }

    #[test]
    fn counters_and_information_registers() {
        let mut csrs = CsrFile::new(Xlen::Rv32);
        assert_eq!(csrs.write(csr::CYCLE, 1, Xlen::Rv32), Err(CsrError::ReadOnly));
        assert_eq!(csrs.write(csr::MHARTID, 1, Xlen::Rv32), Err(CsrError::ReadOnly));
        csrs.write(csr::MCYCLE, 0x1234, Xlen::Rv32).unwrap();
        csrs.write(csr::MCYCLEH, 0x1, Xlen::Rv32).unwrap();
        assert_eq!(csrs.cycle, 0x1_0000_1234);
        assert_eq!(csrs.read(csr::CYCLEH, Xlen::Rv32), Ok(1));
        assert_eq!(csrs.read(csr::CYCLEH, Xlen::Rv64), Err(CsrError::Unknown));
    }
}
