//! x87 and SSE state.
//!
//! The x87 register stack is stored by physical slot. ST(i) is slot
//! `(top + i) & 7`, and the tag word is not stored at all: only an empty bit
//! per slot is kept, the remaining tag classes are derived from the slot
//! contents whenever FPTAG is read.
//!
//! # References
//! - SDM Vol. 1, 8.1 "x87 FPU Execution Environment"
//! - SDM Vol. 1, 10.2.3 "MXCSR Control and Status Register"

use crate::value::Fp80;
use regmux_hw::x86::{fpu, mxcsr};
use serde::{Deserialize, Serialize};

/// Rounding control shared by the x87 control word and MXCSR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundingMode {
    #[default]
    Nearest,
    Down,
    Up,
    TowardZero,
}

impl RoundingMode {
    fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => RoundingMode::Nearest,
            1 => RoundingMode::Down,
            2 => RoundingMode::Up,
            _ => RoundingMode::TowardZero,
        }
    }
}

/// x87 precision control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    #[default]
    Single,
    Double,
    Extended,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpuState {
    /// Physical register slots.
    pub regs: [Fp80; 8],
    /// Empty bit per physical slot.
    pub empty: [bool; 8],
    /// Top-of-stack index.
    pub top: u8,
    /// Status word with the TOP field cleared; TOP lives in `top`.
    pub status: u16,
    pub control: u16,
    /// Derived from `control`.
    pub rounding: RoundingMode,
    /// Derived from `control`.
    pub precision: Precision,
    pub fip: u64,
    pub fcs: u16,
    pub fdp: u64,
    pub fds: u16,
    pub fop: u16,
}

impl FpuState {
    pub fn physical_slot(&self, st: usize) -> usize {
        (self.top as usize + st) & 7
    }

    pub fn st(&self, st: usize) -> Fp80 {
        self.regs[self.physical_slot(st)]
    }

    pub fn set_st(&mut self, st: usize, value: Fp80) {
        let slot = self.physical_slot(st);
        self.regs[slot] = value;
    }

    pub fn status_word(&self) -> u16 {
        (self.status & !fpu::STATUS_TOP_MASK) | (((self.top & 7) as u16) << fpu::STATUS_TOP_SHIFT)
    }

    pub fn set_status_word(&mut self, value: u16) {
        self.status = value & !fpu::STATUS_TOP_MASK;
        self.top = ((value >> fpu::STATUS_TOP_SHIFT) & 7) as u8;
    }

    /// Load the control word and re-derive rounding and precision.
    pub fn set_control_word(&mut self, value: u16) {
        self.control = value;
        self.rounding = RoundingMode::from_bits((value >> fpu::CONTROL_RC_SHIFT) as u32);
        self.precision = match (value >> fpu::CONTROL_PC_SHIFT) & 3 {
            0 | 1 => Precision::Single,
            2 => Precision::Double,
            _ => Precision::Extended,
        };
    }

    /// Two-bit tag of a physical slot.
    pub fn tag(&self, slot: usize) -> u16 {
        if self.empty[slot] {
            return fpu::tag::EMPTY;
        }
        let reg = self.regs[slot];
        let exponent = reg.exponent();
        if exponent == 0 && reg.mantissa == 0 {
            fpu::tag::ZERO
        } else if exponent == 0 || exponent == fpu::EXPONENT_MAX || reg.mantissa >> 63 == 0 {
            // denormal, infinity, NaN or unnormal
            fpu::tag::SPECIAL
        } else {
            fpu::tag::VALID
        }
    }

    /// Full tag word, slot 0 in the low bits.
    pub fn tag_word(&self) -> u16 {
        (0..8)
            .rev()
            .fold(0u16, |word, slot| (word << 2) | self.tag(slot))
    }

    /// Only the empty state survives a tag word write; the other classes
    /// are always re-derived from the register contents.
    pub fn set_tag_word(&mut self, value: u16) {
        for (slot, empty) in self.empty.iter_mut().enumerate() {
            *empty = (value >> (2 * slot)) & 3 == fpu::tag::EMPTY;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SseState {
    pub mxcsr: u32,
    /// Low 128 bits of each vector register.
    pub xmm: [[u64; 2]; 16],
    /// Bits 128..256 of YMM0-15. Kept so that values round-trip; nothing
    /// executes AVX, so they never influence guest state.
    pub ymmh: [[u64; 2]; 16],
    /// Derived from `mxcsr`.
    pub rounding: RoundingMode,
    pub flush_to_zero: bool,
    pub denormals_are_zero: bool,
}

impl SseState {
    /// Load MXCSR and re-derive the SSE float status.
    pub fn set_mxcsr(&mut self, value: u32) {
        self.mxcsr = value;
        self.rounding = RoundingMode::from_bits(value >> mxcsr::RC_SHIFT);
        self.flush_to_zero = value & mxcsr::FTZ != 0;
        self.denormals_are_zero = value & mxcsr::DAZ != 0;
    }

    pub fn ymm(&self, index: usize) -> [u64; 4] {
        let lo = self.xmm[index];
        let hi = self.ymmh[index];
        [lo[0], lo[1], hi[0], hi[1]]
    }

    pub fn set_ymm(&mut self, index: usize, value: [u64; 4]) {
        self.xmm[index] = [value[0], value[1]];
        self.ymmh[index] = [value[2], value[3]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_classification() {
        let mut fpu = FpuState::default();
        fpu.regs[0] = Fp80::new(0, 0);
        fpu.regs[1] = Fp80::new(0x8000_0000_0000_0000, 0x7fff);
        fpu.regs[2] = Fp80::new(0x8000_0000_0000_0000, 0xffff);
        fpu.regs[3] = Fp80::new(1, 0);
        fpu.regs[4] = Fp80::new(0x4000_0000_0000_0000, 0x3fff);
        fpu.regs[5] = Fp80::new(0x8000_0000_0000_0000, 0x3fff);
        fpu.regs[6] = Fp80::new(0xc000_0000_0000_0000, 0xc000);
        fpu.empty[7] = true;

        assert_eq!(fpu.tag(0), fpu::tag::ZERO);
        assert_eq!(fpu.tag(1), fpu::tag::SPECIAL);
        // sign bit does not hide the maximum exponent
        assert_eq!(fpu.tag(2), fpu::tag::SPECIAL);
        assert_eq!(fpu.tag(3), fpu::tag::SPECIAL);
        assert_eq!(fpu.tag(4), fpu::tag::SPECIAL);
        assert_eq!(fpu.tag(5), fpu::tag::VALID);
        assert_eq!(fpu.tag(6), fpu::tag::VALID);
        assert_eq!(fpu.tag(7), fpu::tag::EMPTY);
        assert_eq!(fpu.tag_word(), 0b11_00_00_10_10_10_10_01);
    }

    #[test]
    fn tag_word_write_keeps_only_empty_bits() {
        let mut fpu = FpuState::default();
        fpu.regs[1] = Fp80::new(0x8000_0000_0000_0000, 0x3fff);
        fpu.set_tag_word(0xfff3);
        assert!(fpu.empty[0]);
        assert!(!fpu.empty[1]);
        assert!(fpu.empty[2..].iter().all(|&e| e));
        // slot 1 held a normal number, its tag is recomputed rather than stored
        assert_eq!(fpu.tag_word(), 0xfff3);
    }

    #[test]
    fn status_word_carries_top() {
        let mut fpu = FpuState::default();
        fpu.set_status_word(0x3800 | 0x0041);
        assert_eq!(fpu.top, 7);
        assert_eq!(fpu.status, 0x0041);
        assert_eq!(fpu.status_word(), 0x3841);
        assert_eq!(fpu.physical_slot(1), 0);
    }

    #[test]
    fn control_word_derives_rounding() {
        let mut fpu = FpuState::default();
        fpu.set_control_word(0x0f7f);
        assert_eq!(fpu.rounding, RoundingMode::TowardZero);
        assert_eq!(fpu.precision, Precision::Extended);
    }
}
