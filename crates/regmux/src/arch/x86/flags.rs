//! Lazily evaluated EFLAGS.
//!
//! The execution engine does not keep the arithmetic status flags up to date;
//! it records the last flag-producing operation and leaves the bits to be
//! derived on demand. Reading FLAGS/EFLAGS/RFLAGS through the register API
//! materialises them, writing them decodes the value back into this form.

use regmux_hw::x86::eflags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperandSize {
    Byte,
    Word,
    Dword,
    Qword,
}

impl OperandSize {
    fn mask(self) -> u64 {
        match self {
            OperandSize::Byte => 0xff,
            OperandSize::Word => 0xffff,
            OperandSize::Dword => 0xffff_ffff,
            OperandSize::Qword => u64::MAX,
        }
    }

    fn sign_bit(self) -> u64 {
        (self.mask() >> 1) + 1
    }
}

/// Last flag-producing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LazyFlags {
    /// Status bits are already known.
    Materialized(u64),
    Add {
        lhs: u64,
        rhs: u64,
        result: u64,
        size: OperandSize,
    },
    Sub {
        lhs: u64,
        rhs: u64,
        result: u64,
        size: OperandSize,
    },
    Logic {
        result: u64,
        size: OperandSize,
    },
}

impl Default for LazyFlags {
    fn default() -> Self {
        LazyFlags::Materialized(0)
    }
}

fn parity_even(byte: u8) -> bool {
    byte.count_ones() % 2 == 0
}

fn result_flags(result: u64, size: OperandSize) -> u64 {
    let res = result & size.mask();
    let mut flags = 0;
    if res == 0 {
        flags |= eflags::ZF;
    }
    if res & size.sign_bit() != 0 {
        flags |= eflags::SF;
    }
    if parity_even(res as u8) {
        flags |= eflags::PF;
    }
    flags
}

impl LazyFlags {
    /// Status bits (CF, PF, AF, ZF, SF, OF) this operation produced.
    pub fn status(&self) -> u64 {
        match *self {
            LazyFlags::Materialized(bits) => bits & eflags::STATUS_MASK,
            LazyFlags::Logic { result, size } => result_flags(result, size),
            LazyFlags::Add {
                lhs,
                rhs,
                result,
                size,
            } => {
                let mask = size.mask();
                let (lhs, rhs, res) = (lhs & mask, rhs & mask, result & mask);
                let mut flags = result_flags(res, size);
                if lhs as u128 + rhs as u128 > mask as u128 {
                    flags |= eflags::CF;
                }
                if (lhs ^ rhs ^ res) & 0x10 != 0 {
                    flags |= eflags::AF;
                }
                if (!(lhs ^ rhs) & (lhs ^ res)) & size.sign_bit() != 0 {
                    flags |= eflags::OF;
                }
                flags
            }
            LazyFlags::Sub {
                lhs,
                rhs,
                result,
                size,
            } => {
                let mask = size.mask();
                let (lhs, rhs, res) = (lhs & mask, rhs & mask, result & mask);
                let mut flags = result_flags(res, size);
                if lhs < rhs {
                    flags |= eflags::CF;
                }
                if (lhs ^ rhs ^ res) & 0x10 != 0 {
                    flags |= eflags::AF;
                }
                if ((lhs ^ rhs) & (lhs ^ res)) & size.sign_bit() != 0 {
                    flags |= eflags::OF;
                }
                flags
            }
        }
    }
}

/// EFLAGS split the way the engine keeps it: control/system bits stored
/// directly, status bits behind [`LazyFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlagsState {
    /// Everything except the status bits.
    pub control: u64,
    pub lazy: LazyFlags,
}

impl FlagsState {
    /// Materialise the architectural value.
    pub fn compute(&self) -> u64 {
        (self.control & !eflags::STATUS_MASK) | self.lazy.status() | eflags::FIXED
    }

    /// Decode an architectural value. Undefined bits are dropped and bit 1
    /// reads back as set, so a write is not always read back verbatim.
    pub fn load(&mut self, value: u64) {
        let value = value & eflags::DEFINED_MASK;
        self.lazy = LazyFlags::Materialized(value & eflags::STATUS_MASK);
        self.control = (value & !eflags::STATUS_MASK) | eflags::FIXED;
    }

    /// Replace only the bits in `mask`, keeping the rest of the current value.
    pub fn load_masked(&mut self, value: u64, mask: u64) {
        let merged = (self.compute() & !mask) | (value & mask);
        self.load(merged);
    }

    /// Engine hook: record the flag-producing operation just executed.
    pub fn record(&mut self, op: LazyFlags) {
        self.lazy = op;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_overflow_and_carry() {
        let op = LazyFlags::Add {
            lhs: 0x7f,
            rhs: 1,
            result: 0x80,
            size: OperandSize::Byte,
        };
        let status = op.status();
        assert_ne!(status & eflags::OF, 0);
        assert_ne!(status & eflags::SF, 0);
        assert_ne!(status & eflags::AF, 0);
        assert_eq!(status & eflags::CF, 0);

        let op = LazyFlags::Add {
            lhs: 0xffff_ffff,
            rhs: 1,
            result: 0,
            size: OperandSize::Dword,
        };
        let status = op.status();
        assert_ne!(status & eflags::CF, 0);
        assert_ne!(status & eflags::ZF, 0);
        assert_ne!(status & eflags::PF, 0);
    }

    #[test]
    fn sub_borrow() {
        let op = LazyFlags::Sub {
            lhs: 1,
            rhs: 2,
            result: u64::MAX,
            size: OperandSize::Qword,
        };
        let status = op.status();
        assert_ne!(status & eflags::CF, 0);
        assert_ne!(status & eflags::SF, 0);
        assert_eq!(status & eflags::OF, 0);
    }

    #[test]
    fn compute_materialises_pending_operation() {
        let mut flags = FlagsState::default();
        flags.load(eflags::IF | eflags::CF);
        flags.record(LazyFlags::Logic {
            result: 0,
            size: OperandSize::Dword,
        });
        let value = flags.compute();
        assert_eq!(value & eflags::CF, 0);
        assert_ne!(value & eflags::ZF, 0);
        assert_ne!(value & eflags::IF, 0);
        assert_ne!(value & eflags::FIXED, 0);
    }

    #[test]
    fn load_drops_undefined_bits() {
        let mut flags = FlagsState::default();
        flags.load(u64::MAX);
        assert_eq!(flags.compute(), eflags::DEFINED_MASK);
    }

    #[test]
    fn masked_load_keeps_upper_bits() {
        let mut flags = FlagsState::default();
        flags.load(eflags::ID | eflags::AC);
        flags.load_masked(eflags::CF | eflags::DF, 0xffff);
        let value = flags.compute();
        assert_eq!(
            value,
            eflags::ID | eflags::AC | eflags::CF | eflags::DF | eflags::FIXED
        );
    }
}
