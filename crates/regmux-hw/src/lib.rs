//! Architectural constants shared by the register access layer.
//!
//! Nothing in here has behaviour; these are the bit positions, masks and
//! register numbers published in the respective architecture manuals.

pub mod mips;
pub mod rh850;
pub mod riscv;
pub mod s390x;
pub mod sparc;
pub mod x86;
