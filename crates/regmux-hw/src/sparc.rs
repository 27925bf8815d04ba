//! # References
//! - The SPARC Architecture Manual, Version 8, 4.1 "Register Windows"

/// Number of register windows implemented
pub const NWINDOWS: usize = 8;

/// Registers in each of the out/local/in groups
pub const WINDOW_GROUP: usize = 8;

/// Registers owned by one window (its outs and locals; the ins belong to the next window)
pub const WINDOW_STRIDE: usize = 2 * WINDOW_GROUP;

/// Size of the instruction word, the distance between PC and nPC
pub const INSN_SIZE: u32 = 4;
