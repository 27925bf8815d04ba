//! # References
//! - z/Architecture Principles of Operation, 4-3 "Program-Status Word"

/// PSW mask fields
pub mod psw {
    /// Condition code field
    pub const MASK_CC: u64 = 0x0000_3000_0000_0000;
    pub const SHIFT_CC: u32 = 44;
    /// Problem state
    pub const MASK_PSTATE: u64 = 0x0001_0000_0000_0000;
    /// Extended addressing mode (64-bit)
    pub const MASK_64: u64 = 0x0000_0001_0000_0000;
    /// Basic addressing mode (31-bit)
    pub const MASK_32: u64 = 0x0000_0000_8000_0000;
}
