//! # References
//! - MIPS32/MIPS64 Privileged Resource Architecture, CP0 register 12 (Status)

/// CP0 Status bits
pub mod status {
    /// Interrupt Enable
    pub const IE: u32 = 1 << 0;
    /// Exception Level
    pub const EXL: u32 = 1 << 1;
    /// Error Level
    pub const ERL: u32 = 1 << 2;
    pub const KSU_SHIFT: u32 = 3;
    /// Kernel/Supervisor/User mode field
    pub const KSU_MASK: u32 = 3 << KSU_SHIFT;
    /// 64-bit user segment addressing
    pub const UX: u32 = 1 << 5;
    /// 64-bit supervisor segment addressing
    pub const SX: u32 = 1 << 6;
    /// 64-bit kernel segment addressing
    pub const KX: u32 = 1 << 7;
    /// Floating point register mode
    pub const FR: u32 = 1 << 26;
    /// Coprocessor 0 usable from user mode
    pub const CU0: u32 = 1 << 28;
    /// Coprocessor 1 usable
    pub const CU1: u32 = 1 << 29;
}

/// KSU field values
pub mod ksu {
    pub const KERNEL: u32 = 0;
    pub const SUPERVISOR: u32 = 1;
    pub const USER: u32 = 2;
}
