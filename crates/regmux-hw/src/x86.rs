//! # References
//! - Intel 64 and IA-32 Architectures Software Developer's Manual, Vol. 3A
//! - AMD64 Architecture Programmer's Manual, Vol. 2

/// CR0 bits
///
/// Reference: SDM Vol. 3A, 2.5 "Control Registers"
pub mod cr0 {
    /// Protection Enable
    pub const PE: u64 = 1 << 0;
    /// Monitor Coprocessor
    pub const MP: u64 = 1 << 1;
    /// x87 Emulation
    pub const EM: u64 = 1 << 2;
    /// Task Switched
    pub const TS: u64 = 1 << 3;
    /// Extension Type, hardwired to 1 on anything newer than a 386
    pub const ET: u64 = 1 << 4;
    /// Numeric Error
    pub const NE: u64 = 1 << 5;
    /// Write Protect
    pub const WP: u64 = 1 << 16;
    /// Alignment Mask
    pub const AM: u64 = 1 << 18;
    /// Not Write-through
    pub const NW: u64 = 1 << 29;
    /// Cache Disable
    pub const CD: u64 = 1 << 30;
    /// Paging
    pub const PG: u64 = 1 << 31;
}

/// CR4 bits
pub mod cr4 {
    pub const VME: u64 = 1 << 0;
    pub const PVI: u64 = 1 << 1;
    pub const TSD: u64 = 1 << 2;
    pub const DE: u64 = 1 << 3;
    pub const PSE: u64 = 1 << 4;
    pub const PAE: u64 = 1 << 5;
    pub const MCE: u64 = 1 << 6;
    pub const PGE: u64 = 1 << 7;
    pub const PCE: u64 = 1 << 8;
    /// OS support for FXSAVE/FXRSTOR
    pub const OSFXSR: u64 = 1 << 9;
    pub const OSXMMEXCPT: u64 = 1 << 10;
    pub const LA57: u64 = 1 << 12;
    pub const FSGSBASE: u64 = 1 << 16;
    pub const PCIDE: u64 = 1 << 17;
    pub const OSXSAVE: u64 = 1 << 18;
    pub const SMEP: u64 = 1 << 20;
    pub const SMAP: u64 = 1 << 21;
}

/// IA32_EFER bits
///
/// Reference: SDM Vol. 3A, 2.2.1 "Extended Feature Enable Register"
pub mod efer {
    /// SYSCALL enable
    pub const SCE: u64 = 1 << 0;
    /// Long Mode Enable
    pub const LME: u64 = 1 << 8;
    /// Long Mode Active
    pub const LMA: u64 = 1 << 10;
    /// No-Execute Enable
    pub const NXE: u64 = 1 << 11;
    pub const SVME: u64 = 1 << 12;
    pub const FFXSR: u64 = 1 << 14;
}

/// EFLAGS bits
pub mod eflags {
    pub const CF: u64 = 1 << 0;
    /// Reserved, always reads as 1
    pub const FIXED: u64 = 1 << 1;
    pub const PF: u64 = 1 << 2;
    pub const AF: u64 = 1 << 4;
    pub const ZF: u64 = 1 << 6;
    pub const SF: u64 = 1 << 7;
    pub const TF: u64 = 1 << 8;
    pub const IF: u64 = 1 << 9;
    pub const DF: u64 = 1 << 10;
    pub const OF: u64 = 1 << 11;
    pub const IOPL: u64 = 3 << 12;
    pub const NT: u64 = 1 << 14;
    pub const RF: u64 = 1 << 16;
    pub const VM: u64 = 1 << 17;
    pub const AC: u64 = 1 << 18;
    pub const VIF: u64 = 1 << 19;
    pub const VIP: u64 = 1 << 20;
    pub const ID: u64 = 1 << 21;

    /// Arithmetic status flags, the ones produced lazily by ALU operations
    pub const STATUS_MASK: u64 = CF | PF | AF | ZF | SF | OF;

    /// Every bit that has a defined meaning
    pub const DEFINED_MASK: u64 =
        STATUS_MASK | FIXED | TF | IF | DF | IOPL | NT | RF | VM | AC | VIF | VIP | ID;
}

/// Segment descriptor flag bits, in the layout of the descriptor's high dword
///
/// Reference: SDM Vol. 3A, 3.4.5 "Segment Descriptors"
pub mod desc {
    /// Accessed
    pub const A: u32 = 1 << 8;
    /// Writable (data) or readable (code)
    pub const W: u32 = 1 << 9;
    /// Readable, for code segments
    pub const R: u32 = 1 << 9;
    /// Conforming, for code segments
    pub const C: u32 = 1 << 10;
    /// Executable (code segment)
    pub const CS: u32 = 1 << 11;
    /// Code or data, as opposed to a system descriptor
    pub const S: u32 = 1 << 12;
    pub const DPL_SHIFT: u32 = 13;
    pub const DPL_MASK: u32 = 3 << DPL_SHIFT;
    /// Present
    pub const P: u32 = 1 << 15;
    /// 64-bit code segment
    pub const L: u32 = 1 << 21;
    /// Default operation size / big
    pub const B: u32 = 1 << 22;
    /// Granularity
    pub const G: u32 = 1 << 23;

    /// Flags of a data segment loaded in real or virtual-8086 mode
    pub const REAL_MODE_DATA: u32 = P | S | W | A;
    /// Flags of the code segment established at reset
    pub const REAL_MODE_CODE: u32 = P | S | CS | R | A;
}

/// Selector fields
pub mod selector {
    /// Requested privilege level
    pub const RPL_MASK: u16 = 3;
    /// Table indicator, set for LDT
    pub const TI: u16 = 1 << 2;
    /// Everything above the RPL and TI bits
    pub const INDEX_MASK: u16 = !7;
}

/// Model-specific register indices
///
/// Reference: SDM Vol. 4 "Model-Specific Registers"
pub mod msr {
    pub const TSC: u32 = 0x10;
    pub const APIC_BASE: u32 = 0x1b;
    pub const FEATURE_CONTROL: u32 = 0x3a;
    pub const TSC_ADJUST: u32 = 0x3b;
    pub const SYSENTER_CS: u32 = 0x174;
    pub const SYSENTER_ESP: u32 = 0x175;
    pub const SYSENTER_EIP: u32 = 0x176;
    pub const MCG_STATUS: u32 = 0x17a;
    pub const MISC_ENABLE: u32 = 0x1a0;
    pub const PAT: u32 = 0x277;
    pub const TSC_DEADLINE: u32 = 0x6e0;

    /// IA32_PMCx, general-purpose performance counters
    pub const PERF_GP_COUNTER0: u32 = 0xc1;
    /// IA32_PERFEVTSELx
    pub const PERF_EVENT_SELECT0: u32 = 0x186;
    /// IA32_FIXED_CTRx
    pub const PERF_FIXED_COUNTER0: u32 = 0x309;
    pub const PERF_FIXED_COUNTER_CTRL: u32 = 0x38d;
    pub const PERF_GLOBAL_STATUS: u32 = 0x38e;
    pub const PERF_GLOBAL_CTRL: u32 = 0x38f;
    pub const PERF_GLOBAL_OVF_CTRL: u32 = 0x390;
    /// Number of general-purpose counters modelled
    pub const PERF_GP_COUNTERS: usize = 8;
    /// Number of fixed counters modelled
    pub const PERF_FIXED_COUNTERS: usize = 3;

    pub const EFER: u32 = 0xc000_0080;
    pub const STAR: u32 = 0xc000_0081;
    pub const LSTAR: u32 = 0xc000_0082;
    pub const CSTAR: u32 = 0xc000_0083;
    pub const FMASK: u32 = 0xc000_0084;
    pub const FS_BASE: u32 = 0xc000_0100;
    pub const GS_BASE: u32 = 0xc000_0101;
    pub const KERNEL_GS_BASE: u32 = 0xc000_0102;
    pub const TSC_AUX: u32 = 0xc000_0103;
}

/// CPUID feature bits
pub mod cpuid {
    /// CPUID.80000001H:EDX, Intel 64 architecture available
    pub const EXT2_LM: u32 = 1 << 29;
    /// CPUID.80000001H:EDX, SYSCALL/SYSRET
    pub const EXT2_SYSCALL: u32 = 1 << 11;
}

/// x87 FPU status and control word fields
pub mod fpu {
    /// Top-of-stack field in the status word
    pub const STATUS_TOP_MASK: u16 = 0x3800;
    pub const STATUS_TOP_SHIFT: u16 = 11;
    /// Precision control in the control word
    pub const CONTROL_PC_SHIFT: u16 = 8;
    /// Rounding control in the control word
    pub const CONTROL_RC_SHIFT: u16 = 10;
    /// Control word after FNINIT
    pub const CONTROL_DEFAULT: u16 = 0x037f;
    /// Largest biased exponent of the 80-bit format
    pub const EXPONENT_MAX: u16 = 0x7fff;

    /// Two-bit tag values as they appear in the tag word
    pub mod tag {
        pub const VALID: u16 = 0;
        pub const ZERO: u16 = 1;
        pub const SPECIAL: u16 = 2;
        pub const EMPTY: u16 = 3;
    }
}

/// MXCSR fields
pub mod mxcsr {
    pub const DAZ: u32 = 1 << 6;
    pub const RC_SHIFT: u32 = 13;
    pub const FTZ: u32 = 1 << 15;
    /// Value after reset
    pub const DEFAULT: u32 = 0x1f80;
}
