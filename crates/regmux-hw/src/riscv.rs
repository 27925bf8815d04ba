//! # References
//! - The RISC-V Instruction Set Manual, Volume II: Privileged Architecture, 2.2 "CSR Listing"

/// CSR numbers
pub mod csr {
    // User trap setup
    pub const USTATUS: u16 = 0x000;
    pub const UIE: u16 = 0x004;
    pub const UTVEC: u16 = 0x005;
    // User trap handling
    pub const USCRATCH: u16 = 0x040;
    pub const UEPC: u16 = 0x041;
    pub const UCAUSE: u16 = 0x042;
    pub const UTVAL: u16 = 0x043;
    pub const UIP: u16 = 0x044;

    // User floating point
    pub const FFLAGS: u16 = 0x001;
    pub const FRM: u16 = 0x002;
    pub const FCSR: u16 = 0x003;

    // User counters
    pub const CYCLE: u16 = 0xc00;
    pub const TIME: u16 = 0xc01;
    pub const INSTRET: u16 = 0xc02;
    pub const HPMCOUNTER3: u16 = 0xc03;
    pub const HPMCOUNTER31: u16 = 0xc1f;
    pub const CYCLEH: u16 = 0xc80;
    pub const TIMEH: u16 = 0xc81;
    pub const INSTRETH: u16 = 0xc82;
    pub const HPMCOUNTER3H: u16 = 0xc83;
    pub const HPMCOUNTER31H: u16 = 0xc9f;

    // Supervisor
    pub const SSTATUS: u16 = 0x100;
    pub const SEDELEG: u16 = 0x102;
    pub const SIDELEG: u16 = 0x103;
    pub const SIE: u16 = 0x104;
    pub const STVEC: u16 = 0x105;
    pub const SCOUNTEREN: u16 = 0x106;
    pub const SSCRATCH: u16 = 0x140;
    pub const SEPC: u16 = 0x141;
    pub const SCAUSE: u16 = 0x142;
    pub const STVAL: u16 = 0x143;
    pub const SIP: u16 = 0x144;
    pub const SATP: u16 = 0x180;

    // Machine information
    pub const MVENDORID: u16 = 0xf11;
    pub const MARCHID: u16 = 0xf12;
    pub const MIMPID: u16 = 0xf13;
    pub const MHARTID: u16 = 0xf14;

    // Machine trap setup
    pub const MSTATUS: u16 = 0x300;
    pub const MISA: u16 = 0x301;
    pub const MEDELEG: u16 = 0x302;
    pub const MIDELEG: u16 = 0x303;
    pub const MIE: u16 = 0x304;
    pub const MTVEC: u16 = 0x305;
    pub const MCOUNTEREN: u16 = 0x306;
    pub const MSTATUSH: u16 = 0x310;
    pub const MCOUNTINHIBIT: u16 = 0x320;
    pub const MHPMEVENT3: u16 = 0x323;
    pub const MHPMEVENT31: u16 = 0x33f;

    // Machine trap handling
    pub const MSCRATCH: u16 = 0x340;
    pub const MEPC: u16 = 0x341;
    pub const MCAUSE: u16 = 0x342;
    pub const MTVAL: u16 = 0x343;
    pub const MIP: u16 = 0x344;

    // Machine memory protection
    pub const PMPCFG0: u16 = 0x3a0;
    pub const PMPCFG3: u16 = 0x3a3;
    pub const PMPADDR0: u16 = 0x3b0;
    pub const PMPADDR15: u16 = 0x3bf;

    // Machine counters
    pub const MCYCLE: u16 = 0xb00;
    pub const MINSTRET: u16 = 0xb02;
    pub const MHPMCOUNTER3: u16 = 0xb03;
    pub const MHPMCOUNTER31: u16 = 0xb1f;
    pub const MCYCLEH: u16 = 0xb80;
    pub const MINSTRETH: u16 = 0xb82;
    pub const MHPMCOUNTER3H: u16 = 0xb83;
    pub const MHPMCOUNTER31H: u16 = 0xb9f;

    // Hypervisor
    pub const HSTATUS: u16 = 0x600;
    pub const HEDELEG: u16 = 0x602;
    pub const HIDELEG: u16 = 0x603;
    pub const HIE: u16 = 0x604;
    pub const HCOUNTEREN: u16 = 0x606;
    pub const HTVAL: u16 = 0x643;
    pub const HIP: u16 = 0x644;
    pub const HTINST: u16 = 0x64a;
    pub const HGATP: u16 = 0x680;
    pub const HTIMEDELTA: u16 = 0x605;
    pub const HTIMEDELTAH: u16 = 0x615;

    // Names retired after privileged ISA 1.9
    pub const MUCOUNTEREN: u16 = 0x320;
    pub const MSCOUNTEREN: u16 = 0x321;
    pub const MHCOUNTEREN: u16 = 0x322;
    pub const MBADADDR: u16 = MTVAL;
    pub const SBADADDR: u16 = STVAL;
    pub const SPTBR: u16 = SATP;
}

/// mstatus fields
pub mod mstatus {
    pub const UIE: u64 = 1 << 0;
    pub const SIE: u64 = 1 << 1;
    pub const MIE: u64 = 1 << 3;
    pub const UPIE: u64 = 1 << 4;
    pub const SPIE: u64 = 1 << 5;
    pub const MPIE: u64 = 1 << 7;
    pub const SPP: u64 = 1 << 8;
    pub const MPP: u64 = 3 << 11;
    pub const FS: u64 = 3 << 13;
    pub const XS: u64 = 3 << 15;
    pub const MPRV: u64 = 1 << 17;
    pub const SUM: u64 = 1 << 18;
    pub const MXR: u64 = 1 << 19;
    pub const TVM: u64 = 1 << 20;
    pub const TW: u64 = 1 << 21;
    pub const TSR: u64 = 1 << 22;
    /// Summary dirty bit, top bit of the register
    pub const SD32: u64 = 1 << 31;
    pub const SD64: u64 = 1 << 63;

    /// Bits software may change through mstatus
    pub const WRITABLE: u64 = UIE
        | SIE
        | MIE
        | UPIE
        | SPIE
        | MPIE
        | SPP
        | MPP
        | FS
        | MPRV
        | SUM
        | MXR
        | TVM
        | TW
        | TSR;

    /// Bits visible through sstatus
    pub const SSTATUS_MASK: u64 = UIE | SIE | UPIE | SPIE | SPP | FS | XS | SUM | MXR;

    /// Bits visible through ustatus
    pub const USTATUS_MASK: u64 = UIE | UPIE;
}

/// Interrupt pending/enable bits
pub mod irq {
    pub const USIP: u64 = 1 << 0;
    pub const SSIP: u64 = 1 << 1;
    pub const MSIP: u64 = 1 << 3;
    pub const UTIP: u64 = 1 << 4;
    pub const STIP: u64 = 1 << 5;
    pub const MTIP: u64 = 1 << 7;
    pub const UEIP: u64 = 1 << 8;
    pub const SEIP: u64 = 1 << 9;
    pub const MEIP: u64 = 1 << 11;

    /// Interrupts that exist at user level
    pub const USER: u64 = USIP | UTIP | UEIP;
    /// Interrupts that exist at supervisor level and below
    pub const SUPERVISOR: u64 = SSIP | STIP | SEIP | USER;
    pub const ALL: u64 = SUPERVISOR | MSIP | MTIP | MEIP;
}

/// Floating point control and status fields
pub mod fcsr {
    pub const FFLAGS_MASK: u64 = 0x1f;
    pub const FRM_SHIFT: u32 = 5;
    pub const FRM_MASK: u64 = 0x7;
}

/// misa extension bits
pub mod misa {
    pub const A: u64 = 1 << 0;
    pub const C: u64 = 1 << 2;
    pub const D: u64 = 1 << 3;
    pub const F: u64 = 1 << 5;
    pub const I: u64 = 1 << 8;
    pub const M: u64 = 1 << 12;
    pub const S: u64 = 1 << 18;
    pub const U: u64 = 1 << 20;
    /// MXL encoding for a 32-bit hart, placed in the top two bits
    pub const MXL_32: u64 = 1;
    /// MXL encoding for a 64-bit hart
    pub const MXL_64: u64 = 2;
}
