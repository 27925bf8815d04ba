//! # References
//! - RH850G3K User's Manual: Software, 3.2 "System Registers"

/// System register banks, selected by SELID
pub const SYSREG_BANKS: usize = 8;

/// Registers per system register bank
pub const BANK_SIZE: usize = 32;

/// General purpose registers
pub const GPRS: usize = 32;

/// (selection ID, register number) of the documented system registers
pub mod sysreg {
    pub type Loc = (usize, usize);

    // SELID 0: basic system registers
    pub const EIPC: Loc = (0, 0);
    pub const EIPSW: Loc = (0, 1);
    pub const FEPC: Loc = (0, 2);
    pub const FEPSW: Loc = (0, 3);
    pub const PSW: Loc = (0, 5);
    pub const FPSR: Loc = (0, 6);
    pub const FPEPC: Loc = (0, 7);
    pub const FPST: Loc = (0, 8);
    pub const FPCC: Loc = (0, 9);
    pub const FPCFG: Loc = (0, 10);
    pub const FPEC: Loc = (0, 11);
    pub const EIIC: Loc = (0, 13);
    pub const FEIC: Loc = (0, 14);
    pub const CTPC: Loc = (0, 16);
    pub const CTPSW: Loc = (0, 17);
    pub const CTBP: Loc = (0, 20);
    pub const EIWR: Loc = (0, 28);
    pub const FEWR: Loc = (0, 29);
    pub const BSEL: Loc = (0, 31);

    // SELID 1: exception and interrupt control
    pub const MCFG0: Loc = (1, 0);
    pub const RBASE: Loc = (1, 2);
    pub const EBASE: Loc = (1, 3);
    pub const INTBP: Loc = (1, 4);
    pub const MCTL: Loc = (1, 5);
    pub const PID: Loc = (1, 6);
    pub const SCCFG: Loc = (1, 11);
    pub const SCBP: Loc = (1, 12);

    // SELID 2: processor configuration and memory errors
    pub const HTCFG0: Loc = (2, 0);
    pub const MEA: Loc = (2, 6);
    pub const ASID: Loc = (2, 7);
    pub const MEI: Loc = (2, 8);
}
