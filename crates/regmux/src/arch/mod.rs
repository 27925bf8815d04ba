//! Per-architecture state records and their register accessors.
//!
//! Every architecture implements [`RegisterFile`] over its own state record.
//! The accessor never knows whether the record belongs to a running CPU or a
//! detached snapshot; everything it needs arrives through [`AccessEnv`].

pub mod mips;
pub mod rh850;
pub mod riscv;
pub mod s390x;
pub mod sparc;
pub mod x86;

use crate::error::Result;
use crate::memory::GuestMemory;
use crate::value::{ValueCell, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Arch {
    X86,
    Mips,
    Riscv,
    Sparc,
    S390x,
    Rh850,
}

impl Arch {
    pub fn supports(self, mode: Mode) -> bool {
        matches!(
            (self, mode),
            (Arch::X86, _)
                | (Arch::Mips | Arch::Riscv, Mode::Bits32 | Mode::Bits64)
                | (Arch::Sparc | Arch::Rh850, Mode::Bits32)
                | (Arch::S390x, Mode::Bits64)
        )
    }

    /// Numeric tag of the register called `name`, if this architecture has one.
    pub fn register_by_name(self, name: &str) -> Option<u32> {
        match self {
            Arch::X86 => x86::X86Reg::from_name(name).map(u32::from),
            Arch::Mips => mips::MipsReg::from_name(name).map(u32::from),
            Arch::Riscv => riscv::RiscvReg::from_name(name).map(u32::from),
            Arch::Sparc => sparc::SparcReg::from_name(name).map(u32::from),
            Arch::S390x => s390x::S390xReg::from_name(name).map(u32::from),
            Arch::Rh850 => rh850::Rh850Reg::from_name(name).map(u32::from),
        }
    }

    pub fn register_name(self, id: u32) -> Option<&'static str> {
        match self {
            Arch::X86 => x86::X86Reg::from_u32(id).map(|r| r.name()),
            Arch::Mips => mips::MipsReg::from_u32(id).map(|r| r.name()),
            Arch::Riscv => riscv::RiscvReg::from_u32(id).map(|r| r.name()),
            Arch::Sparc => sparc::SparcReg::from_u32(id).map(|r| r.name()),
            Arch::S390x => s390x::S390xReg::from_u32(id).map(|r| r.name()),
            Arch::Rh850 => rh850::Rh850Reg::from_u32(id).map(|r| r.name()),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Arch::X86 => "x86",
            Arch::Mips => "mips",
            Arch::Riscv => "riscv",
            Arch::Sparc => "sparc",
            Arch::S390x => "s390x",
            Arch::Rh850 => "rh850",
        };
        f.write_str(name)
    }
}

/// Execution mode. Changes which identifiers exist and how wide they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Bits16,
    Bits32,
    Bits64,
}

impl Mode {
    /// Natural register width in bytes.
    pub fn word_size(self) -> usize {
        match self {
            Mode::Bits16 => 2,
            Mode::Bits32 => 4,
            Mode::Bits64 => 8,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = match self {
            Mode::Bits16 => "16-bit",
            Mode::Bits32 => "32-bit",
            Mode::Bits64 => "64-bit",
        };
        f.write_str(bits)
    }
}

/// Everything an accessor may consult besides the state record itself.
pub struct AccessEnv<'a> {
    mode: Mode,
    memory: &'a dyn GuestMemory,
    pc_dirty: bool,
}

impl<'a> AccessEnv<'a> {
    pub fn new(mode: Mode, memory: &'a dyn GuestMemory) -> Self {
        Self {
            mode,
            memory,
            pc_dirty: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn memory(&self) -> &'a dyn GuestMemory {
        self.memory
    }

    /// A write changed the program counter; translated code is stale.
    pub fn mark_pc_dirty(&mut self) {
        self.pc_dirty = true;
    }

    pub fn pc_dirty(&self) -> bool {
        self.pc_dirty
    }
}

/// Register access over one architecture's state record.
pub trait RegisterFile {
    /// Width in bytes of `id` in `mode`, or `None` if the register does not exist there.
    fn width(&self, mode: Mode, id: u32) -> Option<usize>;

    fn read(&mut self, env: &mut AccessEnv<'_>, id: u32, cell: &mut ValueCell<'_>) -> Result<()>;

    fn write(&mut self, env: &mut AccessEnv<'_>, id: u32, value: ValueRef<'_>) -> Result<()>;

    /// Zero every register family, then establish the invariants of `mode`.
    fn reset(&mut self, mode: Mode);

    fn pc(&self, mode: Mode) -> u64;

    fn set_pc(&mut self, mode: Mode, pc: u64);
}

/// The state record of one CPU, whatever its architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateRecord {
    X86(Box<x86::X86State>),
    Mips(mips::MipsState),
    Riscv(Box<riscv::RiscvState>),
    Sparc(Box<sparc::SparcState>),
    S390x(s390x::S390xState),
    Rh850(Box<rh850::Rh850State>),
}

macro_rules! delegate {
    ($self:ident, $file:ident => $body:expr) => {
        match $self {
            StateRecord::X86($file) => $body,
            StateRecord::Mips($file) => $body,
            StateRecord::Riscv($file) => $body,
            StateRecord::Sparc($file) => $body,
            StateRecord::S390x($file) => $body,
            StateRecord::Rh850($file) => $body,
        }
    };
}

impl StateRecord {
    /// A zeroed record; callers follow up with [`RegisterFile::reset`].
    pub fn new(arch: Arch) -> Self {
        match arch {
            Arch::X86 => StateRecord::X86(Box::default()),
            Arch::Mips => StateRecord::Mips(mips::MipsState::default()),
            Arch::Riscv => StateRecord::Riscv(Box::default()),
            Arch::Sparc => StateRecord::Sparc(Box::default()),
            Arch::S390x => StateRecord::S390x(s390x::S390xState::default()),
            Arch::Rh850 => StateRecord::Rh850(Box::default()),
        }
    }

    pub fn arch(&self) -> Arch {
        match self {
            StateRecord::X86(_) => Arch::X86,
            StateRecord::Mips(_) => Arch::Mips,
            StateRecord::Riscv(_) => Arch::Riscv,
            StateRecord::Sparc(_) => Arch::Sparc,
            StateRecord::S390x(_) => Arch::S390x,
            StateRecord::Rh850(_) => Arch::Rh850,
        }
    }

    pub fn as_x86(&self) -> Option<&x86::X86State> {
        match self {
            StateRecord::X86(state) => Some(state),
            _ => None,
        }
    }
}

impl RegisterFile for StateRecord {
    fn width(&self, mode: Mode, id: u32) -> Option<usize> {
        delegate!(self, file => file.width(mode, id))
    }

    fn read(&mut self, env: &mut AccessEnv<'_>, id: u32, cell: &mut ValueCell<'_>) -> Result<()> {
        delegate!(self, file => file.read(env, id, cell))
    }

    fn write(&mut self, env: &mut AccessEnv<'_>, id: u32, value: ValueRef<'_>) -> Result<()> {
        delegate!(self, file => file.write(env, id, value))
    }

    fn reset(&mut self, mode: Mode) {
        delegate!(self, file => file.reset(mode))
    }

    fn pc(&self, mode: Mode) -> u64 {
        delegate!(self, file => file.pc(mode))
    }

    fn set_pc(&mut self, mode: Mode, pc: u64) {
        delegate!(self, file => file.set_pc(mode, pc))
    }
}
