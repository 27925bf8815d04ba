//! Static (identifier, mode) -> register description tables.
//!
//! One dense table per mode, built on first use. The 32-bit table is the
//! 16-bit one's superset minus the real-mode segment handling; the 64-bit
//! table widens control, debug and descriptor registers and adds the REX
//! registers.

use super::X86Reg;
use super::segment::SegReg;
use crate::arch::Mode;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GprView {
    Low8,
    High8,
    Word,
    Dword,
    Qword,
}

impl GprView {
    fn width(self) -> usize {
        match self {
            GprView::Low8 | GprView::High8 => 1,
            GprView::Word => 2,
            GprView::Dword => 4,
            GprView::Qword => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableReg {
    Gdtr,
    Idtr,
    Ldtr,
    Tr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Gpr(usize, GprView),
    Ip(GprView),
    Flags(GprView),
    Control(usize),
    Debug(usize),
    /// Selector load through the legality check.
    Segment(SegReg),
    /// Real-mode load: base = selector << 4, no check.
    RealModeSegment(SegReg),
    /// Only the visible selector changes.
    SelectorOnly(SegReg),
    SegmentBase(SegReg),
    Table(TableReg),
    FpPhysical(usize),
    FpStack(usize),
    Fpsw,
    Fpcw,
    Fptag,
    Fip,
    Fcs,
    Fdp,
    Fds,
    Fop,
    Xmm(usize),
    Ymm(usize),
    Mxcsr,
    Msr,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RegEntry {
    pub width: usize,
    pub access: Access,
    pub writable: bool,
}

struct RegTable {
    entries: Vec<Option<RegEntry>>,
}

impl RegTable {
    fn new() -> Self {
        Self {
            entries: vec![None; X86Reg::ALL.len()],
        }
    }

    fn set(&mut self, reg: X86Reg, width: usize, access: Access) {
        self.entries[reg as usize] = Some(RegEntry {
            width,
            access,
            writable: true,
        });
    }

    fn set_read_only(&mut self, reg: X86Reg, width: usize, access: Access) {
        self.entries[reg as usize] = Some(RegEntry {
            width,
            access,
            writable: false,
        });
    }

    fn gpr(&mut self, reg: X86Reg, index: usize, view: GprView) {
        self.set(reg, view.width(), Access::Gpr(index, view));
    }

    /// `count` consecutive identifiers starting at `first`.
    fn family(&mut self, first: X86Reg, count: usize, width: usize, access: fn(usize) -> Access) {
        for n in 0..count {
            if let Some(reg) = X86Reg::from_u32(first as u32 + n as u32) {
                self.set(reg, width, access(n));
            }
        }
    }
}

/// Registers that look the same in every mode.
fn mode_independent(t: &mut RegTable) {
    t.family(X86Reg::Fp0, 8, 10, Access::FpPhysical);
    t.family(X86Reg::St0, 8, 10, Access::FpStack);
    t.set(X86Reg::Fpsw, 2, Access::Fpsw);
    t.set(X86Reg::Fpcw, 2, Access::Fpcw);
    t.set(X86Reg::Fptag, 2, Access::Fptag);
    t.family(X86Reg::Xmm0, 8, 16, Access::Xmm);
    t.family(X86Reg::Ymm0, 16, 32, Access::Ymm);
    t.set(X86Reg::Fip, 8, Access::Fip);
    t.set(X86Reg::Fcs, 2, Access::Fcs);
    t.set(X86Reg::Fdp, 8, Access::Fdp);
    t.set(X86Reg::Fds, 2, Access::Fds);
    t.set(X86Reg::Fop, 2, Access::Fop);
}

/// General purpose, flags, IP and system registers common to 32 and 64-bit
/// mode, with control/debug registers `cr_width` bytes wide.
fn protected(t: &mut RegTable, cr_width: usize) {
    use super::gpr::*;
    use GprView::*;

    mode_independent(t);

    t.family(X86Reg::Cr0, 5, cr_width, Access::Control);
    t.family(X86Reg::Dr0, 8, cr_width, Access::Debug);
    t.set(X86Reg::Flags, 2, Access::Flags(Word));
    t.set(X86Reg::Eflags, 4, Access::Flags(Dword));

    let legacy = [
        (RAX, X86Reg::Eax, X86Reg::Ax),
        (RBX, X86Reg::Ebx, X86Reg::Bx),
        (RCX, X86Reg::Ecx, X86Reg::Cx),
        (RDX, X86Reg::Edx, X86Reg::Dx),
        (RSP, X86Reg::Esp, X86Reg::Sp),
        (RBP, X86Reg::Ebp, X86Reg::Bp),
        (RSI, X86Reg::Esi, X86Reg::Si),
        (RDI, X86Reg::Edi, X86Reg::Di),
    ];
    for (index, dword, word) in legacy {
        t.gpr(dword, index, Dword);
        t.gpr(word, index, Word);
    }
    let bytes = [
        (RAX, X86Reg::Al, X86Reg::Ah),
        (RBX, X86Reg::Bl, X86Reg::Bh),
        (RCX, X86Reg::Cl, X86Reg::Ch),
        (RDX, X86Reg::Dl, X86Reg::Dh),
    ];
    for (index, low, high) in bytes {
        t.gpr(low, index, Low8);
        t.gpr(high, index, High8);
    }

    t.set(X86Reg::Eip, 4, Access::Ip(Dword));
    t.set(X86Reg::Ip, 2, Access::Ip(Word));

    let segments = [
        (X86Reg::Cs, SegReg::Cs),
        (X86Reg::Ds, SegReg::Ds),
        (X86Reg::Ss, SegReg::Ss),
        (X86Reg::Es, SegReg::Es),
        (X86Reg::Fs, SegReg::Fs),
        (X86Reg::Gs, SegReg::Gs),
    ];
    for (reg, seg) in segments {
        t.set(reg, 2, Access::Segment(seg));
    }

    t.set(X86Reg::Idtr, 24, Access::Table(TableReg::Idtr));
    t.set(X86Reg::Gdtr, 24, Access::Table(TableReg::Gdtr));
    t.set(X86Reg::Ldtr, 24, Access::Table(TableReg::Ldtr));
    t.set(X86Reg::Tr, 24, Access::Table(TableReg::Tr));
    t.set(X86Reg::Msr, 16, Access::Msr);
    t.set(X86Reg::Mxcsr, 4, Access::Mxcsr);
}

fn build_16() -> RegTable {
    let mut t = RegTable::new();
    protected(&mut t, 4);
    for (reg, seg) in [
        (X86Reg::Es, SegReg::Es),
        (X86Reg::Ss, SegReg::Ss),
        (X86Reg::Ds, SegReg::Ds),
        (X86Reg::Fs, SegReg::Fs),
        (X86Reg::Gs, SegReg::Gs),
    ] {
        t.set(reg, 2, Access::RealModeSegment(seg));
    }
    t.set_read_only(X86Reg::FsBase, 4, Access::SegmentBase(SegReg::Fs));
    t
}

fn build_32() -> RegTable {
    let mut t = RegTable::new();
    protected(&mut t, 4);
    t.set_read_only(X86Reg::FsBase, 4, Access::SegmentBase(SegReg::Fs));
    t
}

fn build_64() -> RegTable {
    use super::gpr::*;
    use GprView::*;

    let mut t = RegTable::new();
    protected(&mut t, 8);

    t.set(X86Reg::Rflags, 8, Access::Flags(Qword));
    t.set(X86Reg::Rip, 8, Access::Ip(Qword));

    let wide = [
        (RAX, X86Reg::Rax),
        (RBX, X86Reg::Rbx),
        (RCX, X86Reg::Rcx),
        (RDX, X86Reg::Rdx),
        (RSP, X86Reg::Rsp),
        (RBP, X86Reg::Rbp),
        (RSI, X86Reg::Rsi),
        (RDI, X86Reg::Rdi),
    ];
    for (index, reg) in wide {
        t.gpr(reg, index, Qword);
    }
    for (index, reg) in [
        (RSP, X86Reg::Spl),
        (RBP, X86Reg::Bpl),
        (RSI, X86Reg::Sil),
        (RDI, X86Reg::Dil),
    ] {
        t.gpr(reg, index, Low8);
    }
    for n in 0..8u32 {
        let index = 8 + n as usize;
        let regs = [
            (X86Reg::R8 as u32, Qword),
            (X86Reg::R8d as u32, Dword),
            (X86Reg::R8w as u32, Word),
            (X86Reg::R8b as u32, Low8),
        ];
        for (first, view) in regs {
            if let Some(reg) = X86Reg::from_u32(first + n) {
                t.gpr(reg, index, view);
            }
        }
    }

    // Long mode ignores the bases of these, only the selector is kept.
    for (reg, seg) in [
        (X86Reg::Cs, SegReg::Cs),
        (X86Reg::Ds, SegReg::Ds),
        (X86Reg::Ss, SegReg::Ss),
        (X86Reg::Es, SegReg::Es),
    ] {
        t.set(reg, 2, Access::SelectorOnly(seg));
    }

    t.family(X86Reg::Xmm8, 8, 16, |n| Access::Xmm(8 + n));
    t.set(X86Reg::FsBase, 8, Access::SegmentBase(SegReg::Fs));
    t.set(X86Reg::GsBase, 8, Access::SegmentBase(SegReg::Gs));
    t
}

static TABLE_16: LazyLock<RegTable> = LazyLock::new(build_16);
static TABLE_32: LazyLock<RegTable> = LazyLock::new(build_32);
static TABLE_64: LazyLock<RegTable> = LazyLock::new(build_64);

pub(crate) fn lookup(mode: Mode, id: u32) -> Option<RegEntry> {
    let table = match mode {
        Mode::Bits16 => &*TABLE_16,
        Mode::Bits32 => &*TABLE_32,
        Mode::Bits64 => &*TABLE_64,
    };
    table.entries.get(id as usize).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width(mode: Mode, reg: X86Reg) -> Option<usize> {
        lookup(mode, reg as u32).map(|entry| entry.width)
    }

    #[test]
    fn widths_follow_mode() {
        assert_eq!(width(Mode::Bits32, X86Reg::Cr0), Some(4));
        assert_eq!(width(Mode::Bits64, X86Reg::Cr0), Some(8));
        assert_eq!(width(Mode::Bits16, X86Reg::Eax), Some(4));
        assert_eq!(width(Mode::Bits32, X86Reg::Rax), None);
        assert_eq!(width(Mode::Bits32, X86Reg::Spl), None);
        assert_eq!(width(Mode::Bits64, X86Reg::Spl), Some(1));
        assert_eq!(width(Mode::Bits64, X86Reg::R15b), Some(1));
        assert_eq!(width(Mode::Bits32, X86Reg::Xmm8), None);
        assert_eq!(width(Mode::Bits64, X86Reg::Xmm15), Some(16));
        assert_eq!(width(Mode::Bits32, X86Reg::Ymm15), Some(32));
        assert_eq!(width(Mode::Bits64, X86Reg::Cr8), None);
        assert_eq!(width(Mode::Bits64, X86Reg::Zmm0), None);
        assert_eq!(width(Mode::Bits64, X86Reg::Invalid), None);
    }

    #[test]
    fn segment_handling_per_mode() {
        let access = |mode, reg: X86Reg| lookup(mode, reg as u32).map(|entry| entry.access);
        assert_eq!(
            access(Mode::Bits16, X86Reg::Ds),
            Some(Access::RealModeSegment(SegReg::Ds))
        );
        assert_eq!(
            access(Mode::Bits16, X86Reg::Cs),
            Some(Access::Segment(SegReg::Cs))
        );
        assert_eq!(
            access(Mode::Bits64, X86Reg::Ds),
            Some(Access::SelectorOnly(SegReg::Ds))
        );
        assert_eq!(
            access(Mode::Bits64, X86Reg::Fs),
            Some(Access::Segment(SegReg::Fs))
        );
        assert!(!lookup(Mode::Bits32, X86Reg::FsBase as u32).unwrap().writable);
        assert!(lookup(Mode::Bits64, X86Reg::FsBase as u32).unwrap().writable);
    }
}
