//! x86 state record and register accessor (16, 32 and 64-bit modes).

mod control;
mod flags;
mod fpu;
pub mod msr;
mod regs;
mod segment;
mod table;

pub use flags::{FlagsState, LazyFlags, OperandSize};
pub use fpu::{FpuState, Precision, RoundingMode, SseState};
pub use msr::MsrFile;
pub use regs::X86Reg;
pub use segment::{DescriptorTable, SegReg, SegmentCache};

use crate::arch::{AccessEnv, Mode, RegisterFile};
use crate::error::{RegError, Result};
use crate::value::{
    Fp80, RegValue, ValueCell, ValueRef, X86Mmr, X86Msr, get_scalar, put_scalar,
};
use bitflags::bitflags;
use regmux_hw::x86::{cpuid, cr0, desc, efer};
use serde::{Deserialize, Serialize};
use table::{Access, GprView, TableReg};
use tracing::{instrument, trace};

/// Indices into [`X86State::regs`].
pub mod gpr {
    pub const RAX: usize = 0;
    pub const RCX: usize = 1;
    pub const RDX: usize = 2;
    pub const RBX: usize = 3;
    pub const RSP: usize = 4;
    pub const RBP: usize = 5;
    pub const RSI: usize = 6;
    pub const RDI: usize = 7;
}

bitflags! {
    /// Translation-relevant state cached from CR0, EFER and the CS/SS
    /// descriptors. The current privilege level is kept separately in
    /// [`X86State::cpl`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct HFlags: u32 {
        const CS32 = 1 << 0;
        const SS32 = 1 << 1;
        /// Segment bases of DS/ES/SS must be added to effective addresses.
        const ADDSEG = 1 << 2;
        const PE = 1 << 3;
        const MP = 1 << 4;
        const EM = 1 << 5;
        const TS = 1 << 6;
        const LMA = 1 << 7;
        const CS64 = 1 << 8;
        const OSFXSR = 1 << 9;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct X86State {
    pub regs: [u64; 16],
    pub eip: u64,
    pub flags: FlagsState,
    /// Indexed by [`SegReg`].
    pub segs: [SegmentCache; 6],
    pub ldt: SegmentCache,
    pub tr: SegmentCache,
    pub gdt: DescriptorTable,
    pub idt: DescriptorTable,
    pub cr: [u64; 5],
    pub dr: [u64; 8],
    pub hflags: HFlags,
    pub cpl: u8,
    pub efer: u64,
    pub fpu: FpuState,
    pub sse: SseState,
    pub msr: MsrFile,
    /// CPUID.80000001H:EDX as advertised to the guest.
    pub cpuid_ext2_edx: u32,
}

impl X86State {
    pub fn seg(&self, seg: SegReg) -> &SegmentCache {
        &self.segs[seg as usize]
    }

    fn mmr(&self, reg: TableReg, mode: Mode) -> X86Mmr {
        let base_mask = if mode == Mode::Bits64 {
            u64::MAX
        } else {
            u32::MAX as u64
        };
        match reg {
            TableReg::Gdtr | TableReg::Idtr => {
                let table = if reg == TableReg::Gdtr {
                    &self.gdt
                } else {
                    &self.idt
                };
                X86Mmr {
                    base: table.base & base_mask,
                    limit: table.limit as u32,
                    ..X86Mmr::default()
                }
            }
            TableReg::Ldtr | TableReg::Tr => {
                let cache = if reg == TableReg::Ldtr {
                    &self.ldt
                } else {
                    &self.tr
                };
                X86Mmr {
                    selector: cache.selector,
                    base: cache.base & base_mask,
                    limit: cache.limit,
                    flags: cache.flags,
                }
            }
        }
    }

    fn set_mmr(&mut self, reg: TableReg, mode: Mode, mmr: X86Mmr) {
        let base = if mode == Mode::Bits64 {
            mmr.base
        } else {
            mmr.base as u32 as u64
        };
        match reg {
            TableReg::Gdtr => self.gdt = DescriptorTable::new(base, mmr.limit as u16),
            TableReg::Idtr => self.idt = DescriptorTable::new(base, mmr.limit as u16),
            TableReg::Ldtr => {
                self.ldt = SegmentCache::new(mmr.selector, base, mmr.limit, mmr.flags)
            }
            TableReg::Tr => self.tr = SegmentCache::new(mmr.selector, base, mmr.limit, mmr.flags),
        }
    }

    fn read_access(&mut self, mode: Mode, access: Access, out: &mut [u8]) {
        match access {
            Access::Gpr(index, view) => put_scalar(out, view.read(self.regs[index])),
            Access::Ip(view) => put_scalar(out, view.read(self.eip)),
            Access::Flags(view) => put_scalar(out, view.read(self.flags.compute())),
            Access::Control(index) => put_scalar(out, self.cr[index]),
            Access::Debug(index) => put_scalar(out, self.dr[index]),
            Access::Segment(seg) | Access::RealModeSegment(seg) | Access::SelectorOnly(seg) => {
                put_scalar(out, self.seg(seg).selector as u64)
            }
            Access::SegmentBase(seg) => put_scalar(out, self.seg(seg).base),
            Access::Table(reg) => self.mmr(reg, mode).encode(out),
            Access::FpPhysical(slot) => self.fpu.regs[slot].encode(out),
            Access::FpStack(st) => self.fpu.st(st).encode(out),
            Access::Fpsw => put_scalar(out, self.fpu.status_word() as u64),
            Access::Fpcw => put_scalar(out, self.fpu.control as u64),
            Access::Fptag => put_scalar(out, self.fpu.tag_word() as u64),
            Access::Fip => put_scalar(out, self.fpu.fip),
            Access::Fcs => put_scalar(out, self.fpu.fcs as u64),
            Access::Fdp => put_scalar(out, self.fpu.fdp),
            Access::Fds => put_scalar(out, self.fpu.fds as u64),
            Access::Fop => put_scalar(out, self.fpu.fop as u64),
            Access::Xmm(index) => self.sse.xmm[index].encode(out),
            Access::Ymm(index) => self.sse.ymm(index).encode(out),
            Access::Mxcsr => put_scalar(out, self.sse.mxcsr as u64),
            Access::Msr => {
                let request = X86Msr::decode(out);
                let value = msr::read(self, request.index);
                X86Msr::new(request.index, value).encode(out);
            }
        }
    }

    fn write_access(
        &mut self,
        env: &mut AccessEnv<'_>,
        access: Access,
        src: &[u8],
    ) -> Result<()> {
        let value = || get_scalar(src);
        match access {
            Access::Gpr(index, view) => self.regs[index] = view.write(self.regs[index], value()),
            Access::Ip(view) => {
                self.eip = view.write(self.eip, value());
                env.mark_pc_dirty();
            }
            Access::Flags(view) => self.flags.load_masked(value(), view.mask()),
            Access::Control(index) => self.write_control(index, value()),
            Access::Debug(index) => self.dr[index] = value(),
            Access::Segment(seg) => {
                let pc = self.pc(env.mode());
                self.load_segment(env.memory(), seg, value() as u16)?;
                if self.pc(env.mode()) != pc {
                    env.mark_pc_dirty();
                }
            }
            Access::RealModeSegment(seg) => self.load_real_mode_segment(seg, value() as u16),
            Access::SelectorOnly(seg) => self.segs[seg as usize].selector = value() as u16,
            Access::SegmentBase(seg) => self.segs[seg as usize].base = value(),
            Access::Table(reg) => self.set_mmr(reg, env.mode(), X86Mmr::decode(src)),
            Access::FpPhysical(slot) => self.fpu.regs[slot] = Fp80::decode(src),
            Access::FpStack(st) => self.fpu.set_st(st, Fp80::decode(src)),
            Access::Fpsw => self.fpu.set_status_word(value() as u16),
            Access::Fpcw => self.fpu.set_control_word(value() as u16),
            Access::Fptag => self.fpu.set_tag_word(value() as u16),
            Access::Fip => self.fpu.fip = value(),
            Access::Fcs => self.fpu.fcs = value() as u16,
            Access::Fdp => self.fpu.fdp = value(),
            Access::Fds => self.fpu.fds = value() as u16,
            Access::Fop => self.fpu.fop = value() as u16,
            Access::Xmm(index) => self.sse.xmm[index] = <[u64; 2]>::decode(src),
            Access::Ymm(index) => self.sse.set_ymm(index, <[u64; 4]>::decode(src)),
            Access::Mxcsr => self.sse.set_mxcsr(value() as u32),
            Access::Msr => {
                let request = X86Msr::decode(src);
                msr::write(self, request.index, request.value);
            }
        }
        Ok(())
    }
}

impl RegisterFile for X86State {
    fn width(&self, mode: Mode, id: u32) -> Option<usize> {
        table::lookup(mode, id).map(|entry| entry.width)
    }

    fn read(&mut self, env: &mut AccessEnv<'_>, id: u32, cell: &mut ValueCell<'_>) -> Result<()> {
        let mode = env.mode();
        let entry = table::lookup(mode, id).ok_or(RegError::UnknownRegister { id, mode })?;
        let out = cell.claim(id, entry.width)?;
        self.read_access(mode, entry.access, out);
        Ok(())
    }

    fn write(&mut self, env: &mut AccessEnv<'_>, id: u32, value: ValueRef<'_>) -> Result<()> {
        let mode = env.mode();
        let entry = table::lookup(mode, id).ok_or(RegError::UnknownRegister { id, mode })?;
        if !entry.writable {
            return Err(RegError::ReadOnly { id, mode });
        }
        let src = value.claim(id, entry.width)?;
        self.write_access(env, entry.access, src)
    }

    #[instrument(level = "trace", skip(self))]
    fn reset(&mut self, mode: Mode) {
        *self = X86State::default();
        self.flags.load(0);

        match mode {
            Mode::Bits16 => {
                self.hflags = HFlags::empty();
                self.cr[0] = 0;
                self.load_segment_cache(SegReg::Cs, 0, 0, 0xffff, desc::REAL_MODE_CODE);
                for seg in [SegReg::Ds, SegReg::Es, SegReg::Ss, SegReg::Fs, SegReg::Gs] {
                    self.load_real_mode_segment(seg, 0);
                }
            }
            Mode::Bits32 => {
                self.hflags |= HFlags::CS32 | HFlags::SS32 | HFlags::OSFXSR;
                self.update_cr0(cr0::PE);
            }
            Mode::Bits64 => {
                self.hflags |= HFlags::CS32
                    | HFlags::SS32
                    | HFlags::CS64
                    | HFlags::LMA
                    | HFlags::OSFXSR;
                self.hflags.remove(HFlags::ADDSEG);
                self.efer |= efer::LMA | efer::LME;
                self.update_cr0(cr0::PE);
                self.cpuid_ext2_edx |= cpuid::EXT2_LM;
            }
        }
        trace!(hflags = ?self.hflags, cr0 = self.cr[0], "x86 state reset");
    }

    fn pc(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Bits16 => ((self.seg(SegReg::Cs).selector as u64) << 4) + self.eip,
            _ => self.eip,
        }
    }

    fn set_pc(&mut self, mode: Mode, pc: u64) {
        self.eip = match mode {
            Mode::Bits16 => pc.wrapping_sub((self.seg(SegReg::Cs).selector as u64) << 4),
            _ => pc,
        };
    }
}

impl GprView {
    fn read(self, slot: u64) -> u64 {
        match self {
            GprView::Low8 => slot & 0xff,
            GprView::High8 => (slot >> 8) & 0xff,
            GprView::Word => slot & 0xffff,
            GprView::Dword => slot & 0xffff_ffff,
            GprView::Qword => slot,
        }
    }

    /// Merge `value` into `slot`, leaving bytes outside the view untouched.
    fn write(self, slot: u64, value: u64) -> u64 {
        let (shift, mask) = match self {
            GprView::Low8 => (0, 0xff),
            GprView::High8 => (8, 0xff),
            GprView::Word => (0, 0xffff),
            GprView::Dword => (0, 0xffff_ffff),
            GprView::Qword => (0, u64::MAX),
        };
        (slot & !(mask << shift)) | ((value & mask) << shift)
    }

    /// Bits of the backing slot this view covers.
    fn mask(self) -> u64 {
        self.write(0, u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpr_views_preserve_neighbours() {
        let slot = 0x1122_3344_5566_7788;
        assert_eq!(GprView::High8.read(slot), 0x77);
        assert_eq!(GprView::High8.write(slot, 0xab), 0x1122_3344_5566_ab88);
        assert_eq!(GprView::Low8.write(slot, 0x1ff), 0x1122_3344_5566_77ff);
        assert_eq!(GprView::Word.write(slot, 0xbeef), 0x1122_3344_5566_beef);
        assert_eq!(GprView::Dword.write(slot, 0xdead_beef), 0x1122_3344_dead_beef);
        assert_eq!(GprView::High8.mask(), 0xff00);
    }
}
