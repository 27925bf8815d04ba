//! Segment registers, descriptor tables and the selector legality check.
//!
//! A selector written through the register API goes through the same
//! protection checks the guest's own `mov sreg` would, but the check runs
//! before anything is modified: an illegal selector is reported as a
//! permission error and leaves the whole segment cache as it was.
//!
//! # References
//! - SDM Vol. 3A, 3.4.5 "Segment Descriptors"
//! - SDM Vol. 3A, 5.6 "Privilege Level Checking When Accessing Data Segments"

use super::{HFlags, X86State};
use crate::error::{RegError, Result};
use crate::memory::GuestMemory;
use regmux_hw::x86::{cr0, desc, eflags, selector};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Segment register, in the order the engine indexes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegReg {
    Es = 0,
    Cs = 1,
    Ss = 2,
    Ds = 3,
    Fs = 4,
    Gs = 5,
}

impl SegReg {
    pub fn name(self) -> &'static str {
        match self {
            SegReg::Es => "es",
            SegReg::Cs => "cs",
            SegReg::Ss => "ss",
            SegReg::Ds => "ds",
            SegReg::Fs => "fs",
            SegReg::Gs => "gs",
        }
    }
}

/// Hidden part of a segment register (or LDTR/TR).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentCache {
    pub selector: u16,
    pub base: u64,
    pub limit: u32,
    /// Descriptor high dword, attribute bits only.
    pub flags: u32,
}

impl SegmentCache {
    pub fn new(selector: u16, base: u64, limit: u32, flags: u32) -> Self {
        Self {
            selector,
            base,
            limit,
            flags,
        }
    }

    pub fn dpl(&self) -> u8 {
        ((self.flags & desc::DPL_MASK) >> desc::DPL_SHIFT) as u8
    }
}

/// GDTR / IDTR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorTable {
    pub base: u64,
    pub limit: u16,
}

impl DescriptorTable {
    pub fn new(base: u64, limit: u16) -> Self {
        Self { base, limit }
    }
}

/// An 8-byte code/data descriptor as fetched from the GDT or LDT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Descriptor {
    low: u32,
    high: u32,
}

impl Descriptor {
    fn base(&self) -> u64 {
        ((self.low >> 16) | ((self.high & 0xff) << 16) | (self.high & 0xff00_0000)) as u64
    }

    fn limit(&self) -> u32 {
        let limit = (self.low & 0xffff) | (self.high & 0x000f_0000);
        if self.high & desc::G != 0 {
            (limit << 12) | 0xfff
        } else {
            limit
        }
    }

    fn dpl(&self) -> u16 {
        ((self.high & desc::DPL_MASK) >> desc::DPL_SHIFT) as u16
    }
}

impl X86State {
    /// Real mode and virtual-8086 mode load segments without descriptors.
    fn segments_unchecked(&self) -> bool {
        self.cr[0] & cr0::PE == 0 || self.flags.compute() & eflags::VM != 0
    }

    /// Decide whether `sel` may be loaded into `seg` at the current privilege
    /// level. Returns the descriptor to load, or `None` for a real-mode or
    /// null-selector load that needs no descriptor.
    pub(crate) fn check_selector_load(
        &self,
        memory: &dyn GuestMemory,
        seg: SegReg,
        sel: u16,
    ) -> Result<Option<Descriptor>> {
        let refuse = || RegError::SegmentLoad {
            segment: seg.name(),
            selector: sel,
        };

        if self.segments_unchecked() {
            return Ok(None);
        }

        let cpl = self.cpl as u16 & 3;
        if sel & !selector::RPL_MASK == 0 {
            // null selector: only a 64-bit kernel may load it into SS
            if seg == SegReg::Ss && (!self.hflags.contains(HFlags::CS64) || cpl == 3) {
                return Err(refuse());
            }
            return Ok(None);
        }

        let (table_base, table_limit) = if sel & selector::TI != 0 {
            (self.ldt.base, self.ldt.limit)
        } else {
            (self.gdt.base, self.gdt.limit as u32)
        };
        let index = (sel & selector::INDEX_MASK) as u32;
        if index + 7 > table_limit {
            return Err(refuse());
        }
        let addr = table_base.wrapping_add(index as u64);
        let low = memory.read_u32(addr).map_err(|_| refuse())?;
        let high = memory.read_u32(addr.wrapping_add(4)).map_err(|_| refuse())?;
        let descriptor = Descriptor { low, high };
        if high & desc::S == 0 {
            return Err(refuse());
        }

        let rpl = sel & selector::RPL_MASK;
        let dpl = descriptor.dpl();
        if seg == SegReg::Ss {
            // writable data segment at exactly the current privilege level
            if high & desc::CS != 0 || high & desc::W == 0 {
                return Err(refuse());
            }
            if rpl != cpl || dpl != cpl {
                return Err(refuse());
            }
        } else {
            // execute-only code cannot be loaded into a data segment register
            if high & (desc::CS | desc::R) == desc::CS {
                return Err(refuse());
            }
            let conforming_code = high & desc::CS != 0 && high & desc::C != 0;
            if !conforming_code && (dpl < cpl || dpl < rpl) {
                return Err(refuse());
            }
        }

        if high & desc::P == 0 {
            return Err(refuse());
        }
        Ok(Some(descriptor))
    }

    /// Selector write: legality check, then load the descriptor cache.
    pub(crate) fn load_segment(
        &mut self,
        memory: &dyn GuestMemory,
        seg: SegReg,
        sel: u16,
    ) -> Result<()> {
        let descriptor = self.check_selector_load(memory, seg, sel)?;
        if self.segments_unchecked() {
            let flags = if seg == SegReg::Cs {
                desc::REAL_MODE_CODE
            } else {
                desc::REAL_MODE_DATA
            };
            self.load_segment_cache(seg, sel, (sel as u64) << 4, 0xffff, flags);
            return Ok(());
        }
        match descriptor {
            Some(d) => self.load_segment_cache(seg, sel, d.base(), d.limit(), d.high),
            None => self.load_segment_cache(seg, sel, 0, 0, 0),
        }
        trace!(segment = seg.name(), selector = sel, "segment loaded");
        Ok(())
    }

    /// 16-bit mode data segment load.
    pub(crate) fn load_real_mode_segment(&mut self, seg: SegReg, sel: u16) {
        self.load_segment_cache(seg, sel, (sel as u64) << 4, 0xffff, desc::REAL_MODE_DATA);
    }

    /// Fill a segment cache and refresh the hflags that depend on CS and SS.
    pub(crate) fn load_segment_cache(
        &mut self,
        seg: SegReg,
        sel: u16,
        base: u64,
        limit: u32,
        flags: u32,
    ) {
        self.segs[seg as usize] = SegmentCache::new(sel, base, limit, flags);

        match seg {
            SegReg::Cs => {
                if self.hflags.contains(HFlags::LMA) && flags & desc::L != 0 {
                    self.hflags |= HFlags::CS32 | HFlags::SS32 | HFlags::CS64;
                } else {
                    self.hflags.remove(HFlags::CS32 | HFlags::CS64);
                    self.hflags.set(HFlags::CS32, flags & desc::B != 0);
                }
            }
            SegReg::Ss => self.cpl = ((flags & desc::DPL_MASK) >> desc::DPL_SHIFT) as u8,
            _ => {}
        }

        let ss_big = self.seg(SegReg::Ss).flags & desc::B != 0;
        let addseg = if self.hflags.contains(HFlags::CS64) {
            false
        } else if self.segments_unchecked() || !self.hflags.contains(HFlags::CS32) {
            true
        } else {
            (self.seg(SegReg::Ds).base | self.seg(SegReg::Es).base | self.seg(SegReg::Ss).base)
                != 0
        };
        self.hflags.set(HFlags::SS32, ss_big);
        self.hflags.set(HFlags::ADDSEG, addseg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::FlatMemory;

    const GDT_BASE: u64 = 0x1000;

    fn raw_descriptor(base: u32, limit: u32, flags: u32) -> [u8; 8] {
        let low = (limit & 0xffff) | (base << 16);
        let high = (base >> 16) & 0xff | (base & 0xff00_0000) | (limit & 0x000f_0000) | flags;
        let mut raw = [0u8; 8];
        raw[..4].copy_from_slice(&low.to_le_bytes());
        raw[4..].copy_from_slice(&high.to_le_bytes());
        raw
    }

    fn protected_state(memory: &mut FlatMemory) -> X86State {
        let data = desc::P | desc::S | desc::W | desc::A | desc::B | desc::G;
        let user_data = data | (3 << desc::DPL_SHIFT);
        let code_xo = desc::P | desc::S | desc::CS | desc::B;
        let not_present = desc::S | desc::W;
        for (index, raw) in [
            (1, raw_descriptor(0x0010_0000, 0xfffff, data)),
            (2, raw_descriptor(0, 0xfffff, user_data)),
            (3, raw_descriptor(0, 0xfffff, code_xo)),
            (4, raw_descriptor(0, 0xfffff, not_present)),
        ] {
            memory.write(GDT_BASE + index * 8, &raw).unwrap();
        }

        let mut state = X86State::default();
        state.cr[0] = cr0::PE;
        state.hflags = HFlags::PE | HFlags::CS32 | HFlags::SS32;
        state.gdt = DescriptorTable::new(GDT_BASE, 5 * 8 - 1);
        state
    }

    #[test]
    fn loads_flat_data_segment() {
        let mut memory = FlatMemory::new(0, 0x2000);
        let mut state = protected_state(&mut memory);
        state.load_segment(&memory, SegReg::Ds, 0x08).unwrap();
        let ds = state.seg(SegReg::Ds);
        assert_eq!(ds.base, 0x0010_0000);
        assert_eq!(ds.limit, 0xffff_ffff);
        assert!(state.hflags.contains(HFlags::ADDSEG));
    }

    #[test]
    fn rejects_out_of_range_and_unsuitable_descriptors() {
        let mut memory = FlatMemory::new(0, 0x2000);
        let state = protected_state(&mut memory);
        let check = |seg, sel| state.check_selector_load(&memory, seg, sel);

        assert!(check(SegReg::Ds, 5 << 3).is_err(), "beyond GDT limit");
        assert!(check(SegReg::Ds, 3 << 3).is_err(), "execute-only code");
        assert!(check(SegReg::Ds, 4 << 3).is_err(), "not present");
        assert!(check(SegReg::Ss, 3 << 3).is_err(), "code into SS");
        assert!(check(SegReg::Ss, (2 << 3) | 3).is_err(), "SS dpl != cpl");
        assert!(check(SegReg::Ss, 0).is_err(), "null SS outside long mode");
        assert!(check(SegReg::Ds, 0).unwrap().is_none(), "null DS");
        assert!(check(SegReg::Es, (2 << 3) | 3).is_ok(), "less privileged data");
        assert!(check(SegReg::Ds, 0x0c).is_err(), "empty LDT");
    }

    #[test]
    fn real_mode_skips_checks() {
        let memory = FlatMemory::new(0, 0x10);
        let mut state = X86State::default();
        state.load_segment(&memory, SegReg::Ss, 0x1234).unwrap();
        let ss = state.seg(SegReg::Ss);
        assert_eq!(ss.base, 0x12340);
        assert_eq!(ss.limit, 0xffff);
        assert_eq!(ss.flags, desc::REAL_MODE_DATA);
    }
}
