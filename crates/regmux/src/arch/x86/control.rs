//! Control register side effects.
//!
//! Writing CR0/CR3/CR4 through the register API runs the same update routine
//! the guest's `mov crN` would (mode switches, cached hflags), then latches
//! the raw value the caller supplied.
//!
//! # References
//! - SDM Vol. 3A, 2.5 "Control Registers"
//! - SDM Vol. 3A, 9.8.5 "Initializing IA-32e Mode"

use super::{HFlags, X86State};
use regmux_hw::x86::{cr0, cr4, efer};
use tracing::debug;

/// CR0 bits whose change invalidates cached translations.
const CR0_TLB_BITS: u64 = cr0::PG | cr0::WP | cr0::PE;

/// CR4 bits whose change invalidates cached translations.
const CR4_TLB_BITS: u64 = cr4::PGE | cr4::PAE | cr4::PSE | cr4::SMEP | cr4::SMAP | cr4::LA57;

impl X86State {
    pub(crate) fn write_control(&mut self, index: usize, value: u64) {
        match index {
            0 => self.update_cr0(value),
            3 => self.update_cr3(value),
            4 => self.update_cr4(value),
            _ => {}
        }
        self.cr[index] = value;
    }

    /// Apply a new CR0: paging transitions into and out of long mode,
    /// protected mode and FPU hflags.
    pub(crate) fn update_cr0(&mut self, value: u64) {
        let old = self.cr[0];
        if (value ^ old) & CR0_TLB_BITS != 0 {
            debug!(old, new = value, "cr0 paging state changed");
        }

        let enabling_paging = old & cr0::PG == 0 && value & cr0::PG != 0;
        let disabling_paging = old & cr0::PG != 0 && value & cr0::PG == 0;
        if enabling_paging && self.efer & efer::LME != 0 {
            if self.cr[4] & cr4::PAE == 0 {
                // long mode needs PAE; mode-derived state stays as it was
                debug!("paging enabled with EFER.LME but without CR4.PAE");
                return;
            }
            self.efer |= efer::LMA;
            self.hflags |= HFlags::LMA;
            debug!("entered long mode");
        } else if disabling_paging && self.efer & efer::LMA != 0 {
            self.efer &= !efer::LMA;
            self.hflags.remove(HFlags::LMA | HFlags::CS64);
            self.eip &= 0xffff_ffff;
            debug!("left long mode");
        }

        self.cr[0] = value | cr0::ET;

        let protected = value & cr0::PE != 0;
        self.hflags.set(HFlags::PE, protected);
        if !protected {
            self.hflags |= HFlags::ADDSEG;
        }
        self.hflags.set(HFlags::MP, value & cr0::MP != 0);
        self.hflags.set(HFlags::EM, value & cr0::EM != 0);
        self.hflags.set(HFlags::TS, value & cr0::TS != 0);
    }

    pub(crate) fn update_cr3(&mut self, value: u64) {
        if self.cr[0] & cr0::PG != 0 {
            debug!(cr3 = value, "page table root changed");
        }
        self.cr[3] = value;
    }

    pub(crate) fn update_cr4(&mut self, value: u64) {
        if (value ^ self.cr[4]) & CR4_TLB_BITS != 0 {
            debug!(old = self.cr[4], new = value, "cr4 paging state changed");
        }
        self.hflags.set(HFlags::OSFXSR, value & cr4::OSFXSR != 0);
        self.cr[4] = value;
    }

    /// EFER write, as performed by `wrmsr`. LMA is owned by the CR0.PG
    /// transition and keeps its current value.
    pub(crate) fn load_efer(&mut self, value: u64) {
        self.efer = (value & !efer::LMA) | (self.efer & efer::LMA);
        self.hflags.set(HFlags::LMA, self.efer & efer::LMA != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_with_lme_activates_long_mode() {
        let mut state = X86State::default();
        state.efer = efer::LME;
        state.write_control(4, cr4::PAE);
        state.write_control(0, cr0::PE | cr0::PG);
        assert!(state.hflags.contains(HFlags::LMA | HFlags::PE));
        assert_ne!(state.efer & efer::LMA, 0);
        // raw value latched last
        assert_eq!(state.cr[0], cr0::PE | cr0::PG);

        state.eip = 0x1_0000_1000;
        state.write_control(0, cr0::PE);
        assert!(!state.hflags.contains(HFlags::LMA));
        assert_eq!(state.efer & efer::LMA, 0);
        assert_eq!(state.eip, 0x1000);
    }

    #[test]
    fn cr4_osfxsr_tracks_hflag() {
        let mut state = X86State::default();
        state.write_control(4, cr4::OSFXSR);
        assert!(state.hflags.contains(HFlags::OSFXSR));
        state.write_control(4, 0);
        assert!(!state.hflags.contains(HFlags::OSFXSR));
    }

    #[test]
    fn efer_write_cannot_set_lma() {
        let mut state = X86State::default();
        state.load_efer(efer::LME | efer::LMA | efer::NXE);
        assert_eq!(state.efer, efer::LME | efer::NXE);
        assert!(!state.hflags.contains(HFlags::LMA));

        state.write_control(4, cr4::PAE);
        state.write_control(0, cr0::PE | cr0::PG);
        state.load_efer(efer::LME);
        assert_eq!(state.efer, efer::LME | efer::LMA, "LMA survives while paging");
        assert!(state.hflags.contains(HFlags::LMA));
    }

    #[test]
    fn cr2_is_a_plain_latch() {
        let mut state = X86State::default();
        state.write_control(2, 0xdead_b000);
        assert_eq!(state.cr[2], 0xdead_b000);
        assert_eq!(state.cr[3], 0);
        assert_eq!(state.hflags, HFlags::empty());
    }
}
