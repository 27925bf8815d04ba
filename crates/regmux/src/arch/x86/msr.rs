//! Model-specific registers.
//!
//! MSRs are not addressed by register identifier but indirectly, the way the
//! guest does it: the index goes in ECX and `rdmsr`/`wrmsr` move the value
//! through EDX:EAX. The register API borrows those three GPRs for the
//! duration of one micro-operation and always gives them back, whatever
//! happens in between.
//!
//! # References
//! - SDM Vol. 2B, RDMSR / WRMSR
//! - SDM Vol. 4, 2.1 "Architectural MSRs"

use super::{SegReg, X86State, gpr};
use regmux_hw::x86::msr;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// MSR storage that is not part of some other register family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsrFile {
    pub sysenter_cs: u64,
    pub sysenter_esp: u64,
    pub sysenter_eip: u64,
    pub star: u64,
    pub lstar: u64,
    pub cstar: u64,
    pub fmask: u64,
    pub kernel_gs_base: u64,
    pub tsc_aux: u64,
    pub pat: u64,
    pub apic_base: u64,
    pub tsc: u64,
    pub tsc_adjust: u64,
    pub tsc_deadline: u64,
    pub mcg_status: u64,
    pub misc_enable: u64,
    pub feature_control: u64,
    pub fixed_ctr_ctrl: u64,
    pub global_ctrl: u64,
    pub global_status: u64,
    pub global_ovf_ctrl: u64,
    pub fixed_counters: [u64; msr::PERF_FIXED_COUNTERS],
    pub gp_counters: [u64; msr::PERF_GP_COUNTERS],
    pub gp_event_select: [u64; msr::PERF_GP_COUNTERS],
}

fn counter_slot(index: u32, first: u32, count: usize) -> Option<usize> {
    let slot = index.checked_sub(first)? as usize;
    (slot < count).then_some(slot)
}

/// `rdmsr`: ECX selects the MSR, the value lands in EDX:EAX.
///
/// Unimplemented MSRs read as zero.
pub fn rdmsr(state: &mut X86State) {
    let index = state.regs[gpr::RCX] as u32;
    let m = &state.msr;
    let value = match index {
        msr::SYSENTER_CS => m.sysenter_cs,
        msr::SYSENTER_ESP => m.sysenter_esp,
        msr::SYSENTER_EIP => m.sysenter_eip,
        msr::EFER => state.efer,
        msr::STAR => m.star,
        msr::LSTAR => m.lstar,
        msr::CSTAR => m.cstar,
        msr::FMASK => m.fmask,
        msr::FS_BASE => state.seg(SegReg::Fs).base,
        msr::GS_BASE => state.seg(SegReg::Gs).base,
        msr::KERNEL_GS_BASE => m.kernel_gs_base,
        msr::TSC_AUX => m.tsc_aux,
        msr::PAT => m.pat,
        msr::APIC_BASE => m.apic_base,
        msr::TSC => m.tsc,
        msr::TSC_ADJUST => m.tsc_adjust,
        msr::TSC_DEADLINE => m.tsc_deadline,
        msr::MCG_STATUS => m.mcg_status,
        msr::MISC_ENABLE => m.misc_enable,
        msr::FEATURE_CONTROL => m.feature_control,
        msr::PERF_FIXED_COUNTER_CTRL => m.fixed_ctr_ctrl,
        msr::PERF_GLOBAL_CTRL => m.global_ctrl,
        msr::PERF_GLOBAL_STATUS => m.global_status,
        msr::PERF_GLOBAL_OVF_CTRL => m.global_ovf_ctrl,
        _ => {
            if let Some(n) =
                counter_slot(index, msr::PERF_FIXED_COUNTER0, msr::PERF_FIXED_COUNTERS)
            {
                m.fixed_counters[n]
            } else if let Some(n) =
                counter_slot(index, msr::PERF_GP_COUNTER0, msr::PERF_GP_COUNTERS)
            {
                m.gp_counters[n]
            } else if let Some(n) =
                counter_slot(index, msr::PERF_EVENT_SELECT0, msr::PERF_GP_COUNTERS)
            {
                m.gp_event_select[n]
            } else {
                debug!(index, "rdmsr of unimplemented MSR");
                0
            }
        }
    };
    state.regs[gpr::RAX] = value & 0xffff_ffff;
    state.regs[gpr::RDX] = value >> 32;
}

/// `wrmsr`: ECX selects the MSR, EDX:EAX is the value.
///
/// Writes to unimplemented MSRs are dropped.
pub fn wrmsr(state: &mut X86State) {
    let index = state.regs[gpr::RCX] as u32;
    let value = (state.regs[gpr::RAX] & 0xffff_ffff) | (state.regs[gpr::RDX] << 32);
    let m = &mut state.msr;
    let slot = match index {
        msr::SYSENTER_CS => &mut m.sysenter_cs,
        msr::SYSENTER_ESP => &mut m.sysenter_esp,
        msr::SYSENTER_EIP => &mut m.sysenter_eip,
        msr::EFER => {
            state.load_efer(value);
            return;
        }
        msr::STAR => &mut m.star,
        msr::LSTAR => &mut m.lstar,
        msr::CSTAR => &mut m.cstar,
        msr::FMASK => &mut m.fmask,
        msr::FS_BASE => &mut state.segs[SegReg::Fs as usize].base,
        msr::GS_BASE => &mut state.segs[SegReg::Gs as usize].base,
        msr::KERNEL_GS_BASE => &mut m.kernel_gs_base,
        msr::TSC_AUX => &mut m.tsc_aux,
        msr::PAT => &mut m.pat,
        msr::APIC_BASE => &mut m.apic_base,
        msr::TSC => &mut m.tsc,
        msr::TSC_ADJUST => &mut m.tsc_adjust,
        msr::TSC_DEADLINE => &mut m.tsc_deadline,
        msr::MCG_STATUS => &mut m.mcg_status,
        msr::MISC_ENABLE => &mut m.misc_enable,
        msr::FEATURE_CONTROL => &mut m.feature_control,
        msr::PERF_FIXED_COUNTER_CTRL => &mut m.fixed_ctr_ctrl,
        msr::PERF_GLOBAL_CTRL => &mut m.global_ctrl,
        msr::PERF_GLOBAL_STATUS => &mut m.global_status,
        msr::PERF_GLOBAL_OVF_CTRL => &mut m.global_ovf_ctrl,
        _ => {
            if let Some(n) =
                counter_slot(index, msr::PERF_FIXED_COUNTER0, msr::PERF_FIXED_COUNTERS)
            {
                &mut m.fixed_counters[n]
            } else if let Some(n) =
                counter_slot(index, msr::PERF_GP_COUNTER0, msr::PERF_GP_COUNTERS)
            {
                &mut m.gp_counters[n]
            } else if let Some(n) =
                counter_slot(index, msr::PERF_EVENT_SELECT0, msr::PERF_GP_COUNTERS)
            {
                &mut m.gp_event_select[n]
            } else {
                debug!(index, value, "wrmsr of unimplemented MSR ignored");
                return;
            }
        }
    };
    *slot = value;
}

/// ECX, EAX and EDX on loan to an MSR micro-operation. Dropping the guard
/// puts the caller-visible values back.
struct ScratchGprs<'a> {
    state: &'a mut X86State,
    saved: [u64; 3],
}

impl<'a> ScratchGprs<'a> {
    fn borrow(state: &'a mut X86State) -> Self {
        let saved = [
            state.regs[gpr::RCX],
            state.regs[gpr::RAX],
            state.regs[gpr::RDX],
        ];
        Self { state, saved }
    }
}

impl Deref for ScratchGprs<'_> {
    type Target = X86State;

    fn deref(&self) -> &X86State {
        self.state
    }
}

impl DerefMut for ScratchGprs<'_> {
    fn deref_mut(&mut self) -> &mut X86State {
        self.state
    }
}

impl Drop for ScratchGprs<'_> {
    fn drop(&mut self) {
        let [rcx, rax, rdx] = self.saved;
        self.state.regs[gpr::RCX] = rcx;
        self.state.regs[gpr::RAX] = rax;
        self.state.regs[gpr::RDX] = rdx;
    }
}

/// Read MSR `index` without disturbing the guest's GPRs.
pub fn read(state: &mut X86State, index: u32) -> u64 {
    let mut scratch = ScratchGprs::borrow(state);
    scratch.regs[gpr::RCX] = index as u64;
    rdmsr(&mut scratch);
    (scratch.regs[gpr::RAX] & 0xffff_ffff) | (scratch.regs[gpr::RDX] << 32)
}

/// Write MSR `index` without disturbing the guest's GPRs.
pub fn write(state: &mut X86State, index: u32, value: u64) {
    let mut scratch = ScratchGprs::borrow(state);
    scratch.regs[gpr::RCX] = index as u64;
    scratch.regs[gpr::RAX] = value & 0xffff_ffff;
    scratch.regs[gpr::RDX] = value >> 32;
    wrmsr(&mut scratch);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_gprs() -> X86State {
        let mut state = X86State::default();
        state.regs[gpr::RAX] = 0xaaaa_aaaa_aaaa_aaaa;
        state.regs[gpr::RCX] = 0xcccc_cccc_cccc_cccc;
        state.regs[gpr::RDX] = 0xdddd_dddd_dddd_dddd;
        state
    }

    #[test]
    fn micro_op_restores_gprs() {
        let mut state = state_with_gprs();
        write(&mut state, msr::LSTAR, 0xffff_8000_1234_5678);
        assert_eq!(state.msr.lstar, 0xffff_8000_1234_5678);
        assert_eq!(read(&mut state, msr::LSTAR), 0xffff_8000_1234_5678);
        assert_eq!(state.regs[gpr::RAX], 0xaaaa_aaaa_aaaa_aaaa);
        assert_eq!(state.regs[gpr::RCX], 0xcccc_cccc_cccc_cccc);
        assert_eq!(state.regs[gpr::RDX], 0xdddd_dddd_dddd_dddd);
    }

    #[test]
    fn fs_base_msr_aliases_segment_base() {
        let mut state = state_with_gprs();
        write(&mut state, msr::FS_BASE, 0x7fff_0000);
        assert_eq!(state.seg(SegReg::Fs).base, 0x7fff_0000);
    }

    #[test]
    fn counters_and_unknown_indices() {
        let mut state = state_with_gprs();
        write(&mut state, msr::PERF_GP_COUNTER0 + 3, 42);
        assert_eq!(state.msr.gp_counters[3], 42);
        write(&mut state, 0x1234_5678, 99);
        assert_eq!(read(&mut state, 0x1234_5678), 0);
    }
}
