//! RISC-V register identifiers.

use crate::regid::{family_index, register_ids};
use regmux_hw::riscv::csr;

/// hpmcounter3 through hpmcounter31
const HPM_COUNTERS: usize = 29;

register_ids! {
    pub enum RiscvReg {
        Invalid = "invalid",
        X0 = "x0",
        X1 = "x1",
        X2 = "x2",
        X3 = "x3",
        X4 = "x4",
        X5 = "x5",
        X6 = "x6",
        X7 = "x7",
        X8 = "x8",
        X9 = "x9",
        X10 = "x10",
        X11 = "x11",
        X12 = "x12",
        X13 = "x13",
        X14 = "x14",
        X15 = "x15",
        X16 = "x16",
        X17 = "x17",
        X18 = "x18",
        X19 = "x19",
        X20 = "x20",
        X21 = "x21",
        X22 = "x22",
        X23 = "x23",
        X24 = "x24",
        X25 = "x25",
        X26 = "x26",
        X27 = "x27",
        X28 = "x28",
        X29 = "x29",
        X30 = "x30",
        X31 = "x31",
        Ustatus = "ustatus",
        Uie = "uie",
        Utvec = "utvec",
        Uscratch = "uscratch",
        Uepc = "uepc",
        Ucause = "ucause",
        Utval = "utval",
        Uip = "uip",
        Fflags = "fflags",
        Frm = "frm",
        Fcsr = "fcsr",
        Cycle = "cycle",
        Time = "time",
        Instret = "instret",
        Hpmcounter3 = "hpmcounter3",
        Hpmcounter4 = "hpmcounter4",
        Hpmcounter5 = "hpmcounter5",
        Hpmcounter6 = "hpmcounter6",
        Hpmcounter7 = "hpmcounter7",
        Hpmcounter8 = "hpmcounter8",
        Hpmcounter9 = "hpmcounter9",
        Hpmcounter10 = "hpmcounter10",
        Hpmcounter11 = "hpmcounter11",
        Hpmcounter12 = "hpmcounter12",
        Hpmcounter13 = "hpmcounter13",
        Hpmcounter14 = "hpmcounter14",
        Hpmcounter15 = "hpmcounter15",
        Hpmcounter16 = "hpmcounter16",
        Hpmcounter17 = "hpmcounter17",
        Hpmcounter18 = "hpmcounter18",
        Hpmcounter19 = "hpmcounter19",
        Hpmcounter20 = "hpmcounter20",
        Hpmcounter21 = "hpmcounter21",
        Hpmcounter22 = "hpmcounter22",
        Hpmcounter23 = "hpmcounter23",
        Hpmcounter24 = "hpmcounter24",
        Hpmcounter25 = "hpmcounter25",
        Hpmcounter26 = "hpmcounter26",
        Hpmcounter27 = "hpmcounter27",
        Hpmcounter28 = "hpmcounter28",
        Hpmcounter29 = "hpmcounter29",
        Hpmcounter30 = "hpmcounter30",
        Hpmcounter31 = "hpmcounter31",
        Cycleh = "cycleh",
        Timeh = "timeh",
        Instreth = "instreth",
        Hpmcounter3h = "hpmcounter3h",
        Hpmcounter4h = "hpmcounter4h",
        Hpmcounter5h = "hpmcounter5h",
        Hpmcounter6h = "hpmcounter6h",
        Hpmcounter7h = "hpmcounter7h",
        Hpmcounter8h = "hpmcounter8h",
        Hpmcounter9h = "hpmcounter9h",
        Hpmcounter10h = "hpmcounter10h",
        Hpmcounter11h = "hpmcounter11h",
        Hpmcounter12h = "hpmcounter12h",
        Hpmcounter13h = "hpmcounter13h",
        Hpmcounter14h = "hpmcounter14h",
        Hpmcounter15h = "hpmcounter15h",
        Hpmcounter16h = "hpmcounter16h",
        Hpmcounter17h = "hpmcounter17h",
        Hpmcounter18h = "hpmcounter18h",
        Hpmcounter19h = "hpmcounter19h",
        Hpmcounter20h = "hpmcounter20h",
        Hpmcounter21h = "hpmcounter21h",
        Hpmcounter22h = "hpmcounter22h",
        Hpmcounter23h = "hpmcounter23h",
        Hpmcounter24h = "hpmcounter24h",
        Hpmcounter25h = "hpmcounter25h",
        Hpmcounter26h = "hpmcounter26h",
        Hpmcounter27h = "hpmcounter27h",
        Hpmcounter28h = "hpmcounter28h",
        Hpmcounter29h = "hpmcounter29h",
        Hpmcounter30h = "hpmcounter30h",
        Hpmcounter31h = "hpmcounter31h",
        Mcycle = "mcycle",
        Minstret = "minstret",
        Mcycleh = "mcycleh",
        Minstreth = "minstreth",
        Mvendorid = "mvendorid",
        Marchid = "marchid",
        Mimpid = "mimpid",
        Mhartid = "mhartid",
        Mstatus = "mstatus",
        Misa = "misa",
        Medeleg = "medeleg",
        Mideleg = "mideleg",
        Mie = "mie",
        Mtvec = "mtvec",
        Mcounteren = "mcounteren",
        Mstatush = "mstatush",
        Mucounteren = "mucounteren",
        Mscounteren = "mscounteren",
        Mhcounteren = "mhcounteren",
        Mscratch = "mscratch",
        Mepc = "mepc",
        Mcause = "mcause",
        Mtval = "mtval",
        Mip = "mip",
        Mbadaddr = "mbadaddr",
        Sstatus = "sstatus",
        Sedeleg = "sedeleg",
        Sideleg = "sideleg",
        Sie = "sie",
        Stvec = "stvec",
        Scounteren = "scounteren",
        Sscratch = "sscratch",
        Sepc = "sepc",
        Scause = "scause",
        Stval = "stval",
        Sip = "sip",
        Sbadaddr = "sbadaddr",
        Sptbr = "sptbr",
        Satp = "satp",
        Hstatus = "hstatus",
        Hedeleg = "hedeleg",
        Hideleg = "hideleg",
        Hie = "hie",
        Hcounteren = "hcounteren",
        Htval = "htval",
        Hip = "hip",
        Htinst = "htinst",
        Hgatp = "hgatp",
        Htimedelta = "htimedelta",
        Htimedeltah = "htimedeltah",
        F0 = "f0",
        F1 = "f1",
        F2 = "f2",
        F3 = "f3",
        F4 = "f4",
        F5 = "f5",
        F6 = "f6",
        F7 = "f7",
        F8 = "f8",
        F9 = "f9",
        F10 = "f10",
        F11 = "f11",
        F12 = "f12",
        F13 = "f13",
        F14 = "f14",
        F15 = "f15",
        F16 = "f16",
        F17 = "f17",
        F18 = "f18",
        F19 = "f19",
        F20 = "f20",
        F21 = "f21",
        F22 = "f22",
        F23 = "f23",
        F24 = "f24",
        F25 = "f25",
        F26 = "f26",
        F27 = "f27",
        F28 = "f28",
        F29 = "f29",
        F30 = "f30",
        F31 = "f31",
        Pc = "pc",
    }
}

impl RiscvReg {
    /// Architectural CSR number of a CSR identifier. Retired names share the
    /// number of their successor.
    pub fn csr_number(self) -> Option<u16> {
        use RiscvReg as R;
        let id = self.id();
        if let Some(n) = family_index(id, R::Hpmcounter3, HPM_COUNTERS) {
            return Some(csr::HPMCOUNTER3 + n as u16);
        }
        if let Some(n) = family_index(id, R::Hpmcounter3h, HPM_COUNTERS) {
            return Some(csr::HPMCOUNTER3H + n as u16);
        }
        let number = match self {
            R::Ustatus => csr::USTATUS,
            R::Uie => csr::UIE,
            R::Utvec => csr::UTVEC,
            R::Uscratch => csr::USCRATCH,
            R::Uepc => csr::UEPC,
            R::Ucause => csr::UCAUSE,
            R::Utval => csr::UTVAL,
            R::Uip => csr::UIP,
            R::Fflags => csr::FFLAGS,
            R::Frm => csr::FRM,
            R::Fcsr => csr::FCSR,
            R::Cycle => csr::CYCLE,
            R::Time => csr::TIME,
            R::Instret => csr::INSTRET,
            R::Cycleh => csr::CYCLEH,
            R::Timeh => csr::TIMEH,
            R::Instreth => csr::INSTRETH,
            R::Mcycle => csr::MCYCLE,
            R::Minstret => csr::MINSTRET,
            R::Mcycleh => csr::MCYCLEH,
            R::Minstreth => csr::MINSTRETH,
            R::Mvendorid => csr::MVENDORID,
            R::Marchid => csr::MARCHID,
            R::Mimpid => csr::MIMPID,
            R::Mhartid => csr::MHARTID,
            R::Mstatus => csr::MSTATUS,
            R::Misa => csr::MISA,
            R::Medeleg => csr::MEDELEG,
            R::Mideleg => csr::MIDELEG,
            R::Mie => csr::MIE,
            R::Mtvec => csr::MTVEC,
            R::Mcounteren => csr::MCOUNTEREN,
            R::Mstatush => csr::MSTATUSH,
            R::Mucounteren => csr::MUCOUNTEREN,
            R::Mscounteren => csr::MSCOUNTEREN,
            R::Mhcounteren => csr::MHCOUNTEREN,
            R::Mscratch => csr::MSCRATCH,
            R::Mepc => csr::MEPC,
            R::Mcause => csr::MCAUSE,
            R::Mtval => csr::MTVAL,
            R::Mip => csr::MIP,
            R::Mbadaddr => csr::MBADADDR,
            R::Sstatus => csr::SSTATUS,
            R::Sedeleg => csr::SEDELEG,
            R::Sideleg => csr::SIDELEG,
            R::Sie => csr::SIE,
            R::Stvec => csr::STVEC,
            R::Scounteren => csr::SCOUNTEREN,
            R::Sscratch => csr::SSCRATCH,
            R::Sepc => csr::SEPC,
            R::Scause => csr::SCAUSE,
            R::Stval => csr::STVAL,
            R::Sip => csr::SIP,
            R::Sbadaddr => csr::SBADADDR,
            R::Sptbr => csr::SPTBR,
            R::Satp => csr::SATP,
            R::Hstatus => csr::HSTATUS,
            R::Hedeleg => csr::HEDELEG,
            R::Hideleg => csr::HIDELEG,
            R::Hie => csr::HIE,
            R::Hcounteren => csr::HCOUNTEREN,
            R::Htval => csr::HTVAL,
            R::Hip => csr::HIP,
            R::Htinst => csr::HTINST,
            R::Hgatp => csr::HGATP,
            R::Htimedelta => csr::HTIMEDELTA,
            R::Htimedeltah => csr::HTIMEDELTAH,
            _ => return None,
        };
        Some(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_families_follow_the_base_number() {
        assert_eq!(RiscvReg::Hpmcounter3.csr_number(), Some(csr::HPMCOUNTER3));
        assert_eq!(RiscvReg::Hpmcounter31.csr_number(), Some(csr::HPMCOUNTER31));
        assert_eq!(RiscvReg::Hpmcounter31h.csr_number(), Some(csr::HPMCOUNTER31H));
        assert_eq!(RiscvReg::Cycleh.csr_number(), Some(csr::CYCLEH));
    }

    #[test]
    fn every_csr_identifier_has_a_number() {
        let first = RiscvReg::Ustatus.id();
        let last = RiscvReg::Htimedeltah.id();
        for reg in RiscvReg::ALL.iter().filter(|r| (first..=last).contains(&r.id())) {
            assert!(reg.csr_number().is_some(), "{reg}");
        }
        assert_eq!(RiscvReg::X1.csr_number(), None);
        assert_eq!(RiscvReg::F1.csr_number(), None);
        assert_eq!(RiscvReg::Pc.csr_number(), None);
    }
}
