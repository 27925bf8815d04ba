use proptest::prelude::*;
use regmux::arch::x86::X86Reg;
use regmux::arch::{Arch, Mode};
use regmux::{Cpu, CpuConfig, ReadSlot, RegisterAccess, WriteSlot};

fn x86(mode: Mode) -> Cpu {
    Cpu::new(CpuConfig {
        arch: Arch::X86,
        mode,
    })
    .unwrap()
}

/// (view, byte offset in the 64-bit slot, width)
const RAX_VIEWS: [(X86Reg, usize, usize); 5] = [
    (X86Reg::Al, 0, 1),
    (X86Reg::Ah, 1, 1),
    (X86Reg::Ax, 0, 2),
    (X86Reg::Eax, 0, 4),
    (X86Reg::Rax, 0, 8),
];

/// Plain storage registers: whatever goes in comes back out.
const PLAIN_64: [X86Reg; 12] = [
    X86Reg::Rbx,
    X86Reg::R13,
    X86Reg::R10d,
    X86Reg::Bpl,
    X86Reg::Dr3,
    X86Reg::Cr2,
    X86Reg::Xmm12,
    X86Reg::Ymm7,
    X86Reg::Fip,
    X86Reg::Fop,
    X86Reg::Fp4,
    X86Reg::GsBase,
];

proptest! {
    #[test]
    fn narrow_write_preserves_other_bytes(
        initial in any::<u64>(),
        view in 0..RAX_VIEWS.len(),
        bytes in prop::array::uniform8(any::<u8>()),
    ) {
        let (reg, offset, width) = RAX_VIEWS[view];
        let mut cpu = x86(Mode::Bits64);
        cpu.write(X86Reg::Rax, initial).unwrap();
        cpu.reg_write(&[WriteSlot::new(reg, &bytes[..width])]).unwrap();

        let after = cpu.read::<u64>(X86Reg::Rax).unwrap().to_le_bytes();
        let before = initial.to_le_bytes();
        for i in 0..8 {
            if i >= offset && i < offset + width {
                prop_assert_eq!(after[i], bytes[i - offset]);
            } else {
                prop_assert_eq!(after[i], before[i]);
            }
        }
    }

    #[test]
    fn plain_registers_round_trip(
        reg in 0..PLAIN_64.len(),
        bytes in prop::collection::vec(any::<u8>(), 32),
    ) {
        let reg = PLAIN_64[reg];
        let mut cpu = x86(Mode::Bits64);
        let width = cpu.register_width(reg.id()).unwrap();
        cpu.reg_write(&[WriteSlot::new(reg, &bytes[..width])]).unwrap();

        let mut back = vec![0u8; width];
        cpu.reg_read(&mut [ReadSlot::new(reg, &mut back)]).unwrap();
        prop_assert_eq!(&back[..], &bytes[..width]);
    }

    #[test]
    fn batch_applies_prefix_before_failure(
        values in prop::collection::vec(any::<u32>(), 1..8),
        bad in any::<prop::sample::Index>(),
    ) {
        let regs = [
            X86Reg::Eax, X86Reg::Ebx, X86Reg::Ecx, X86Reg::Edx,
            X86Reg::Esi, X86Reg::Edi, X86Reg::Ebp, X86Reg::Esp,
        ];
        let bad = bad.index(values.len());
        let encoded: Vec<[u8; 4]> = values.iter().map(|v| v.to_le_bytes()).collect();
        let slots: Vec<WriteSlot<'_>> = encoded
            .iter()
            .enumerate()
            .map(|(i, bytes)| {
                if i == bad {
                    WriteSlot::new(X86Reg::Rax, &bytes[..])
                } else {
                    WriteSlot::new(regs[i], &bytes[..])
                }
            })
            .collect();

        let mut cpu = x86(Mode::Bits32);
        let err = cpu.reg_write(&slots).unwrap_err();
        prop_assert_eq!(err.index, bad);
        for (i, value) in values.iter().enumerate() {
            let got = cpu.read::<u32>(regs[i]).unwrap();
            if i < bad {
                prop_assert_eq!(got, *value);
            } else {
                prop_assert_eq!(got, 0);
            }
        }
    }

    #[test]
    fn sixteen_bit_pc_round_trips(cs in any::<u16>(), offset in any::<u16>()) {
        let mut cpu = x86(Mode::Bits16);
        cpu.write(X86Reg::Cs, cs).unwrap();
        cpu.write(X86Reg::Ip, offset).unwrap();
        let pc = cpu.pc();
        prop_assert_eq!(pc, ((cs as u64) << 4) + offset as u64);
        cpu.set_pc(pc);
        prop_assert_eq!(cpu.read::<u16>(X86Reg::Ip).unwrap(), offset);
    }
}
