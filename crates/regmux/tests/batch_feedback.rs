use regmux::arch::mips::MipsReg;
use regmux::arch::x86::X86Reg;
use regmux::arch::{Arch, Mode};
use regmux::{Cpu, CpuConfig, ReadSlot, RegError, RegisterAccess, WriteSlot};

fn x86_64() -> Cpu {
    Cpu::new(CpuConfig::default()).unwrap()
}

#[test]
fn failed_batch_keeps_earlier_writes() {
    let mut cpu = x86_64();
    let values: Vec<[u8; 8]> = (1..=5u64).map(|v| v.to_le_bytes()).collect();
    let ids = [X86Reg::Rax, X86Reg::Rbx, X86Reg::Rcx, X86Reg::Rdx, X86Reg::Rsi];
    let mut slots: Vec<WriteSlot<'_>> = ids
        .iter()
        .zip(&values)
        .map(|(&id, bytes)| WriteSlot::new(id, bytes))
        .collect();
    // element 2 is not a 64-bit mode register
    slots[2] = WriteSlot::new(X86Reg::Cr8, &values[2]);

    let err = cpu.reg_write(&slots).unwrap_err();
    assert_eq!(err.index, 2);
    assert_eq!(err.id, X86Reg::Cr8.id());
    assert!(matches!(err.source, RegError::UnknownRegister { .. }));

    assert_eq!(cpu.read::<u64>(X86Reg::Rax).unwrap(), 1);
    assert_eq!(cpu.read::<u64>(X86Reg::Rbx).unwrap(), 2);
    assert_eq!(cpu.read::<u64>(X86Reg::Rdx).unwrap(), 0);
    assert_eq!(cpu.read::<u64>(X86Reg::Rsi).unwrap(), 0);
}

#[test]
fn failed_read_batch_reports_index() {
    let mut cpu = x86_64();
    let mut a = [0u8; 8];
    let mut b = [0u8; 3];
    let mut c = [0xffu8; 8];
    let err = cpu
        .reg_read(&mut [
            ReadSlot::new(X86Reg::Rax, &mut a),
            ReadSlot::new(X86Reg::Rbx, &mut b),
            ReadSlot::new(X86Reg::Rcx, &mut c),
        ])
        .unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(c, [0xff; 8], "later elements are not touched");
}

#[test]
fn pc_write_raises_exactly_one_request() {
    let mut cpu = x86_64();
    let latch = cpu.exit_latch();

    let rip = 0x1000u64.to_le_bytes();
    let rax = 7u64.to_le_bytes();
    let outcome = cpu
        .reg_write(&[
            WriteSlot::new(X86Reg::Rip, &rip),
            WriteSlot::new(X86Reg::Rax, &rax),
            WriteSlot::new(X86Reg::Eip, &[0, 0x20, 0, 0]),
        ])
        .unwrap();
    assert!(outcome.pc_changed);
    assert_eq!(latch.raised_count(), 1);
    assert!(latch.take());
    assert!(!latch.take());
    assert_eq!(cpu.pc(), 0x2000);
}

#[test]
fn other_writes_never_raise() {
    let mut cpu = x86_64();
    let latch = cpu.exit_latch();
    let outcome = cpu.write(X86Reg::Rsp, 0x8000u64).unwrap();
    assert!(!outcome.pc_changed);
    cpu.write(X86Reg::Xmm0, [1u64, 2]).unwrap();
    cpu.read::<u64>(X86Reg::Rip).unwrap();
    assert_eq!(latch.raised_count(), 0);
    assert!(!latch.is_pending());
}

#[test]
fn committed_pc_write_raises_even_when_batch_fails() {
    let mut cpu = x86_64();
    let latch = cpu.exit_latch();
    let rip = 0x4000u64.to_le_bytes();
    let err = cpu
        .reg_write(&[
            WriteSlot::new(X86Reg::Rip, &rip),
            WriteSlot::new(X86Reg::Rax, &[1, 2]),
        ])
        .unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(cpu.pc(), 0x4000);
    assert!(latch.take());
}

#[test]
fn snapshot_pc_write_does_not_raise() {
    let mut cpu = x86_64();
    let latch = cpu.exit_latch();
    let mut context = cpu.save_context();
    let outcome = context.write(X86Reg::Rip, 0xdead_0000u64).unwrap();
    assert!(outcome.pc_changed);
    assert_eq!(context.pc(), 0xdead_0000);
    assert_eq!(latch.raised_count(), 0);
    assert_eq!(cpu.pc(), 0);
}

#[test]
fn every_architecture_signals_pc_writes() {
    let configs = [
        (Arch::Mips, Mode::Bits32, MipsReg::Pc.id(), 4),
        (Arch::Riscv, Mode::Bits64, regmux::arch::riscv::RiscvReg::Pc.id(), 8),
        (Arch::Sparc, Mode::Bits32, regmux::arch::sparc::SparcReg::Pc.id(), 4),
        (Arch::S390x, Mode::Bits64, regmux::arch::s390x::S390xReg::Pc.id(), 8),
        (Arch::Rh850, Mode::Bits32, regmux::arch::rh850::Rh850Reg::Pc.id(), 4),
    ];
    for (arch, mode, pc, width) in configs {
        let mut cpu = Cpu::new(CpuConfig { arch, mode }).unwrap();
        let latch = cpu.exit_latch();
        let value = 0x1000u64.to_le_bytes();
        cpu.reg_write(&[WriteSlot::new(pc, &value[..width])]).unwrap();
        assert!(latch.take(), "{arch}");
        assert_eq!(cpu.pc(), 0x1000, "{arch}");
    }
}
