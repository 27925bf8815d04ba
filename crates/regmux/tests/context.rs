use regmux::arch::riscv::RiscvReg;
use regmux::arch::sparc::SparcReg;
use regmux::arch::x86::{SegReg, X86Reg};
use regmux::arch::{Arch, Mode};
use regmux::{Context, ContextError, Cpu, CpuConfig, FlatMemory, RegisterAccess, WriteSlot, X86Mmr};
use regmux_hw::x86::desc;

#[test]
fn save_modify_restore() {
    let mut cpu = Cpu::new(CpuConfig::default()).unwrap();
    cpu.write(X86Reg::Rdi, 0x1111u64).unwrap();
    cpu.write(X86Reg::Rip, 0x40_1000u64).unwrap();
    let saved = cpu.save_context();

    cpu.write(X86Reg::Rdi, 0x2222u64).unwrap();
    cpu.write(X86Reg::Rip, 0x50_0000u64).unwrap();
    cpu.exit_latch().take();

    cpu.restore_context(&saved).unwrap();
    assert_eq!(cpu.read::<u64>(X86Reg::Rdi).unwrap(), 0x1111);
    assert_eq!(cpu.pc(), 0x40_1000);
    assert!(cpu.exit_latch().take(), "restoring moves the PC");
}

#[test]
fn restore_into_another_architecture_fails() {
    let riscv = Cpu::new(CpuConfig {
        arch: Arch::Riscv,
        mode: Mode::Bits64,
    })
    .unwrap();
    let mut x86 = Cpu::new(CpuConfig::default()).unwrap();
    let err = x86.restore_context(&riscv.save_context()).unwrap_err();
    assert_eq!(
        err,
        ContextError::Mismatch {
            saved_arch: Arch::Riscv,
            saved_mode: Mode::Bits64,
            arch: Arch::X86,
            mode: Mode::Bits64,
        }
    );
}

#[test]
fn context_serializes() {
    let mut cpu = Cpu::new(CpuConfig {
        arch: Arch::Riscv,
        mode: Mode::Bits32,
    })
    .unwrap();
    cpu.write(RiscvReg::X10, 0xcafeu32).unwrap();
    cpu.write(RiscvReg::Mscratch, 0x8000_0000u32).unwrap();
    let context = cpu.save_context();

    let json = serde_json::to_string(&context).unwrap();
    let mut back: Context = serde_json::from_str(&json).unwrap();
    assert_eq!(back, context);
    assert_eq!(back.read::<u32>(RiscvReg::X10).unwrap(), 0xcafe);
    assert_eq!(back.read::<u32>(RiscvReg::Mscratch).unwrap(), 0x8000_0000);
    assert_eq!(back.register_width(RiscvReg::Cycleh.id()), Some(4));
}

#[test]
fn context_selector_load_uses_supplied_memory() {
    let cpu = Cpu::new(CpuConfig {
        arch: Arch::X86,
        mode: Mode::Bits32,
    })
    .unwrap();
    let mut context = cpu.save_context();
    let gdtr = X86Mmr {
        base: 0x100,
        limit: 15,
        ..X86Mmr::default()
    };
    context.write(X86Reg::Gdtr, gdtr).unwrap();

    // the cpu was created without memory, so neither path can fetch it
    assert!(context.write(X86Reg::Gs, 0x08u16).is_err());

    let mut memory = FlatMemory::new(0, 0x200);
    let high = desc::P | desc::S | desc::W | 0x000f_0000;
    memory.write(0x108, &0xffffu32.to_le_bytes()).unwrap();
    memory.write(0x10c, &high.to_le_bytes()).unwrap();
    context
        .reg_write_with_memory(&memory, &[WriteSlot::new(X86Reg::Gs, &[0x08, 0])])
        .unwrap();
    let gs = context.record().as_x86().unwrap().seg(SegReg::Gs);
    assert_eq!(gs.selector, 0x08);
    assert_eq!(gs.limit, 0xfffff);
}

fn gdt_with_data_segment() -> FlatMemory {
    let mut memory = FlatMemory::new(0, 0x200);
    let high = desc::P | desc::S | desc::W | 0x000f_0000;
    memory.write(0x108, &0xffffu32.to_le_bytes()).unwrap();
    memory.write(0x10c, &high.to_le_bytes()).unwrap();
    memory
}

#[test]
fn saved_context_loads_selectors_like_the_cpu() {
    let mut cpu = Cpu::new(CpuConfig {
        arch: Arch::X86,
        mode: Mode::Bits32,
    })
    .unwrap();
    cpu.set_memory(gdt_with_data_segment());
    let gdtr = X86Mmr {
        base: 0x100,
        limit: 15,
        ..X86Mmr::default()
    };
    cpu.write(X86Reg::Gdtr, gdtr).unwrap();
    let mut context = cpu.save_context();

    let live = cpu.write(X86Reg::Ds, 0x08u16);
    let saved = context.write(X86Reg::Ds, 0x08u16);
    assert_eq!(live, saved);
    assert!(live.is_ok());

    let live_ds = cpu.state().as_x86().unwrap().seg(SegReg::Ds);
    let saved_ds = context.record().as_x86().unwrap().seg(SegReg::Ds);
    assert_eq!(live_ds, saved_ds);
    assert_eq!(saved_ds.limit, 0xfffff);
}

#[test]
fn deserialized_context_needs_memory_attached() {
    let mut cpu = Cpu::with_memory(
        CpuConfig {
            arch: Arch::X86,
            mode: Mode::Bits32,
        },
        gdt_with_data_segment(),
    )
    .unwrap();
    cpu.write(
        X86Reg::Gdtr,
        X86Mmr {
            base: 0x100,
            limit: 15,
            ..X86Mmr::default()
        },
    )
    .unwrap();
    let json = serde_json::to_string(&cpu.save_context()).unwrap();

    let mut context: Context = serde_json::from_str(&json).unwrap();
    assert!(context.write(X86Reg::Es, 0x08u16).is_err());
    context.set_memory(gdt_with_data_segment());
    context.write(X86Reg::Es, 0x08u16).unwrap();
    assert_eq!(context.record().as_x86().unwrap().seg(SegReg::Es).selector, 0x08);
}

#[test]
fn truncated_register_windows_are_rejected() {
    let mut cpu = Cpu::new(CpuConfig {
        arch: Arch::Sparc,
        mode: Mode::Bits32,
    })
    .unwrap();
    cpu.write(SparcReg::O3, 0xdead_beefu32).unwrap();
    let mut json = serde_json::to_value(cpu.save_context()).unwrap();

    let back: Context = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(back.record(), cpu.state());

    json["record"]["Sparc"]["windows"] = serde_json::json!([]);
    let err = serde_json::from_value::<Context>(json).unwrap_err();
    assert!(err.to_string().contains("register window file"), "{err}");
}
