use clap::Parser;
use regmux::arch::{Arch, Mode};
use regmux::{Args, Cpu, ReadSlot, RegisterAccess, WriteSlot};
use tracing::info;

/// Registers printed by `--dump`.
fn dump_names(arch: Arch, mode: Mode) -> Vec<String> {
    let numbered = |prefix: &str, count: usize| -> Vec<String> {
        (0..count).map(|n| format!("{prefix}{n}")).collect()
    };
    let named = |names: &[&str]| -> Vec<String> { names.iter().map(|s| s.to_string()).collect() };
    match (arch, mode) {
        (Arch::X86, Mode::Bits16) => named(&[
            "ax", "bx", "cx", "dx", "si", "di", "bp", "sp", "ip", "flags", "cs", "ds", "es",
            "ss",
        ]),
        (Arch::X86, Mode::Bits32) => named(&[
            "eax", "ebx", "ecx", "edx", "esi", "edi", "ebp", "esp", "eip", "eflags", "cs", "ds",
            "es", "ss", "fs", "gs",
        ]),
        (Arch::X86, Mode::Bits64) => {
            let mut names = named(&[
                "rax", "rbx", "rcx", "rdx", "rsi", "rdi", "rbp", "rsp",
            ]);
            names.extend((8..16).map(|n| format!("r{n}")));
            names.extend(named(&["rip", "rflags", "fs_base", "gs_base"]));
            names
        }
        (Arch::Mips, _) => {
            let mut names = numbered("r", 32);
            names.extend(named(&["hi", "lo", "pc"]));
            names
        }
        (Arch::Riscv, _) => {
            let mut names = numbered("x", 32);
            names.push("pc".into());
            names
        }
        (Arch::Sparc, _) => {
            let mut names = Vec::new();
            for prefix in ["g", "o", "l", "i"] {
                names.extend(numbered(prefix, 8));
            }
            names.extend(named(&["pc", "npc"]));
            names
        }
        (Arch::S390x, _) => {
            let mut names = numbered("r", 16);
            names.extend(named(&["pc", "pswm"]));
            names
        }
        (Arch::Rh850, _) => {
            let mut names = numbered("r", 32);
            names.extend(named(&["pc", "psw", "eipc", "fepc"]));
            names
        }
    }
}

/// Most significant byte first.
fn format_value(bytes: &[u8]) -> String {
    let digits: String = bytes.iter().rev().map(|b| format!("{b:02x}")).collect();
    format!("0x{digits}")
}

fn apply_writes(cpu: &mut Cpu, args: &Args) -> Result<(), String> {
    if args.set.is_empty() {
        return Ok(());
    }
    let mut buffers = Vec::with_capacity(args.set.len());
    for assignment in &args.set {
        let id = args.resolve(&assignment.name)?;
        let width = cpu
            .register_width(id)
            .ok_or_else(|| format!("{} is not available in this mode", assignment.name))?;
        if width > 8 {
            return Err(format!("{} is not a scalar register", assignment.name));
        }
        let value = assignment.value.to_le_bytes();
        if width < 8 && assignment.value >> (width * 8) != 0 {
            return Err(format!(
                "{:#x} does not fit in {} ({} bytes)",
                assignment.value, assignment.name, width
            ));
        }
        buffers.push((id, value[..width].to_vec()));
    }

    let slots: Vec<WriteSlot<'_>> = buffers
        .iter()
        .map(|(id, bytes)| WriteSlot::new(*id, bytes))
        .collect();
    let outcome = cpu.reg_write(&slots).map_err(|e| {
        let name = &args.set[e.index].name;
        format!("writing {name}: {}", e.source)
    })?;
    info!(count = slots.len(), pc_changed = outcome.pc_changed, "registers written");
    Ok(())
}

fn read_and_print(cpu: &mut Cpu, args: &Args, names: &[String]) -> Result<(), String> {
    let mut requests = Vec::with_capacity(names.len());
    for name in names {
        let id = args.resolve(name)?;
        let width = cpu
            .register_width(id)
            .ok_or_else(|| format!("{name} is not available in this mode"))?;
        requests.push((id, vec![0u8; width]));
    }

    let mut slots: Vec<ReadSlot<'_>> = requests
        .iter_mut()
        .map(|(id, bytes)| ReadSlot::new(*id, bytes))
        .collect();
    cpu.reg_read(&mut slots)
        .map_err(|e| format!("reading {}: {}", names[e.index], e.source))?;
    drop(slots);

    for (name, (_, bytes)) in names.iter().zip(&requests) {
        println!("{name:>8} = {}", format_value(bytes));
    }
    Ok(())
}

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = args.to_cpu_config();
    let mut cpu = match Cpu::new(config) {
        Ok(cpu) => cpu,
        Err(e) => {
            eprintln!("Failed to create cpu: {}", e);
            std::process::exit(2);
        }
    };
    info!(pc = cpu.pc(), "cpu reset");

    if let Err(e) = apply_writes(&mut cpu, &args) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let mut names = args.get.clone();
    if args.dump {
        names.extend(dump_names(config.arch, config.mode));
    }
    if let Err(e) = read_and_print(&mut cpu, &args, &names) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    if cpu.exit_latch().take() {
        info!(pc = cpu.pc(), "program counter moved");
    }
}
