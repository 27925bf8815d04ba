use crate::CpuConfig;
use crate::arch::{Arch, Mode};
use clap::Parser;

/// Set and inspect the registers of a freshly reset CPU.
#[derive(Parser, Debug, Clone)]
pub struct Args {
    /// Architecture to instantiate
    #[arg(long, value_enum, default_value_t = Arch::X86)]
    pub arch: Arch,

    /// Execution mode in bits (16, 32 or 64). Defaults to the widest mode
    /// the architecture supports.
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<Mode>,

    /// Register assignment NAME=VALUE (hex: 0x1234 or decimal: 1234).
    /// All assignments are written as one batch, in order.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<Assignment>,

    /// Register to read back after the writes. May be repeated.
    #[arg(long = "get", value_name = "NAME")]
    pub get: Vec<String>,

    /// Print the general purpose registers and the program counter
    #[arg(long)]
    pub dump: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: u64,
}

impl Args {
    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or(match self.arch {
            Arch::Sparc | Arch::Rh850 => Mode::Bits32,
            _ => Mode::Bits64,
        })
    }

    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        let mode = self.mode();
        if !self.arch.supports(mode) {
            return Err(format!("{} does not support {} mode", self.arch, mode));
        }
        for name in self.set.iter().map(|a| &a.name).chain(&self.get) {
            self.resolve(name)?;
        }
        Ok(())
    }

    /// Register identifier for `name` on the selected architecture.
    pub fn resolve(&self, name: &str) -> Result<u32, String> {
        self.arch
            .register_by_name(name)
            .ok_or_else(|| format!("{} has no register named {:?}", self.arch, name))
    }

    /// Convert Args to CpuConfig
    pub fn to_cpu_config(&self) -> CpuConfig {
        CpuConfig {
            arch: self.arch,
            mode: self.mode(),
        }
    }
}

pub fn parse_hex_or_dec(s: &str) -> Result<u64, std::num::ParseIntError> {
    if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse()
    }
}

pub fn parse_mode(s: &str) -> Result<Mode, String> {
    match s.trim_end_matches("-bit") {
        "16" => Ok(Mode::Bits16),
        "32" => Ok(Mode::Bits32),
        "64" => Ok(Mode::Bits64),
        other => Err(format!("unknown mode {other:?}, expected 16, 32 or 64")),
    }
}

pub fn parse_assignment(s: &str) -> Result<Assignment, String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {s:?}"))?;
    let value = parse_hex_or_dec(value.trim()).map_err(|e| format!("{value:?}: {e}"))?;
    Ok(Assignment {
        name: name.trim().to_string(),
        value,
    })
}
