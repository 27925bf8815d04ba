pub mod access;
pub mod arch;
pub mod args;
pub mod batch;
pub mod context;
pub mod core;
pub mod error;
pub mod feedback;
pub mod memory;
mod regid;
pub mod value;

// Re-export commonly used types
pub use access::RegisterAccess;
pub use args::Args;
pub use arch::{Arch, Mode, StateRecord};
pub use batch::{ReadSlot, WriteOutcome, WriteSlot};
pub use context::Context;
pub use crate::core::{Cpu, CpuConfig};
pub use error::{BatchError, ConfigError, ContextError, ErrorKind, RegError};
pub use feedback::ExitLatch;
pub use memory::{FlatMemory, GuestMemory, MemoryFault, NoMemory};
pub use value::{Fp80, RegValue, ValueCell, ValueRef, X86Mmr, X86Msr};
