//! The register API shared by live CPUs and saved contexts.

use crate::arch::{Arch, Mode};
use crate::arch::x86::X86Reg;
use crate::batch::{ReadSlot, WriteOutcome, WriteSlot};
use crate::error::{BatchError, RegError};
use crate::value::{MAX_WIDTH, RegValue, X86Msr};

/// Register access by numeric identifier.
///
/// Implementors only provide the two batch operations; the typed helpers
/// are single-element batches.
pub trait RegisterAccess {
    fn arch(&self) -> Arch;

    fn mode(&self) -> Mode;

    fn reg_read(&mut self, slots: &mut [ReadSlot<'_>]) -> Result<(), BatchError>;

    fn reg_write(&mut self, slots: &[WriteSlot<'_>]) -> Result<WriteOutcome, BatchError>;

    /// Canonical width of `id` in the current mode, `None` if it does not exist.
    fn register_width(&self, id: u32) -> Option<usize>;

    fn read<T: RegValue>(&mut self, id: impl Into<u32>) -> Result<T, RegError>
    where
        Self: Sized,
    {
        let mut buf = [0u8; MAX_WIDTH];
        read_into(self, id.into(), &mut buf[..T::WIDTH])?;
        Ok(T::decode(&buf[..T::WIDTH]))
    }

    fn write<T: RegValue>(&mut self, id: impl Into<u32>, value: T) -> Result<WriteOutcome, RegError>
    where
        Self: Sized,
    {
        let mut buf = [0u8; MAX_WIDTH];
        value.encode(&mut buf[..T::WIDTH]);
        self.reg_write(&[WriteSlot::new(id, &buf[..T::WIDTH])])
            .map_err(|err| err.source)
    }

    /// x86 only: read model-specific register `index`.
    fn read_msr(&mut self, index: u32) -> Result<u64, RegError>
    where
        Self: Sized,
    {
        self.require_x86()?;
        let mut buf = [0u8; X86Msr::WIDTH];
        X86Msr::new(index, 0).encode(&mut buf);
        read_into(self, X86Reg::Msr.id(), &mut buf)?;
        Ok(X86Msr::decode(&buf).value)
    }

    /// x86 only: write model-specific register `index`.
    fn write_msr(&mut self, index: u32, value: u64) -> Result<(), RegError>
    where
        Self: Sized,
    {
        self.require_x86()?;
        self.write(X86Reg::Msr, X86Msr::new(index, value))?;
        Ok(())
    }

    #[doc(hidden)]
    fn require_x86(&self) -> Result<(), RegError> {
        if self.arch() == Arch::X86 {
            Ok(())
        } else {
            Err(RegError::UnknownRegister {
                id: X86Reg::Msr.id(),
                mode: self.mode(),
            })
        }
    }
}

fn read_into<A: RegisterAccess>(access: &mut A, id: u32, buf: &mut [u8]) -> Result<(), RegError> {
    access
        .reg_read(&mut [ReadSlot::new(id, buf)])
        .map_err(|err| err.source)
}
