//! Batched register access.
//!
//! A batch is applied element by element in caller order. It is not a
//! transaction: the first failing element stops the batch, and every element
//! before it stays applied.

use crate::arch::{AccessEnv, RegisterFile};
use crate::error::BatchError;
use crate::value::{ValueCell, ValueRef};

/// One register to read, and where to put it.
#[derive(Debug)]
pub struct ReadSlot<'a> {
    pub id: u32,
    pub cell: ValueCell<'a>,
}

impl<'a> ReadSlot<'a> {
    /// `bytes.len()` is the declared size.
    pub fn new(id: impl Into<u32>, bytes: &'a mut [u8]) -> Self {
        Self {
            id: id.into(),
            cell: ValueCell::new(bytes),
        }
    }

    /// Accept the register's canonical width; `bytes` must be at least that long.
    pub fn canonical(id: impl Into<u32>, bytes: &'a mut [u8]) -> Self {
        Self {
            id: id.into(),
            cell: ValueCell::canonical(bytes),
        }
    }
}

/// One register to write, and its new value.
#[derive(Debug, Clone, Copy)]
pub struct WriteSlot<'a> {
    pub id: u32,
    pub value: ValueRef<'a>,
}

impl<'a> WriteSlot<'a> {
    pub fn new(id: impl Into<u32>, bytes: &'a [u8]) -> Self {
        Self {
            id: id.into(),
            value: ValueRef::new(bytes),
        }
    }

    pub fn canonical(id: impl Into<u32>, bytes: &'a [u8]) -> Self {
        Self {
            id: id.into(),
            value: ValueRef::canonical(bytes),
        }
    }
}

/// What a successful write batch did besides storing values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Some element wrote the program counter.
    pub pc_changed: bool,
}

pub fn read_batch<R: RegisterFile + ?Sized>(
    file: &mut R,
    env: &mut AccessEnv<'_>,
    slots: &mut [ReadSlot<'_>],
) -> Result<(), BatchError> {
    for (index, slot) in slots.iter_mut().enumerate() {
        file.read(env, slot.id, &mut slot.cell)
            .map_err(|source| BatchError {
                index,
                id: slot.id,
                source,
            })?;
    }
    Ok(())
}

/// Apply `slots` in order. Whether the program counter was written is left
/// in `env`, also when the batch fails part way.
pub fn write_batch<R: RegisterFile + ?Sized>(
    file: &mut R,
    env: &mut AccessEnv<'_>,
    slots: &[WriteSlot<'_>],
) -> Result<(), BatchError> {
    for (index, slot) in slots.iter().enumerate() {
        file.write(env, slot.id, slot.value)
            .map_err(|source| BatchError {
                index,
                id: slot.id,
                source,
            })?;
    }
    Ok(())
}
