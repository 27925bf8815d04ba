//! Guest memory as seen by the register layer.
//!
//! Register writes only ever need to *read* guest memory, to fetch segment
//! descriptors for the selector legality check. The execution engine owns
//! the real address space and exposes it through [`GuestMemory`].

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("guest address {addr:#x} is not mapped ({len} bytes)")]
pub struct MemoryFault {
    pub addr: u64,
    pub len: usize,
}

pub trait GuestMemory {
    fn read(&self, addr: u64, buf: &mut [u8]) -> Result<(), MemoryFault>;

    fn read_u32(&self, addr: u64) -> Result<u32, MemoryFault> {
        let mut buf = [0u8; 4];
        self.read(addr, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

/// No memory mapped at all. Used by detached contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemory;

impl GuestMemory for NoMemory {
    fn read(&self, addr: u64, buf: &mut [u8]) -> Result<(), MemoryFault> {
        Err(MemoryFault {
            addr,
            len: buf.len(),
        })
    }
}

/// One contiguous region of RAM starting at `base`.
#[derive(Debug, Clone)]
pub struct FlatMemory {
    base: u64,
    bytes: Vec<u8>,
}

impl FlatMemory {
    pub fn new(base: u64, size: usize) -> Self {
        Self {
            base,
            bytes: vec![0; size],
        }
    }

    fn range(&self, addr: u64, len: usize) -> Result<std::ops::Range<usize>, MemoryFault> {
        let fault = MemoryFault { addr, len };
        let start = addr.checked_sub(self.base).ok_or(fault)?;
        let start = usize::try_from(start).map_err(|_| fault)?;
        let end = start.checked_add(len).ok_or(fault)?;
        if end > self.bytes.len() {
            return Err(fault);
        }
        Ok(start..end)
    }

    pub fn write(&mut self, addr: u64, data: &[u8]) -> Result<(), MemoryFault> {
        let range = self.range(addr, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }
}

impl GuestMemory for FlatMemory {
    fn read(&self, addr: u64, buf: &mut [u8]) -> Result<(), MemoryFault> {
        let range = self.range(addr, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_memory_bounds() {
        let mut mem = FlatMemory::new(0x1000, 0x10);
        mem.write(0x100c, &[1, 2, 3, 4]).unwrap();
        assert_eq!(mem.read_u32(0x100c).unwrap(), 0x0403_0201);
        assert!(mem.read_u32(0x100d).is_err());
        assert!(mem.read_u32(0xffc).is_err());
        assert!(NoMemory.read_u32(0).is_err());
    }
}
