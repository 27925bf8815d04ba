//! Width-checked value cells.
//!
//! The register API is byte oriented: callers hand in a buffer plus the size
//! they believe the register has. Every accessor claims exactly the semantic
//! width of the register from the cell before it copies anything, so a caller
//! that guessed wrong gets [`RegError::SizeMismatch`] instead of a torn value.
//!
//! All values travel little-endian.

use crate::error::{RegError, Result};
use serde::{Deserialize, Serialize};

/// Widest register any architecture exposes (YMM).
pub const MAX_WIDTH: usize = 32;

fn check_width(id: u32, width: usize, declared: Option<usize>, available: usize) -> Result<()> {
    match declared {
        Some(declared) if declared != width => Err(RegError::SizeMismatch {
            id,
            expected: width,
            declared,
        }),
        _ if available < width => Err(RegError::SizeMismatch {
            id,
            expected: width,
            declared: available,
        }),
        _ => Ok(()),
    }
}

/// Destination of a register read.
#[derive(Debug)]
pub struct ValueCell<'a> {
    bytes: &'a mut [u8],
    declared: Option<usize>,
    transferred: Option<usize>,
}

impl<'a> ValueCell<'a> {
    /// The buffer length is the declared size.
    pub fn new(bytes: &'a mut [u8]) -> Self {
        let declared = Some(bytes.len());
        Self::with_declared(bytes, declared)
    }

    /// No declared size: the caller accepts whatever width the register has,
    /// as long as it fits in `bytes`.
    pub fn canonical(bytes: &'a mut [u8]) -> Self {
        Self::with_declared(bytes, None)
    }

    pub fn with_declared(bytes: &'a mut [u8], declared: Option<usize>) -> Self {
        Self {
            bytes,
            declared,
            transferred: None,
        }
    }

    /// Number of bytes the last successful access produced.
    pub fn transferred(&self) -> Option<usize> {
        self.transferred
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes
    }

    /// Validate `width` against the cell and hand out exactly that many bytes.
    ///
    /// The bytes keep their previous contents; some reads (MSR) take their
    /// input from the cell.
    pub(crate) fn claim(&mut self, id: u32, width: usize) -> Result<&mut [u8]> {
        check_width(id, width, self.declared, self.bytes.len())?;
        self.transferred = Some(width);
        Ok(&mut self.bytes[..width])
    }
}

/// Source of a register write.
#[derive(Debug, Clone, Copy)]
pub struct ValueRef<'a> {
    bytes: &'a [u8],
    declared: Option<usize>,
}

impl<'a> ValueRef<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            declared: Some(bytes.len()),
        }
    }

    pub fn canonical(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            declared: None,
        }
    }

    pub fn with_declared(bytes: &'a [u8], declared: Option<usize>) -> Self {
        Self { bytes, declared }
    }

    pub(crate) fn claim(&self, id: u32, width: usize) -> Result<&'a [u8]> {
        check_width(id, width, self.declared, self.bytes.len())?;
        Ok(&self.bytes[..width])
    }
}

/// Store the low `out.len()` bytes of `value`.
pub(crate) fn put_scalar(out: &mut [u8], value: u64) {
    let bytes = value.to_le_bytes();
    out.copy_from_slice(&bytes[..out.len()]);
}

/// Zero-extend up to eight little-endian bytes.
pub(crate) fn get_scalar(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// A Rust type with a fixed wire encoding, for the typed convenience API.
pub trait RegValue: Sized {
    const WIDTH: usize;

    fn encode(&self, out: &mut [u8]);

    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! scalar_value {
    ($($ty:ty),*) => {
        $(
            impl RegValue for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn encode(&self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                fn decode(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(buf)
                }
            }
        )*
    };
}

scalar_value!(u8, u16, u32, u64);

impl<const N: usize> RegValue for [u64; N] {
    const WIDTH: usize = 8 * N;

    fn encode(&self, out: &mut [u8]) {
        for (lane, chunk) in self.iter().zip(out.chunks_exact_mut(8)) {
            chunk.copy_from_slice(&lane.to_le_bytes());
        }
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut lanes = [0u64; N];
        for (lane, chunk) in lanes.iter_mut().zip(bytes.chunks_exact(8)) {
            *lane = get_scalar(chunk);
        }
        lanes
    }
}

/// An 80-bit x87 extended precision value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fp80 {
    /// Significand including the explicit integer bit (bit 63).
    pub mantissa: u64,
    /// Sign in bit 15, biased exponent in bits 0..15.
    pub sign_exponent: u16,
}

impl Fp80 {
    pub fn new(mantissa: u64, sign_exponent: u16) -> Self {
        Self {
            mantissa,
            sign_exponent,
        }
    }

    pub fn exponent(&self) -> u16 {
        self.sign_exponent & 0x7fff
    }
}

impl RegValue for Fp80 {
    const WIDTH: usize = 10;

    fn encode(&self, out: &mut [u8]) {
        out[..8].copy_from_slice(&self.mantissa.to_le_bytes());
        out[8..10].copy_from_slice(&self.sign_exponent.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        Self {
            mantissa: get_scalar(&bytes[..8]),
            sign_exponent: get_scalar(&bytes[8..10]) as u16,
        }
    }
}

/// Memory-management register as seen through the API: a segment-like
/// register (LDTR, TR) or a descriptor table register (GDTR, IDTR).
///
/// Layout: selector @0, base @8, limit @16, flags @20.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct X86Mmr {
    pub selector: u16,
    pub base: u64,
    pub limit: u32,
    pub flags: u32,
}

impl RegValue for X86Mmr {
    const WIDTH: usize = 24;

    fn encode(&self, out: &mut [u8]) {
        out.fill(0);
        out[0..2].copy_from_slice(&self.selector.to_le_bytes());
        out[8..16].copy_from_slice(&self.base.to_le_bytes());
        out[16..20].copy_from_slice(&self.limit.to_le_bytes());
        out[20..24].copy_from_slice(&self.flags.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        Self {
            selector: get_scalar(&bytes[0..2]) as u16,
            base: get_scalar(&bytes[8..16]),
            limit: get_scalar(&bytes[16..20]) as u32,
            flags: get_scalar(&bytes[20..24]) as u32,
        }
    }
}

/// Model-specific register request: which MSR, and its value.
///
/// Layout: index @0, value @8. A read takes the index from the cell and
/// fills in the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct X86Msr {
    pub index: u32,
    pub value: u64,
}

impl X86Msr {
    pub fn new(index: u32, value: u64) -> Self {
        Self { index, value }
    }
}

impl RegValue for X86Msr {
    const WIDTH: usize = 16;

    fn encode(&self, out: &mut [u8]) {
        out.fill(0);
        out[0..4].copy_from_slice(&self.index.to_le_bytes());
        out[8..16].copy_from_slice(&self.value.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        Self {
            index: get_scalar(&bytes[0..4]) as u32,
            value: get_scalar(&bytes[8..16]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_size_must_match_exactly() {
        let mut buf = [0u8; 8];
        let mut cell = ValueCell::with_declared(&mut buf, Some(4));
        assert_eq!(
            cell.claim(7, 8).unwrap_err(),
            RegError::SizeMismatch {
                id: 7,
                expected: 8,
                declared: 4
            }
        );
        assert_eq!(cell.transferred(), None);
    }

    #[test]
    fn canonical_cell_accepts_larger_buffer() {
        let mut buf = [0xaau8; 16];
        let mut cell = ValueCell::canonical(&mut buf);
        assert_eq!(cell.claim(1, 2).unwrap().len(), 2);
        assert_eq!(cell.transferred(), Some(2));
    }

    #[test]
    fn canonical_cell_rejects_short_buffer() {
        let src = [0u8; 2];
        let value = ValueRef::canonical(&src);
        assert!(value.claim(1, 4).is_err());
    }

    #[test]
    fn composite_layouts() {
        let mmr = X86Mmr {
            selector: 0x2b,
            base: 0x1122_3344_5566_7788,
            limit: 0xffff,
            flags: 0x00c0_9300,
        };
        let mut raw = [0xffu8; 24];
        mmr.encode(&mut raw);
        assert_eq!(&raw[0..2], &[0x2b, 0]);
        assert_eq!(&raw[2..8], &[0; 6]);
        assert_eq!(raw[8], 0x88);
        assert_eq!(X86Mmr::decode(&raw), mmr);

        let fp = Fp80::new(0x8000_0000_0000_0000, 0x3fff);
        let mut raw = [0u8; 10];
        fp.encode(&mut raw);
        assert_eq!(&raw[8..], &[0xff, 0x3f]);
    }
}
