// Mon Oct 12 2026 - Alex

use crate::memory::Endianness;
use crate::value::{MatchFlags, Widths};

/// Up to eight bytes of target data, kept in target byte order, plus the
/// interpretations that are still valid for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Value {
    bytes: [u8; 8],
    len: usize,
    flags: MatchFlags,
}

macro_rules! decode {
    ($name:ident, $ty:ty, $n:expr) => {
        pub fn $name(&self, order: Endianness) -> $ty {
            let mut raw = [0u8; $n];
            raw.copy_from_slice(&self.bytes[..$n]);
            order.fix(&mut raw, $n);
            <$ty>::from_ne_bytes(raw)
        }
    };
}

impl Value {
    /// Builds a value from observed bytes. Only widths fully covered by
    /// `bytes` are flagged; anything past eight bytes is ignored.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let len = bytes.len().min(8);
        let mut value = Self::default();
        value.bytes[..len].copy_from_slice(&bytes[..len]);
        value.len = len;
        value.flags = MatchFlags::numeric(Widths::for_available_bytes(len));
        value
    }

    pub fn zero(&mut self) {
        *self = Self::default();
    }

    pub fn flags(&self) -> MatchFlags {
        self.flags
    }

    pub fn widths(&self) -> Widths {
        self.flags.widths()
    }

    /// Bytes actually known for this value.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Narrows the flags to those also present in `widths`.
    pub fn truncate(&mut self, widths: Widths) {
        self.flags = self.flags.intersect(widths);
    }

    pub fn truncated(mut self, widths: Widths) -> Self {
        self.truncate(widths);
        self
    }

    pub fn as_u8(&self) -> u8 {
        self.bytes[0]
    }

    pub fn as_i8(&self) -> i8 {
        self.bytes[0] as i8
    }

    decode!(as_u16, u16, 2);
    decode!(as_i16, i16, 2);
    decode!(as_u32, u32, 4);
    decode!(as_i32, i32, 4);
    decode!(as_u64, u64, 8);
    decode!(as_i64, i64, 8);
    decode!(as_f32, f32, 4);
    decode!(as_f64, f64, 8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_sets_only_backed_widths() {
        let value = Value::from_bytes(&[0x2a, 0, 0]);
        assert_eq!(value.widths(), Widths::INT8 | Widths::INT16);
        assert_eq!(value.bytes(), &[0x2a, 0, 0]);
        assert_eq!(value.as_u16(Endianness::Little), 0x2a);
    }

    #[test]
    fn test_from_bytes_caps_at_eight() {
        let value = Value::from_bytes(&[1; 12]);
        assert_eq!(value.bytes().len(), 8);
        assert_eq!(value.widths(), Widths::NUMBERS);
    }

    #[test]
    fn test_truncate_and_zero() {
        let mut value = Value::from_bytes(&(-2i32).to_le_bytes());
        value.truncate(Widths::S32 | Widths::U64);
        assert_eq!(value.widths(), Widths::S32);
        assert_eq!(value.as_i32(Endianness::Little), -2);

        value.zero();
        assert!(value.widths().is_empty());
        assert!(value.bytes().is_empty());
    }

    #[test]
    fn test_big_endian_decode() {
        let value = Value::from_bytes(&[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(value.as_u32(Endianness::Big), 0x12345678);
        assert_eq!(value.as_u32(Endianness::Little), 0x78563412);
    }
}
