// Mon Oct 12 2026 - Alex

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Interpretations of a byte run that are still possible.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Widths: u16 {
        const U8 = 1 << 0;
        const S8 = 1 << 1;
        const U16 = 1 << 2;
        const S16 = 1 << 3;
        const U32 = 1 << 4;
        const S32 = 1 << 5;
        const U64 = 1 << 6;
        const S64 = 1 << 7;
        const F32 = 1 << 8;
        const F64 = 1 << 9;
        const BYTEARRAY = 1 << 10;
        const STRING = 1 << 11;

        const INT8 = Self::U8.bits() | Self::S8.bits();
        const INT16 = Self::U16.bits() | Self::S16.bits();
        const INT32 = Self::U32.bits() | Self::S32.bits();
        const INT64 = Self::U64.bits() | Self::S64.bits();
        const INTEGERS = Self::INT8.bits() | Self::INT16.bits() | Self::INT32.bits() | Self::INT64.bits();
        const FLOATS = Self::F32.bits() | Self::F64.bits();
        const NUMBERS = Self::INTEGERS.bits() | Self::FLOATS.bits();
    }
}

impl Default for Widths {
    fn default() -> Self {
        Self::empty()
    }
}

const WIDTH_NAMES: [(Widths, &str); 10] = [
    (Widths::S64, "i64"),
    (Widths::U64, "u64"),
    (Widths::F64, "f64"),
    (Widths::S32, "i32"),
    (Widths::U32, "u32"),
    (Widths::F32, "f32"),
    (Widths::S16, "i16"),
    (Widths::U16, "u16"),
    (Widths::S8, "i8"),
    (Widths::U8, "u8"),
];

impl Widths {
    /// Numeric widths that can be fully backed by `available` bytes.
    pub fn for_available_bytes(available: usize) -> Self {
        let mut widths = Self::empty();
        if available >= 1 {
            widths |= Self::INT8;
        }
        if available >= 2 {
            widths |= Self::INT16;
        }
        if available >= 4 {
            widths |= Self::INT32 | Self::F32;
        }
        if available >= 8 {
            widths |= Self::INT64 | Self::F64;
        }
        widths
    }

    /// Size in bytes of the widest numeric interpretation left.
    pub fn max_width_in_bytes(self) -> usize {
        if self.intersects(Self::INT64 | Self::F64) {
            8
        } else if self.intersects(Self::INT32 | Self::F32) {
            4
        } else if self.intersects(Self::INT16) {
            2
        } else if self.intersects(Self::INT8) {
            1
        } else {
            0
        }
    }

    pub fn names(self) -> impl Iterator<Item = &'static str> {
        WIDTH_NAMES
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }
}

/// Per-address match state: the candidate interpretations plus, for byte
/// arrays and strings, the matched length. Empty means placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatchFlags {
    widths: Widths,
    length: u16,
}

impl MatchFlags {
    pub const EMPTY: Self = Self { widths: Widths::empty(), length: 0 };

    pub fn numeric(widths: Widths) -> Self {
        Self { widths: widths & Widths::NUMBERS, length: 0 }
    }

    pub fn bytearray(length: u16) -> Self {
        if length == 0 {
            return Self::EMPTY;
        }
        Self { widths: Widths::BYTEARRAY, length }
    }

    pub fn string(length: u16) -> Self {
        if length == 0 {
            return Self::EMPTY;
        }
        Self { widths: Widths::STRING, length }
    }

    pub fn widths(&self) -> Widths {
        self.widths
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn is_live(&self) -> bool {
        !self.widths.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.widths.intersects(Widths::NUMBERS)
    }

    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    /// Number of target bytes this match spans, starting at its address.
    pub fn extent(&self) -> usize {
        if self.widths.intersects(Widths::BYTEARRAY | Widths::STRING) {
            self.length as usize
        } else {
            self.widths.max_width_in_bytes()
        }
    }

    pub fn intersect(&self, widths: Widths) -> Self {
        let widths = self.widths & widths;
        if widths.intersects(Widths::BYTEARRAY | Widths::STRING) {
            Self { widths, length: self.length }
        } else {
            Self::numeric(widths)
        }
    }
}

impl From<Widths> for MatchFlags {
    fn from(widths: Widths) -> Self {
        Self::numeric(widths)
    }
}

impl fmt::Display for MatchFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.widths.contains(Widths::BYTEARRAY) {
            return write!(f, "bytearray[{}]", self.length);
        }
        if self.widths.contains(Widths::STRING) {
            return write!(f, "string[{}]", self.length);
        }
        let names: Vec<&str> = self.widths.names().collect();
        write!(f, "{}", names.join(" "))
    }
}
