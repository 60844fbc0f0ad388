// Mon Oct 12 2026 - Alex

use crate::memory::Endianness;
use crate::value::{ValueError, Widths};

/// A number typed by the user, pre-converted to every width it fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberValue {
    pub unsigned: u64,
    pub signed: i64,
    pub float32: f32,
    pub float64: f64,
    pub widths: Widths,
}

impl NumberValue {
    pub fn from_integer(v: i128) -> Self {
        let mut widths = Widths::FLOATS;
        let fits = |lo: i128, hi: i128| v >= lo && v <= hi;
        if fits(0, u8::MAX as i128) {
            widths |= Widths::U8;
        }
        if fits(i8::MIN as i128, i8::MAX as i128) {
            widths |= Widths::S8;
        }
        if fits(0, u16::MAX as i128) {
            widths |= Widths::U16;
        }
        if fits(i16::MIN as i128, i16::MAX as i128) {
            widths |= Widths::S16;
        }
        if fits(0, u32::MAX as i128) {
            widths |= Widths::U32;
        }
        if fits(i32::MIN as i128, i32::MAX as i128) {
            widths |= Widths::S32;
        }
        if fits(0, u64::MAX as i128) {
            widths |= Widths::U64;
        }
        if fits(i64::MIN as i128, i64::MAX as i128) {
            widths |= Widths::S64;
        }
        Self {
            unsigned: v as u64,
            signed: v as i64,
            float32: v as f32,
            float64: v as f64,
            widths,
        }
    }

    pub fn from_float(v: f64) -> Self {
        Self {
            unsigned: v as u64,
            signed: v as i64,
            float32: v as f32,
            float64: v,
            widths: Widths::FLOATS,
        }
    }

    /// Accepts decimal, `0x` hex (optionally negative) and floating point.
    pub fn parse(input: &str) -> Result<Self, ValueError> {
        let text = input.trim();
        let bad = || ValueError::BadNumber(input.to_string());
        if text.is_empty() {
            return Err(bad());
        }

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let hex = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X"));
        let integer = match hex {
            Some(h) if h.starts_with(['+', '-']) => None,
            Some(h) => i128::from_str_radix(h, 16).ok(),
            None if digits.bytes().all(|b| b.is_ascii_digit()) => digits.parse::<i128>().ok(),
            None => None,
        };

        if let Some(v) = integer {
            let v = if negative { -v } else { v };
            if v < i64::MIN as i128 || v > u64::MAX as i128 {
                return Err(bad());
            }
            return Ok(Self::from_integer(v));
        }
        if hex.is_some() {
            return Err(bad());
        }

        text.parse::<f64>().map(Self::from_float).map_err(|_| bad())
    }

    /// Encodes this number for writing over a match whose surviving widths
    /// are `widths`: the widest common width wins, integers before floats.
    pub fn encode(&self, widths: Widths, order: Endianness) -> Result<Vec<u8>, ValueError> {
        let common = widths & self.widths;
        let mut bytes = match common.max_width_in_bytes() {
            8 if common.intersects(Widths::INT64) => self.unsigned.to_ne_bytes().to_vec(),
            8 => self.float64.to_ne_bytes().to_vec(),
            4 if common.intersects(Widths::INT32) => (self.unsigned as u32).to_ne_bytes().to_vec(),
            4 => self.float32.to_ne_bytes().to_vec(),
            2 => (self.unsigned as u16).to_ne_bytes().to_vec(),
            1 => vec![self.unsigned as u8],
            _ => return Err(ValueError::NoCommonWidth),
        };
        let width = bytes.len();
        order.fix(&mut bytes, width);
        Ok(bytes)
    }
}

/// One element of a byte-array pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteMask {
    Exact(u8),
    Wildcard,
}

impl ByteMask {
    pub fn matches(self, byte: u8) -> bool {
        match self {
            Self::Exact(b) => b == byte,
            Self::Wildcard => true,
        }
    }
}

/// Parses whitespace-separated hex bytes, `??` standing for any byte.
pub fn parse_bytearray<'a, I>(tokens: I) -> Result<Vec<ByteMask>, ValueError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut pattern = Vec::new();
    for token in tokens {
        let mask = if token == "??" {
            ByteMask::Wildcard
        } else if token.len() == 2 {
            u8::from_str_radix(token, 16)
                .map(ByteMask::Exact)
                .map_err(|_| ValueError::BadByte(token.to_string()))?
        } else {
            return Err(ValueError::BadByte(token.to_string()));
        };
        pattern.push(mask);
    }
    if pattern.is_empty() {
        return Err(ValueError::EmptyByteArray);
    }
    if pattern.len() > u16::MAX as usize {
        return Err(ValueError::TooLong(pattern.len()));
    }
    Ok(pattern)
}

/// The operand of a scan, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanTarget {
    None,
    Number(NumberValue),
    Range(NumberValue, NumberValue),
    Bytes(Vec<ByteMask>),
    Text(Vec<u8>),
}

impl ScanTarget {
    pub fn number(input: &str) -> Result<Self, ValueError> {
        NumberValue::parse(input).map(Self::Number)
    }

    /// Parses `low..high`, inclusive on both ends.
    pub fn range(input: &str) -> Result<Self, ValueError> {
        let bad = || ValueError::BadRange(input.to_string());
        let (lo, hi) = input.split_once("..").ok_or_else(bad)?;
        let lo = NumberValue::parse(lo)?;
        let hi = NumberValue::parse(hi)?;
        if lo.float64 > hi.float64 {
            return Err(bad());
        }
        Ok(Self::Range(lo, hi))
    }

    pub fn text(input: &str) -> Result<Self, ValueError> {
        if input.is_empty() {
            return Err(ValueError::EmptyString);
        }
        if input.len() > u16::MAX as usize {
            return Err(ValueError::TooLong(input.len()));
        }
        Ok(Self::Text(input.as_bytes().to_vec()))
    }

    /// Widths the operand itself can take; `None` places no restriction.
    pub fn widths(&self) -> Widths {
        match self {
            Self::None => Widths::all(),
            Self::Number(n) => n.widths,
            Self::Range(lo, hi) => lo.widths & hi.widths,
            Self::Bytes(_) => Widths::BYTEARRAY,
            Self::Text(_) => Widths::STRING,
        }
    }

    /// Bytes a candidate must have for a variable-length comparison.
    pub fn length(&self) -> usize {
        match self {
            Self::Bytes(pattern) => pattern.len(),
            Self::Text(text) => text.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_small_integer() {
        let n = NumberValue::parse("42").unwrap();
        assert_eq!(n.unsigned, 42);
        assert_eq!(n.signed, 42);
        assert!(n.widths.contains(Widths::NUMBERS));
    }

    #[test]
    fn test_parse_negative_and_hex() {
        let n = NumberValue::parse("-1").unwrap();
        assert_eq!(n.signed, -1);
        assert!(n.widths.contains(Widths::S8 | Widths::S64 | Widths::FLOATS));
        assert!(!n.widths.intersects(Widths::U8 | Widths::U64));

        let n = NumberValue::parse("0x1ff").unwrap();
        assert_eq!(n.unsigned, 0x1ff);
        assert!(!n.widths.intersects(Widths::INT8));
        assert!(n.widths.contains(Widths::INT16));
    }

    #[test]
    fn test_parse_large_unsigned() {
        let n = NumberValue::parse("18446744073709551615").unwrap();
        assert_eq!(n.unsigned, u64::MAX);
        assert!(n.widths.contains(Widths::U64));
        assert!(!n.widths.contains(Widths::S64));
        assert!(NumberValue::parse("18446744073709551616").is_err());
    }

    #[test]
    fn test_parse_float_sets_only_floats() {
        let n = NumberValue::parse("3.5").unwrap();
        assert_eq!(n.widths, Widths::FLOATS);
        assert_eq!(n.float32, 3.5);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(NumberValue::parse("").is_err());
        assert!(NumberValue::parse("12abc").is_err());
        assert!(NumberValue::parse("0xzz").is_err());
        assert!(NumberValue::parse("0x-5").is_err());
        assert!(NumberValue::parse("0x+5").is_err());
        assert!(NumberValue::parse("-0x-5").is_err());
    }

    #[test]
    fn test_encode_prefers_widest_integer() {
        let n = NumberValue::parse("300").unwrap();
        let bytes = n.encode(Widths::INT16 | Widths::INT8, Endianness::Little).unwrap();
        assert_eq!(bytes, 300u16.to_le_bytes().to_vec());

        let bytes = n.encode(Widths::F32, Endianness::Little).unwrap();
        assert_eq!(bytes, 300f32.to_le_bytes().to_vec());

        assert_eq!(n.encode(Widths::INT8, Endianness::Little), Err(ValueError::NoCommonWidth));
    }

    #[test]
    fn test_bytearray_with_wildcards() {
        let pattern = parse_bytearray("de ?? be ef".split_whitespace()).unwrap();
        assert_eq!(pattern.len(), 4);
        assert_eq!(pattern[1], ByteMask::Wildcard);
        assert!(pattern[0].matches(0xde));
        assert!(!pattern[0].matches(0xdf));
        assert!(parse_bytearray("zz".split_whitespace()).is_err());
        assert!(parse_bytearray("abc".split_whitespace()).is_err());
        assert_eq!(parse_bytearray(std::iter::empty()), Err(ValueError::EmptyByteArray));
    }

    #[test]
    fn test_range() {
        let target = ScanTarget::range("10..20").unwrap();
        assert!(matches!(target, ScanTarget::Range(lo, hi) if lo.signed == 10 && hi.signed == 20));
        assert!(ScanTarget::range("20..10").is_err());
        assert!(ScanTarget::range("10").is_err());
    }
}
