// Tue Jan 13 2026 - Alex

use crate::memory::{Address, Endianness};
use crate::store::{MatchArray, MatchLocation, StoreError};
use crate::value::{MatchFlags, Value, Widths};

/// Renders a numeric value as its widest remaining interpretation followed
/// by every width it may still be, e.g. `42, [i64 u64 i32 u32 i16 u16 i8 u8]`.
pub fn format_value(value: &Value, order: Endianness) -> String {
    let widths = value.widths();
    let shown = if widths.contains(Widths::S64) {
        value.as_i64(order).to_string()
    } else if widths.contains(Widths::U64) {
        value.as_u64(order).to_string()
    } else if widths.contains(Widths::S32) {
        value.as_i32(order).to_string()
    } else if widths.contains(Widths::U32) {
        value.as_u32(order).to_string()
    } else if widths.contains(Widths::F64) {
        value.as_f64(order).to_string()
    } else if widths.contains(Widths::F32) {
        value.as_f32(order).to_string()
    } else if widths.contains(Widths::S16) {
        value.as_i16(order).to_string()
    } else if widths.contains(Widths::U16) {
        value.as_u16(order).to_string()
    } else if widths.contains(Widths::S8) {
        value.as_i8().to_string()
    } else if widths.contains(Widths::U8) {
        value.as_u8().to_string()
    } else {
        return "??".to_string();
    };
    format!("{}, [{}]", shown, value.flags())
}

pub fn format_bytearray(bytes: &[u8]) -> String {
    let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{} [bytearray]", hex.join(" "))
}

pub fn format_string(bytes: &[u8]) -> String {
    let text: String = bytes.iter().map(|&b| printable(b)).collect();
    format!("{} [string]", text)
}

fn printable(b: u8) -> char {
    if b.is_ascii_graphic() || b == b' ' {
        b as char
    } else {
        '.'
    }
}

/// Stored value of the match at `loc`, rendered according to its kind.
pub fn format_match(array: &MatchArray, loc: MatchLocation, order: Endianness) -> Result<String, StoreError> {
    let entry = array.entry(loc)?;
    let flags: MatchFlags = entry.flags;
    if flags.widths().contains(Widths::BYTEARRAY) {
        Ok(format_bytearray(&array.old_bytes(loc, flags.length() as usize)?))
    } else if flags.widths().contains(Widths::STRING) {
        Ok(format_string(&array.old_bytes(loc, flags.length() as usize)?))
    } else {
        Ok(format_value(&array.value_at(loc)?, order))
    }
}

/// Classic 16-bytes-per-line hex dump.
pub fn hexdump(start: Address, bytes: &[u8], with_ascii: bool) -> String {
    let mut out = String::new();
    for (line, chunk) in bytes.chunks(16).enumerate() {
        let address = start + (line * 16) as u64;
        out.push_str(&format!("{:x}: ", address));
        for i in 0..16 {
            match chunk.get(i) {
                Some(b) => out.push_str(&format!("{:02x} ", b)),
                None => out.push_str("   "),
            }
        }
        if with_ascii {
            out.push_str(" |");
            out.extend(chunk.iter().map(|&b| printable(b)));
            out.push('|');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_widest_first() {
        let value = Value::from_bytes(&[42, 0, 0, 0, 0, 0, 0, 0]).truncated(Widths::INTEGERS);
        assert_eq!(format_value(&value, Endianness::Little), "42, [i64 u64 i32 u32 i16 u16 i8 u8]");

        let value = Value::from_bytes(&[0xff]).truncated(Widths::S8);
        assert_eq!(format_value(&value, Endianness::Little), "-1, [i8]");
    }

    #[test]
    fn test_format_float() {
        let value = Value::from_bytes(&2.5f32.to_le_bytes()).truncated(Widths::F32);
        assert_eq!(format_value(&value, Endianness::Little), "2.5, [f32]");
    }

    #[test]
    fn test_bytes_and_strings() {
        assert_eq!(format_bytearray(&[0xde, 0xad]), "de ad [bytearray]");
        assert_eq!(format_string(b"hp\x01!"), "hp.! [string]");
    }

    #[test]
    fn test_hexdump() {
        let dump = hexdump(Address::new(0x1000), b"ABC", true);
        assert!(dump.starts_with("1000: 41 42 43 "));
        assert!(dump.trim_end().ends_with("|ABC|"));

        let dump = hexdump(Address::new(0x1000), &[0u8; 20], false);
        assert_eq!(dump.lines().count(), 2);
        assert!(dump.lines().nth(1).unwrap().starts_with("1010: "));
        assert!(!dump.contains('|'));
    }
}
