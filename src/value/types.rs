// Mon Oct 12 2026 - Alex

use crate::value::Widths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user is looking for; decides which widths a fresh value may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanDataType {
    #[default]
    #[serde(rename = "number")]
    AnyNumber,
    #[serde(rename = "int")]
    AnyInteger,
    #[serde(rename = "float")]
    AnyFloat,
    #[serde(rename = "int8")]
    Integer8,
    #[serde(rename = "int16")]
    Integer16,
    #[serde(rename = "int32")]
    Integer32,
    #[serde(rename = "int64")]
    Integer64,
    Float32,
    Float64,
    ByteArray,
    String,
}

impl ScanDataType {
    pub fn widths(self) -> Widths {
        match self {
            Self::AnyNumber => Widths::NUMBERS,
            Self::AnyInteger => Widths::INTEGERS,
            Self::AnyFloat => Widths::FLOATS,
            Self::Integer8 => Widths::INT8,
            Self::Integer16 => Widths::INT16,
            Self::Integer32 => Widths::INT32,
            Self::Integer64 => Widths::INT64,
            Self::Float32 => Widths::F32,
            Self::Float64 => Widths::F64,
            Self::ByteArray => Widths::BYTEARRAY,
            Self::String => Widths::STRING,
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::ByteArray | Self::String)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AnyNumber => "number",
            Self::AnyInteger => "int",
            Self::AnyFloat => "float",
            Self::Integer8 => "int8",
            Self::Integer16 => "int16",
            Self::Integer32 => "int32",
            Self::Integer64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::ByteArray => "bytearray",
            Self::String => "string",
        }
    }
}

impl FromStr for ScanDataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.to_lowercase().as_str() {
            "number" => Self::AnyNumber,
            "int" => Self::AnyInteger,
            "float" => Self::AnyFloat,
            "int8" => Self::Integer8,
            "int16" => Self::Integer16,
            "int32" => Self::Integer32,
            "int64" => Self::Integer64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "bytearray" => Self::ByteArray,
            "string" => Self::String,
            other => return Err(format!("unknown data type `{}`", other)),
        };
        Ok(parsed)
    }
}

impl fmt::Display for ScanDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanMatchType {
    Any,
    EqualTo,
    NotEqualTo,
    LessThan,
    GreaterThan,
    Range,
    Changed,
    NotChanged,
    Increased,
    Decreased,
    IncreasedBy,
    DecreasedBy,
}

impl ScanMatchType {
    /// Compares against the previously stored value, so cannot start a scan.
    pub fn needs_old(self) -> bool {
        matches!(
            self,
            Self::Changed
                | Self::NotChanged
                | Self::Increased
                | Self::Decreased
                | Self::IncreasedBy
                | Self::DecreasedBy
        )
    }

    pub fn needs_value(self) -> bool {
        matches!(
            self,
            Self::EqualTo
                | Self::NotEqualTo
                | Self::LessThan
                | Self::GreaterThan
                | Self::Range
                | Self::IncreasedBy
                | Self::DecreasedBy
        )
    }

    /// Maps an operator command to a match type; `with_value` tells whether
    /// the user supplied an operand.
    pub fn from_operator(op: &str, with_value: bool) -> Option<Self> {
        let m = match (op, with_value) {
            ("=", true) => Self::EqualTo,
            ("=", false) => Self::NotChanged,
            ("!=", true) => Self::NotEqualTo,
            ("!=", false) => Self::Changed,
            ("<", true) => Self::LessThan,
            ("<", false) => Self::Decreased,
            (">", true) => Self::GreaterThan,
            (">", false) => Self::Increased,
            ("+", true) => Self::IncreasedBy,
            ("+", false) => Self::Increased,
            ("-", true) => Self::DecreasedBy,
            ("-", false) => Self::Decreased,
            _ => return None,
        };
        Some(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_names_roundtrip() {
        for ty in [
            ScanDataType::AnyNumber,
            ScanDataType::AnyInteger,
            ScanDataType::Integer32,
            ScanDataType::Float64,
            ScanDataType::ByteArray,
            ScanDataType::String,
        ] {
            assert_eq!(ty.name().parse::<ScanDataType>().unwrap(), ty);
        }
        assert!("int128".parse::<ScanDataType>().is_err());
    }

    #[test]
    fn test_operators() {
        assert_eq!(ScanMatchType::from_operator("=", false), Some(ScanMatchType::NotChanged));
        assert_eq!(ScanMatchType::from_operator("+", true), Some(ScanMatchType::IncreasedBy));
        assert_eq!(ScanMatchType::from_operator("<", true), Some(ScanMatchType::LessThan));
        assert!(ScanMatchType::from_operator("*", true).is_none());
        assert!(ScanMatchType::Increased.needs_old());
        assert!(!ScanMatchType::GreaterThan.needs_old());
    }
}
