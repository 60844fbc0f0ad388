// Mon Oct 12 2026 - Alex

use serde::{Deserialize, Serialize};

/// Byte order of the data in the target, relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Endianness {
    #[default]
    Host,
    Little,
    Big,
}

impl Endianness {
    pub fn from_option(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Host),
            1 => Some(Self::Little),
            2 => Some(Self::Big),
            _ => None,
        }
    }

    pub fn needs_swap(self) -> bool {
        match self {
            Self::Host => false,
            Self::Little => cfg!(target_endian = "big"),
            Self::Big => cfg!(target_endian = "little"),
        }
    }

    /// Converts `width` leading bytes between host and target order in place.
    /// The conversion is its own inverse.
    pub fn fix(self, bytes: &mut [u8], width: usize) {
        let width = width.min(bytes.len());
        if width > 1 && self.needs_swap() {
            bytes[..width].reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_never_swaps() {
        let mut bytes = [1, 2, 3, 4];
        Endianness::Host.fix(&mut bytes, 4);
        assert_eq!(bytes, [1, 2, 3, 4]);
    }

    #[test]
    fn test_foreign_order_swaps_width_only() {
        let foreign = if cfg!(target_endian = "little") {
            Endianness::Big
        } else {
            Endianness::Little
        };
        let mut bytes = [1, 2, 3, 4, 5];
        foreign.fix(&mut bytes, 4);
        assert_eq!(bytes, [4, 3, 2, 1, 5]);
        foreign.fix(&mut bytes, 4);
        assert_eq!(bytes, [1, 2, 3, 4, 5]);
    }
}
