// Tue Jan 13 2026 - Alex

use crate::memory::Address;
use std::fmt;

/// Half-open address range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange {
    start: Address,
    end: Address,
}

impl MemoryRange {
    pub fn new(start: Address, end: Address) -> Self {
        let end = if end < start { start } else { end };
        Self { start, end }
    }

    pub fn from_start_size(start: Address, size: u64) -> Self {
        Self::new(start, Address::new(start.as_u64().saturating_add(size)))
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    pub fn size(&self) -> u64 {
        self.end.as_u64() - self.start.as_u64()
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr.is_within_range(self.start, self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let range = MemoryRange::from_start_size(Address::new(15), 20);
        assert!(!range.contains(Address::new(14)));
        assert!(range.contains(Address::new(15)));
        assert!(range.contains(Address::new(34)));
        assert!(!range.contains(Address::new(35)));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = MemoryRange::new(Address::new(10), Address::new(5));
        assert!(range.is_empty());
        assert_eq!(range.size(), 0);
    }
}
