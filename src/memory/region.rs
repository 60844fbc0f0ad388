// Tue Jan 13 2026 - Alex

use crate::memory::{Address, MemoryRange, Protection};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionType {
    Misc,
    Exe,
    Code,
    Heap,
    Stack,
}

impl RegionType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Misc => "misc",
            Self::Exe => "exe",
            Self::Code => "code",
            Self::Heap => "heap",
            Self::Stack => "stack",
        }
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which mapped regions are candidates for scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegionScanLevel {
    /// Heap, stack and the executable's own writable mappings.
    HeapStackExecutable,
    /// As above, plus anonymous mappings directly following the executable.
    #[default]
    HeapStackExecutableBss,
    All,
}

impl RegionScanLevel {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::HeapStackExecutable),
            2 => Some(Self::HeapStackExecutableBss),
            3 => Some(Self::All),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Self::HeapStackExecutable => 1,
            Self::HeapStackExecutableBss => 2,
            Self::All => 3,
        }
    }
}

/// One mapping of the target's address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    id: u32,
    range: MemoryRange,
    load_addr: Address,
    protection: Protection,
    region_type: RegionType,
    filename: Option<String>,
}

impl Region {
    pub fn new(id: u32, range: MemoryRange, protection: Protection) -> Self {
        Self {
            id,
            range,
            load_addr: range.start(),
            protection,
            region_type: RegionType::Misc,
            filename: None,
        }
    }

    pub fn with_load_addr(mut self, load_addr: Address) -> Self {
        self.load_addr = load_addr;
        self
    }

    pub fn with_type(mut self, region_type: RegionType) -> Self {
        self.region_type = region_type;
        self
    }

    pub fn with_filename(mut self, filename: String) -> Self {
        self.filename = Some(filename);
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn range(&self) -> &MemoryRange {
        &self.range
    }

    pub fn start(&self) -> Address {
        self.range.start()
    }

    pub fn end(&self) -> Address {
        self.range.end()
    }

    pub fn size(&self) -> u64 {
        self.range.size()
    }

    /// Base that match offsets are reported against.
    pub fn load_addr(&self) -> Address {
        self.load_addr
    }

    pub fn protection(&self) -> Protection {
        self.protection
    }

    pub fn region_type(&self) -> RegionType {
        self.region_type
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.range.contains(addr)
    }

    pub fn is_readable(&self) -> bool {
        self.protection.can_read()
    }

    pub fn is_writable(&self) -> bool {
        self.protection.can_write()
    }

    /// Offset of `addr` relative to this region's load address.
    pub fn offset_of(&self, addr: Address) -> u64 {
        addr.as_u64().wrapping_sub(self.load_addr.as_u64())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:2}] {:12x}, {:7} bytes, {:>5}, {:12x}, {}, {}",
            self.id,
            self.start(),
            self.size(),
            self.region_type,
            self.load_addr,
            self.protection,
            self.filename.as_deref().unwrap_or("unassociated"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap() -> Region {
        Region::new(
            3,
            MemoryRange::from_start_size(Address::new(0x5000), 0x1000),
            Protection::ReadWrite,
        )
        .with_type(RegionType::Heap)
    }

    #[test]
    fn test_region_defaults_load_addr_to_start() {
        let region = heap();
        assert_eq!(region.load_addr(), Address::new(0x5000));
        assert_eq!(region.offset_of(Address::new(0x5010)), 0x10);
    }

    #[test]
    fn test_region_display() {
        let line = heap().with_filename("[heap]".to_string()).to_string();
        assert!(line.starts_with("[ 3]"));
        assert!(line.contains("4096 bytes"));
        assert!(line.contains("heap"));
        assert!(line.contains("rw-"));
    }

    #[test]
    fn test_scan_level_roundtrip() {
        for level in 1..=3 {
            assert_eq!(RegionScanLevel::from_level(level).unwrap().level(), level);
        }
        assert!(RegionScanLevel::from_level(0).is_none());
    }
}
