// Mon Oct 12 2026 - Alex

//! In-memory stand-in for a live process, used to drive scans in tests.

use crate::memory::{Address, MemoryError, MemoryRange, MemoryTarget, Protection, Region, RegionScanLevel, RegionType};
use std::collections::BTreeMap;

pub struct MockTarget {
    pid: i32,
    /// Byte image per region, keyed by region start.
    images: BTreeMap<u64, Vec<u8>>,
    regions: Vec<Region>,
    attached: bool,
    /// Reads overlapping this address fail.
    poisoned: Option<Address>,
    pub attach_count: usize,
    pub detach_count: usize,
    pub read_count: usize,
}

impl MockTarget {
    pub fn new(pid: i32) -> Self {
        Self {
            pid,
            images: BTreeMap::new(),
            regions: Vec::new(),
            attached: false,
            poisoned: None,
            attach_count: 0,
            detach_count: 0,
            read_count: 0,
        }
    }

    /// Maps `data` at `start` as a readable, writable heap region.
    pub fn with_region(mut self, start: u64, data: Vec<u8>) -> Self {
        let range = MemoryRange::from_start_size(Address::new(start), data.len() as u64);
        let region = Region::new(self.regions.len() as u32, range, Protection::ReadWrite)
            .with_type(RegionType::Heap);
        self.images.insert(start, data);
        self.regions.push(region);
        self.regions.sort_by_key(|r| r.start());
        self
    }

    pub fn poison(&mut self, addr: Address) {
        self.poisoned = Some(addr);
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Direct write that bypasses attach bookkeeping, for simulating the
    /// target changing its own memory between scans.
    pub fn poke(&mut self, addr: u64, data: &[u8]) {
        if let Some((start, image)) = self.images.range_mut(..=addr).next_back() {
            let offset = (addr - start) as usize;
            if offset + data.len() <= image.len() {
                image[offset..offset + data.len()].copy_from_slice(data);
            }
        }
    }

    pub fn peek(&self, addr: u64, len: usize) -> Option<&[u8]> {
        let (start, image) = self.images.range(..=addr).next_back()?;
        let offset = (addr - start) as usize;
        image.get(offset..offset + len)
    }
}

impl MemoryTarget for MockTarget {
    fn pid(&self) -> i32 {
        self.pid
    }

    fn attach(&mut self) -> Result<(), MemoryError> {
        self.attached = true;
        self.attach_count += 1;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), MemoryError> {
        self.attached = false;
        self.detach_count += 1;
        Ok(())
    }

    fn read_bytes(&mut self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        self.read_count += 1;
        if let Some(bad) = self.poisoned {
            if bad >= addr && bad.as_u64() < addr.as_u64().saturating_add(len as u64) {
                return Err(MemoryError::ReadFailed(addr.as_u64()));
            }
        }
        let (start, image) = self
            .images
            .range(..=addr.as_u64())
            .next_back()
            .ok_or(MemoryError::ReadFailed(addr.as_u64()))?;
        let offset = (addr.as_u64() - start) as usize;
        if offset >= image.len() {
            return Err(MemoryError::ReadFailed(addr.as_u64()));
        }
        let end = offset.saturating_add(len).min(image.len());
        Ok(image[offset..end].to_vec())
    }

    fn write_bytes(&mut self, addr: Address, data: &[u8]) -> Result<(), MemoryError> {
        let (start, image) = self
            .images
            .range_mut(..=addr.as_u64())
            .next_back()
            .ok_or(MemoryError::WriteFailed(addr.as_u64()))?;
        let offset = (addr.as_u64() - start) as usize;
        if offset + data.len() > image.len() {
            return Err(MemoryError::WriteFailed(addr.as_u64()));
        }
        image[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn read_regions(&mut self, _level: RegionScanLevel) -> Result<Vec<Region>, MemoryError> {
        Ok(self
            .regions
            .iter()
            .enumerate()
            .map(|(id, r)| {
                Region::new(id as u32, *r.range(), r.protection()).with_type(r.region_type())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_read_at_region_end() {
        let mut target = MockTarget::new(1).with_region(0x1000, vec![1, 2, 3, 4]);
        assert_eq!(target.read_bytes(Address::new(0x1002), 8).unwrap(), vec![3, 4]);
        assert!(target.read_bytes(Address::new(0x1004), 1).is_err());
        assert!(target.read_bytes(Address::new(0x0fff), 1).is_err());
    }

    #[test]
    fn test_write_then_peek() {
        let mut target = MockTarget::new(1).with_region(0x1000, vec![0; 8]);
        target.write_bytes(Address::new(0x1004), &[9, 9]).unwrap();
        assert_eq!(target.peek(0x1003, 3).unwrap(), &[0, 9, 9]);
        assert!(target.write_bytes(Address::new(0x1007), &[1, 2]).is_err());
    }

    #[test]
    fn test_poisoned_read_fails() {
        let mut target = MockTarget::new(1).with_region(0x1000, vec![0; 16]);
        target.poison(Address::new(0x1008));
        assert!(target.read_bytes(Address::new(0x1000), 16).is_err());
        assert!(target.read_bytes(Address::new(0x1000), 8).is_ok());
    }
}
