// Wed Jan 15 2026 - Alex

use crate::memory::{Address, MemoryError, Region, RegionScanLevel};
use std::ops::{Deref, DerefMut};

/// Everything the scanner needs from the process being inspected.
///
/// Reads may come back shorter than requested when the tail of the range is
/// not mapped; callers treat the returned length as the bytes actually known.
pub trait MemoryTarget {
    fn pid(&self) -> i32;
    fn attach(&mut self) -> Result<(), MemoryError>;
    fn detach(&mut self) -> Result<(), MemoryError>;
    fn read_bytes(&mut self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError>;
    fn write_bytes(&mut self, addr: Address, data: &[u8]) -> Result<(), MemoryError>;

    /// Enumerates scan candidates in ascending, non-overlapping order.
    fn read_regions(&mut self, level: RegionScanLevel) -> Result<Vec<Region>, MemoryError>;
}

/// Keeps the target attached for as long as the guard lives.
pub struct AttachGuard<'a, T: MemoryTarget + ?Sized> {
    target: &'a mut T,
}

impl<'a, T: MemoryTarget + ?Sized> AttachGuard<'a, T> {
    pub fn new(target: &'a mut T) -> Result<Self, MemoryError> {
        target.attach()?;
        Ok(Self { target })
    }
}

impl<T: MemoryTarget + ?Sized> Deref for AttachGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.target
    }
}

impl<T: MemoryTarget + ?Sized> DerefMut for AttachGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.target
    }
}

impl<T: MemoryTarget + ?Sized> Drop for AttachGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.target.detach() {
            log::warn!("detach from {} failed: {}", self.target.pid(), e);
        }
    }
}
