// Mon Oct 12 2026 - Alex

use crate::memory::Address;
use crate::store::StoreError;
use crate::value::{MatchFlags, Value};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// Accounted size of the array header (allocated bytes + bound).
pub const ARRAY_HEADER_SIZE: usize = 16;
/// Accounted size of one swath header (base address + element count).
/// The terminating sentinel is charged one of these too.
pub const SWATH_HEADER_SIZE: usize = 16;
pub const ELEMENT_SIZE: usize = std::mem::size_of::<MatchEntry>();

const DEFAULT_CAPACITY: usize = 4096;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// One target address: the byte seen there last and what it may still be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchEntry {
    pub old_value: u8,
    pub flags: MatchFlags,
}

impl MatchEntry {
    pub fn new(old_value: u8, flags: MatchFlags) -> Self {
        Self { old_value, flags }
    }

    pub fn placeholder(old_value: u8) -> Self {
        Self { old_value, flags: MatchFlags::EMPTY }
    }

    pub fn is_live(&self) -> bool {
        self.flags.is_live()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Swath {
    base: Address,
    start: usize,
    len: usize,
}

/// Handle to one live match, valid for the array generation it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchLocation {
    generation: u64,
    swath: usize,
    index: usize,
}

impl MatchLocation {
    pub fn swath(&self) -> usize {
        self.swath
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Sparse record of every address still matching the search.
///
/// Entries live in one flat arena; each swath describes a contiguous run of
/// target addresses as a slice of it. A new scan produces a new array, so
/// every array gets its own generation and locations from older arrays are
/// refused.
#[derive(Debug, Clone)]
pub struct MatchArray {
    entries: Vec<MatchEntry>,
    swaths: Vec<Swath>,
    bytes_allocated: usize,
    max_bound: usize,
    live: usize,
    generation: u64,
}

impl MatchArray {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn swath_count(&self) -> usize {
        self.swaths.len()
    }

    /// Bytes the current contents account for, sentinel included.
    pub fn bytes_in_use(&self) -> usize {
        used_bytes(self.swaths.len(), self.entries.len())
    }

    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    pub fn max_bound(&self) -> usize {
        self.max_bound
    }

    pub fn swaths(&self) -> impl Iterator<Item = SwathRef<'_>> {
        (0..self.swaths.len()).map(move |index| SwathRef { array: self, index })
    }

    pub fn swath(&self, index: usize) -> Option<SwathRef<'_>> {
        (index < self.swaths.len()).then_some(SwathRef { array: self, index })
    }

    /// Every live match in address order.
    pub fn matches(&self) -> impl Iterator<Item = (MatchLocation, Address, MatchEntry)> + '_ {
        self.swaths().flat_map(|swath| {
            swath
                .entries()
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.is_live())
                .map(move |(index, entry)| (swath.location(index), swath.address_of(index), *entry))
        })
    }

    pub(crate) fn location(&self, swath: usize, index: usize) -> MatchLocation {
        MatchLocation { generation: self.generation, swath, index }
    }

    fn resolve(&self, loc: MatchLocation) -> Result<(Swath, usize), StoreError> {
        if loc.generation != self.generation {
            return Err(StoreError::StaleLocation);
        }
        let swath = *self.swaths.get(loc.swath).ok_or(StoreError::IndexOutOfRange)?;
        if loc.index >= swath.len {
            return Err(StoreError::IndexOutOfRange);
        }
        Ok((swath, swath.start + loc.index))
    }

    pub fn entry(&self, loc: MatchLocation) -> Result<MatchEntry, StoreError> {
        let (_, slot) = self.resolve(loc)?;
        Ok(self.entries[slot])
    }

    pub fn address_of(&self, loc: MatchLocation) -> Result<Address, StoreError> {
        let (swath, _) = self.resolve(loc)?;
        Ok(swath.base + loc.index as u64)
    }

    /// The stored value at `loc`, narrowed to the widths still recorded for it.
    pub fn value_at(&self, loc: MatchLocation) -> Result<Value, StoreError> {
        let entry = self.entry(loc)?;
        if !entry.is_live() {
            return Err(StoreError::NotALiveMatch);
        }
        let swath = SwathRef { array: self, index: loc.swath };
        Ok(swath.materialize(loc.index).truncated(entry.flags.widths()))
    }

    /// Up to `len` stored bytes starting at `loc`, stopping at the swath end.
    pub fn old_bytes(&self, loc: MatchLocation, len: usize) -> Result<Vec<u8>, StoreError> {
        let (swath, slot) = self.resolve(loc)?;
        let end = (swath.start + swath.len).min(slot.saturating_add(len));
        Ok(self.entries[slot..end].iter().map(|e| e.old_value).collect())
    }

    /// Turns a live match into a placeholder. The layout is untouched, so
    /// other locations stay valid.
    pub fn zero_out(&mut self, loc: MatchLocation) -> Result<(), StoreError> {
        let (_, slot) = self.resolve(loc)?;
        let entry = &mut self.entries[slot];
        if !entry.is_live() {
            return Err(StoreError::NotALiveMatch);
        }
        entry.flags.clear();
        self.live -= 1;
        Ok(())
    }
}

/// Borrowed view of one swath.
#[derive(Debug, Clone, Copy)]
pub struct SwathRef<'a> {
    array: &'a MatchArray,
    index: usize,
}

impl<'a> SwathRef<'a> {
    fn raw(&self) -> Swath {
        self.array.swaths[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn base(&self) -> Address {
        self.raw().base
    }

    pub fn len(&self) -> usize {
        self.raw().len
    }

    pub fn is_empty(&self) -> bool {
        self.raw().len == 0
    }

    pub fn end(&self) -> Address {
        self.base() + self.len() as u64
    }

    pub fn entries(&self) -> &'a [MatchEntry] {
        let swath = self.raw();
        &self.array.entries[swath.start..swath.start + swath.len]
    }

    pub fn address_of(&self, index: usize) -> Address {
        self.base() + index as u64
    }

    pub fn location(&self, index: usize) -> MatchLocation {
        self.array.location(self.index, index)
    }

    /// Rebuilds up to eight stored bytes from `index`, never reading past the
    /// end of the swath. Only widths fully covered by those bytes are set.
    pub fn materialize(&self, index: usize) -> Value {
        let entries = self.entries();
        if index >= entries.len() {
            return Value::default();
        }
        let end = entries.len().min(index + 8);
        let mut bytes = [0u8; 8];
        for (dst, entry) in bytes.iter_mut().zip(&entries[index..end]) {
            *dst = entry.old_value;
        }
        Value::from_bytes(&bytes[..end - index])
    }
}

fn used_bytes(swaths: usize, entries: usize) -> usize {
    ARRAY_HEADER_SIZE + (swaths + 1) * SWATH_HEADER_SIZE + entries * ELEMENT_SIZE
}

/// Builds a `MatchArray` from matches appended in ascending address order.
#[derive(Debug)]
pub struct MatchArrayBuilder {
    entries: Vec<MatchEntry>,
    swaths: Vec<Swath>,
    bytes_allocated: usize,
    max_bound: usize,
    live: usize,
}

impl MatchArrayBuilder {
    /// Reserves room for `initial_capacity` bytes of swath data on top of the
    /// headers; growth never goes past `max_bound` bytes.
    pub fn allocate(initial_capacity: usize, max_bound: usize) -> Result<Self, StoreError> {
        let minimum = used_bytes(0, 0);
        if minimum > max_bound {
            return Err(StoreError::AllocationFailed { needed: minimum, bound: max_bound });
        }
        let bytes_allocated = minimum.saturating_add(initial_capacity).min(max_bound);
        let mut entries = Vec::new();
        entries
            .try_reserve((bytes_allocated - minimum) / ELEMENT_SIZE)
            .map_err(|_| StoreError::AllocationFailed { needed: bytes_allocated, bound: max_bound })?;

        Ok(Self {
            entries,
            swaths: Vec::new(),
            bytes_allocated,
            max_bound,
            live: 0,
        })
    }

    /// Bounded by `max_bound` only, starting from a modest allocation.
    pub fn with_bound(max_bound: usize) -> Result<Self, StoreError> {
        Self::allocate(DEFAULT_CAPACITY, max_bound)
    }

    pub fn bytes_in_use(&self) -> usize {
        used_bytes(self.swaths.len(), self.entries.len())
    }

    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Appends one address. A gap after the tail swath is padded with
    /// placeholders when that costs no more than a new swath header.
    pub fn append(&mut self, address: Address, entry: MatchEntry) -> Result<(), StoreError> {
        let Some(tail) = self.swaths.last().copied() else {
            return self.open_swath(address, entry);
        };

        let next = tail.base + tail.len as u64;
        if address < next {
            return Err(StoreError::OutOfOrder { last: next - 1, next: address });
        }

        let gap = next.distance_to(address);
        if gap == 0 {
            self.reserve(ELEMENT_SIZE)?;
        } else if gap.saturating_mul(ELEMENT_SIZE as u64) <= SWATH_HEADER_SIZE as u64 {
            let gap = gap as usize;
            self.reserve((gap + 1) * ELEMENT_SIZE)?;
            self.entries.extend(std::iter::repeat(MatchEntry::default()).take(gap));
            self.extend_tail(gap);
        } else {
            return self.open_swath(address, entry);
        }

        self.entries.push(entry);
        self.extend_tail(1);
        if entry.is_live() {
            self.live += 1;
        }
        Ok(())
    }

    pub fn append_match(&mut self, address: Address, old_value: u8, flags: MatchFlags) -> Result<(), StoreError> {
        self.append(address, MatchEntry::new(old_value, flags))
    }

    pub fn append_placeholder(&mut self, address: Address, old_value: u8) -> Result<(), StoreError> {
        self.append(address, MatchEntry::placeholder(old_value))
    }

    fn open_swath(&mut self, address: Address, entry: MatchEntry) -> Result<(), StoreError> {
        self.reserve(SWATH_HEADER_SIZE + ELEMENT_SIZE)?;
        if !self.swaths.is_empty() {
            debug!("opening swath {} at {}", self.swaths.len(), address);
        }
        self.swaths.push(Swath {
            base: address,
            start: self.entries.len(),
            len: 1,
        });
        self.entries.push(entry);
        if entry.is_live() {
            self.live += 1;
        }
        Ok(())
    }

    fn extend_tail(&mut self, by: usize) {
        if let Some(tail) = self.swaths.last_mut() {
            tail.len += by;
        }
    }

    /// Makes room for `extra` more bytes, doubling the allocation until it
    /// fits and clamping to the bound. Leaves everything untouched on failure.
    fn reserve(&mut self, extra: usize) -> Result<(), StoreError> {
        let needed = self.bytes_in_use() + extra;
        if needed <= self.bytes_allocated {
            return Ok(());
        }
        if needed > self.max_bound {
            return Err(StoreError::AllocationFailed { needed, bound: self.max_bound });
        }

        let mut size = self.bytes_allocated.max(1);
        while size < needed {
            size = size.saturating_mul(2);
        }
        let size = size.min(self.max_bound);

        let capacity = (size - used_bytes(self.swaths.len(), 0)) / ELEMENT_SIZE;
        let additional = capacity.saturating_sub(self.entries.len());
        self.entries
            .try_reserve(additional)
            .map_err(|_| StoreError::AllocationFailed { needed: size, bound: self.max_bound })?;

        debug!("match array grew from {} to {} bytes", self.bytes_allocated, size);
        self.bytes_allocated = size;
        Ok(())
    }

    /// Seals the array and gives it a fresh generation.
    pub fn finalize(self) -> MatchArray {
        MatchArray {
            entries: self.entries,
            swaths: self.swaths,
            bytes_allocated: self.bytes_allocated,
            max_bound: self.max_bound,
            live: self.live,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::nth;
    use crate::value::Widths;

    fn addr(v: u64) -> Address {
        Address::new(v)
    }

    fn unbounded() -> MatchArrayBuilder {
        MatchArrayBuilder::with_bound(usize::MAX).unwrap()
    }

    #[test]
    fn test_entry_size_is_small() {
        assert_eq!(ELEMENT_SIZE, 6);
    }

    #[test]
    fn test_round_trip_through_nth() {
        let input: Vec<(u64, u8, Widths)> = vec![
            (0x1000, 7, Widths::INT8),
            (0x1001, 8, Widths::U8),
            (0x1003, 9, Widths::S8),
            (0x2000, 10, Widths::INT8 | Widths::INT16),
            (0x9000, 11, Widths::U8),
        ];
        let mut builder = unbounded();
        for (a, byte, widths) in &input {
            builder.append_match(addr(*a), *byte, MatchFlags::numeric(*widths)).unwrap();
        }
        let array = builder.finalize();
        assert_eq!(array.live_count(), input.len());

        for (i, (a, byte, widths)) in input.iter().enumerate() {
            let loc = nth(&array, i).unwrap();
            assert_eq!(array.address_of(loc).unwrap(), addr(*a));
            let entry = array.entry(loc).unwrap();
            assert_eq!(entry.old_value, *byte);
            assert_eq!(entry.flags.widths(), *widths);
        }
        assert!(nth(&array, input.len()).is_none());
    }

    fn swaths_for_gap(skipped: u64) -> MatchArray {
        let mut builder = unbounded();
        builder.append_match(addr(100), 1, Widths::U8.into()).unwrap();
        builder.append_match(addr(100 + skipped + 1), 2, Widths::U8.into()).unwrap();
        builder.finalize()
    }

    #[test]
    fn test_pad_threshold() {
        // largest gap whose placeholders cost no more than a header
        let pad_gap = (SWATH_HEADER_SIZE / ELEMENT_SIZE) as u64;

        let array = swaths_for_gap(pad_gap);
        assert_eq!(array.swath_count(), 1);
        let swath = array.swath(0).unwrap();
        assert_eq!(swath.len() as u64, pad_gap + 2);
        assert_eq!(swath.entries().iter().filter(|e| e.is_live()).count(), 2);

        let array = swaths_for_gap(pad_gap + 1);
        assert_eq!(array.swath_count(), 2);
        assert_eq!(array.live_count(), 2);
        assert_eq!(array.swath(1).unwrap().base(), addr(100 + pad_gap + 2));
    }

    #[test]
    fn test_adjacent_extends() {
        let array = swaths_for_gap(0);
        assert_eq!(array.swath_count(), 1);
        assert_eq!(array.swath(0).unwrap().len(), 2);
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut builder = unbounded();
        builder.append_match(addr(10), 1, Widths::U8.into()).unwrap();
        let err = builder.append_match(addr(10), 1, Widths::U8.into()).unwrap_err();
        assert_eq!(err, StoreError::OutOfOrder { last: addr(10), next: addr(10) });
        assert!(builder.append_match(addr(5), 1, Widths::U8.into()).is_err());
        assert_eq!(builder.live_count(), 1);
    }

    #[test]
    fn test_bound_respected() {
        let bound = used_bytes(1, 4);
        let mut builder = MatchArrayBuilder::allocate(0, bound).unwrap();
        for a in 0..4 {
            builder.append_match(addr(a), 0, Widths::U8.into()).unwrap();
            assert!(builder.bytes_allocated() <= bound);
        }
        let before = (builder.bytes_in_use(), builder.bytes_allocated(), builder.live_count());
        let err = builder.append_match(addr(4), 0, Widths::U8.into()).unwrap_err();
        assert!(matches!(err, StoreError::AllocationFailed { bound: b, .. } if b == bound));
        assert_eq!(before, (builder.bytes_in_use(), builder.bytes_allocated(), builder.live_count()));

        let array = builder.finalize();
        assert_eq!(array.live_count(), 4);
        assert!(array.bytes_allocated() <= bound);
    }

    #[test]
    fn test_allocate_below_minimum_fails() {
        assert!(MatchArrayBuilder::allocate(0, ARRAY_HEADER_SIZE).is_err());
    }

    #[test]
    fn test_growth_doubles() {
        let mut builder = MatchArrayBuilder::allocate(0, usize::MAX).unwrap();
        let start = builder.bytes_allocated();
        for a in 0..64 {
            builder.append_match(addr(a), 0, Widths::U8.into()).unwrap();
        }
        let grown = builder.bytes_allocated();
        assert!(grown >= builder.bytes_in_use());
        assert!((grown / start).is_power_of_two());
    }

    #[test]
    fn test_materialize_stops_at_swath_end() {
        let mut builder = unbounded();
        builder.append_match(addr(0x500), 0x11, Widths::all().into()).unwrap();
        builder.append_placeholder(addr(0x501), 0x22).unwrap();
        builder.append_placeholder(addr(0x502), 0x33).unwrap();
        // far away, so it lands in its own swath
        builder.append_match(addr(0x5000), 0x44, Widths::U8.into()).unwrap();
        let array = builder.finalize();
        assert_eq!(array.swath_count(), 2);

        let swath = array.swath(0).unwrap();
        let value = swath.materialize(0);
        assert_eq!(value.bytes(), &[0x11, 0x22, 0x33]);
        assert_eq!(value.widths(), Widths::INT8 | Widths::INT16);

        let loc = nth(&array, 0).unwrap();
        let stored = array.value_at(loc).unwrap();
        assert_eq!(stored.widths(), Widths::INT8 | Widths::INT16);
        assert_eq!(array.old_bytes(loc, 8).unwrap(), vec![0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_zero_out_keeps_locations() {
        let mut builder = unbounded();
        builder.append_match(addr(1), 1, Widths::U8.into()).unwrap();
        builder.append_match(addr(2), 2, Widths::U8.into()).unwrap();
        let mut array = builder.finalize();
        let first = nth(&array, 0).unwrap();
        let second = nth(&array, 1).unwrap();

        array.zero_out(first).unwrap();
        assert_eq!(array.live_count(), 1);
        assert_eq!(array.zero_out(first), Err(StoreError::NotALiveMatch));
        assert_eq!(array.entry(second).unwrap().old_value, 2);
        assert_eq!(nth(&array, 0), Some(second));
    }

    #[test]
    fn test_stale_location_refused() {
        let mut builder = unbounded();
        builder.append_match(addr(1), 1, Widths::U8.into()).unwrap();
        let old = builder.finalize();
        let loc = nth(&old, 0).unwrap();

        let mut builder = unbounded();
        builder.append_match(addr(1), 1, Widths::U8.into()).unwrap();
        let new = builder.finalize();
        assert_ne!(old.generation(), new.generation());
        assert_eq!(new.entry(loc), Err(StoreError::StaleLocation));
        assert!(old.entry(loc).is_ok());
    }

    #[test]
    fn test_empty_array() {
        let array = unbounded().finalize();
        assert!(array.is_empty());
        assert_eq!(array.swath_count(), 0);
        assert_eq!(array.bytes_in_use(), ARRAY_HEADER_SIZE + SWATH_HEADER_SIZE);
        assert_eq!(array.matches().count(), 0);
    }
}
