// Mon Oct 12 2026 - Alex

use crate::memory::{Address, Region};
use crate::store::{MatchArray, MatchArrayBuilder, MatchEntry, StoreError};
use log::debug;

/// Rebuilds `array` without the live matches inside `region`, or, with
/// `invert`, without those outside it. Returns the new array and how many
/// matches were dropped.
pub fn delete_by_region(array: &MatchArray, region: &Region, invert: bool) -> Result<(MatchArray, usize), StoreError> {
    delete_by_regions(array, std::slice::from_ref(region), invert)
}

/// Same as [`delete_by_region`] for a set of regions: a match is "inside"
/// when any of them contains it.
pub fn delete_by_regions(array: &MatchArray, regions: &[Region], invert: bool) -> Result<(MatchArray, usize), StoreError> {
    let inside = |address: Address| regions.iter().any(|r| r.contains(address));
    retain(array, |address, _| inside(address) == invert)
}

/// Rebuilds `array` keeping only the live matches accepted by `keep`.
/// Stored bytes trailing a kept match stay as placeholders so its value can
/// still be rebuilt.
pub fn retain<F>(array: &MatchArray, mut keep: F) -> Result<(MatchArray, usize), StoreError>
where
    F: FnMut(Address, &MatchEntry) -> bool,
{
    // never larger than the source
    let bound = array.bytes_in_use();
    let mut builder = MatchArrayBuilder::allocate(bound, bound)?;
    let mut removed = 0;
    let mut keep_until: Option<Address> = None;

    for swath in array.swaths() {
        for (index, entry) in swath.entries().iter().enumerate() {
            let address = swath.address_of(index);
            if entry.is_live() && keep(address, entry) {
                builder.append(address, *entry)?;
                let until = address + entry.flags.extent().max(1) as u64;
                keep_until = Some(keep_until.map_or(until, |k| k.max(until)));
                continue;
            }
            if entry.is_live() {
                removed += 1;
            }
            if keep_until.is_some_and(|k| address < k) {
                builder.append_placeholder(address, entry.old_value)?;
            }
        }
    }

    let rebuilt = builder.finalize();
    debug!("rebuilt match array: {} kept, {} removed, {} swaths", rebuilt.live_count(), removed, rebuilt.swath_count());
    Ok((rebuilt, removed))
}
