// Mon Oct 12 2026 - Alex

use crate::memory::{Address, Region};
use crate::store::{MatchArray, MatchLocation};

/// Location of the `n`th live match (0-based), skipping placeholders.
pub fn nth(array: &MatchArray, n: usize) -> Option<MatchLocation> {
    if n >= array.live_count() {
        return None;
    }
    let mut seen = 0;
    for swath in array.swaths() {
        for (index, entry) in swath.entries().iter().enumerate() {
            if !entry.is_live() {
                continue;
            }
            if seen == n {
                return Some(swath.location(index));
            }
            seen += 1;
        }
    }
    None
}

/// First region containing `address`. Only used for display.
pub fn locate_region(address: Address, regions: &[Region]) -> Option<&Region> {
    regions.iter().find(|region| region.contains(address))
}
