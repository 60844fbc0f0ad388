// Mon Oct 12 2026 - Alex

use crate::memory::{Address, AttachGuard, MemoryTarget, Region};
use crate::scan::{ScanError, ScanRequest};
use crate::store::{MatchArray, MatchArrayBuilder, ARRAY_HEADER_SIZE, ELEMENT_SIZE, SWATH_HEADER_SIZE};
use crate::utils::logging::ScopedTimer;
use crate::value::{compare_bytes, compare_numbers, MatchFlags, ScanTarget, Value};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, trace, warn};

/// Bytes requested from the target per read during an initial scan.
pub const CHUNK_SIZE: usize = 1 << 20;

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
    {
        bar.set_style(style.progress_chars("█▓▒░ "));
    }
    bar
}

/// Tracks how far the bytes of the last recorded match reach, so they can be
/// stored as placeholders behind it.
#[derive(Debug, Default)]
struct Trailing {
    until: Option<Address>,
}

impl Trailing {
    fn extend(&mut self, address: Address, flags: MatchFlags) {
        let until = address + flags.extent().max(1) as u64;
        self.until = Some(self.until.map_or(until, |u| u.max(until)));
    }

    fn covers(&self, address: Address) -> bool {
        self.until.is_some_and(|u| address < u)
    }
}

/// Evaluates the request at the start of `window`, the bytes available from
/// one address onwards.
fn evaluate(request: &ScanRequest, old: Option<&Value>, window: &[u8]) -> MatchFlags {
    match request.target {
        ScanTarget::Bytes(_) | ScanTarget::Text(_) => compare_bytes(window, &request.target),
        _ => {
            let new = Value::from_bytes(window).truncated(request.data_type.widths());
            MatchFlags::numeric(compare_numbers(
                request.match_type,
                old,
                &new,
                &request.target,
                request.endianness,
            ))
        }
    }
}

/// Upper bound on the bytes an initial scan over `regions` can need: one
/// element per scanned address plus a swath header per region and sentinel.
pub fn initial_bound(regions: &[Region]) -> usize {
    let total: u64 = regions.iter().map(|r| r.size()).sum();
    (total as usize)
        .saturating_mul(ELEMENT_SIZE)
        .saturating_add((regions.len() + 1) * SWATH_HEADER_SIZE)
        .saturating_add(ARRAY_HEADER_SIZE)
}

/// Scans every region from scratch and records each address that satisfies
/// the request.
pub fn build_array_from_scan<T: MemoryTarget + ?Sized>(
    target: &mut T,
    regions: &[Region],
    request: &ScanRequest,
) -> Result<MatchArray, ScanError> {
    request.validate(true)?;
    let _timer = ScopedTimer::new("initial scan");

    let mut builder = MatchArrayBuilder::with_bound(initial_bound(regions))?;
    let overlap = request.max_extent() - 1;
    let total: u64 = regions.iter().map(|r| r.size()).sum();
    let bar = progress_bar(total, request.show_progress);

    let mut target = AttachGuard::new(target)?;
    let mut unreadable = 0;

    for region in regions {
        trace!("scanning region {} at {} ({} bytes)", region.id(), region.start(), region.size());
        let size = region.size() as usize;
        let mut trailing = Trailing::default();
        let mut offset = 0;

        while offset < size {
            let step = CHUNK_SIZE.min(size - offset);
            let want = (step + overlap).min(size - offset);
            let data = match target.read_bytes(region.start() + offset as u64, want) {
                Ok(data) => data,
                Err(e) => {
                    warn!("region {} at {} is unreadable: {}", region.id(), region.start(), e);
                    if offset == 0 {
                        unreadable += 1;
                    }
                    break;
                }
            };

            let positions = step.min(data.len());
            for i in 0..positions {
                let address = region.start() + (offset + i) as u64;
                let flags = evaluate(request, None, &data[i..]);
                if flags.is_live() {
                    builder.append_match(address, data[i], flags)?;
                    trailing.extend(address, flags);
                } else if trailing.covers(address) {
                    builder.append_placeholder(address, data[i])?;
                }
            }

            bar.inc(step as u64);
            if data.len() < want {
                break;
            }
            offset += step;
        }
    }
    bar.finish_and_clear();

    if !regions.is_empty() && unreadable == regions.len() {
        return Err(ScanError::NothingReadable(regions.len()));
    }

    let array = builder.finalize();
    info!(
        "initial scan of {} regions found {} matches in {} swaths ({} bytes)",
        regions.len(),
        array.live_count(),
        array.swath_count(),
        array.bytes_in_use()
    );
    Ok(array)
}

/// Re-reads every swath of `previous` and keeps the matches that still
/// satisfy the request against their stored values. `previous` is left as
/// it was; the caller swaps in the result.
pub fn rescan<T: MemoryTarget + ?Sized>(
    target: &mut T,
    previous: &MatchArray,
    request: &ScanRequest,
) -> Result<MatchArray, ScanError> {
    request.validate(false)?;
    let _timer = ScopedTimer::new("rescan");

    let bound = previous.bytes_in_use();
    let mut builder = MatchArrayBuilder::allocate(bound, bound)?;
    let bar = progress_bar(previous.swath_count() as u64, request.show_progress);
    let slack = request.max_extent() - 1;

    let mut target = AttachGuard::new(target)?;
    let mut unreadable = 0;
    let mut trailing = Trailing::default();

    for swath in previous.swaths() {
        bar.inc(1);
        let data = match target.read_bytes(swath.base(), swath.len() + slack) {
            Ok(data) => data,
            Err(_) => match target.read_bytes(swath.base(), swath.len()) {
                Ok(data) => data,
                Err(e) => {
                    warn!("swath at {} ({} bytes) is unreadable: {}", swath.base(), swath.len(), e);
                    unreadable += 1;
                    continue;
                }
            },
        };

        for (index, entry) in swath.entries().iter().enumerate() {
            if index >= data.len() {
                break;
            }
            let address = swath.address_of(index);
            if entry.is_live() {
                let old = swath.materialize(index).truncated(entry.flags.widths());
                let flags = evaluate(request, Some(&old), &data[index..]);
                let flags = if flags.is_numeric() {
                    flags
                } else {
                    // the stored kind has to agree with the new one
                    flags.intersect(entry.flags.widths())
                };
                if flags.is_live() {
                    builder.append_match(address, data[index], flags)?;
                    trailing.extend(address, flags);
                    continue;
                }
            }
            if trailing.covers(address) {
                builder.append_placeholder(address, data[index])?;
            }
        }
    }
    bar.finish_and_clear();

    if previous.swath_count() > 0 && unreadable == previous.swath_count() {
        return Err(ScanError::NothingReadable(unreadable));
    }

    let array = builder.finalize();
    info!(
        "rescan kept {} of {} matches in {} swaths",
        array.live_count(),
        previous.live_count(),
        array.swath_count()
    );
    Ok(array)
}
