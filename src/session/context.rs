// Mon Oct 12 2026 - Alex

use crate::config::Options;
use crate::memory::{Address, AttachGuard, MemoryError, MemoryTarget, Region};
use crate::scan::{build_array_from_scan, rescan, ScanRequest};
use crate::session::{CancellationToken, SessionError};
use crate::store::{delete_by_regions, nth, MatchArray, MatchLocation};
use crate::value::{ScanMatchType, ScanTarget};
use log::info;

/// Opens a target for a pid, used by `pid <n>`.
pub type Connector<T> = fn(i32) -> Result<T, MemoryError>;

/// Everything one operator works with: the target, its regions, the current
/// match set and the options.
pub struct Session<T: MemoryTarget> {
    target: Option<T>,
    connector: Option<Connector<T>>,
    regions: Vec<Region>,
    matches: Option<MatchArray>,
    options: Options,
    cancel: CancellationToken,
    exit_requested: bool,
}

impl<T: MemoryTarget> Session<T> {
    pub fn new(options: Options) -> Self {
        Self {
            target: None,
            connector: None,
            regions: Vec::new(),
            matches: None,
            options,
            cancel: CancellationToken::new(),
            exit_requested: false,
        }
    }

    pub fn with_connector(mut self, connector: Connector<T>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Switches to `target`, dropping any previous target and matches.
    pub fn open(&mut self, target: T) -> Result<(), SessionError> {
        self.close();
        self.target = Some(target);
        self.reset()
    }

    /// Opens the process `pid` through the configured connector.
    pub fn open_pid(&mut self, pid: i32) -> Result<(), SessionError> {
        let connector = self
            .connector
            .ok_or_else(|| SessionError::Unsupported("changing the target".to_string()))?;
        let target = connector(pid)?;
        self.open(target)
    }

    /// Forgets all matches and re-reads the region list.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.matches = None;
        self.regions.clear();
        let level = self.options.region_scan_level;
        let target = self.target_mut()?;
        let regions = target.read_regions(level)?;
        info!("{} suitable regions found in process {}", regions.len(), target.pid());
        self.regions = regions;
        Ok(())
    }

    pub fn close(&mut self) -> Option<T> {
        self.matches = None;
        self.regions.clear();
        self.target.take()
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn target_mut(&mut self) -> Result<&mut T, SessionError> {
        self.target.as_mut().ok_or(SessionError::NoTarget)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn matches(&self) -> Option<&MatchArray> {
        self.matches.as_ref()
    }

    pub fn match_count(&self) -> usize {
        self.matches.as_ref().map_or(0, |m| m.live_count())
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// A request carrying the session's data type, byte order and progress
    /// settings.
    pub fn request(&self, match_type: ScanMatchType, target: ScanTarget) -> ScanRequest {
        ScanRequest::new(match_type, target)
            .with_data_type(self.options.scan_data_type)
            .with_endianness(self.options.endianness)
            .with_progress(self.options.show_progress && atty::is(atty::Stream::Stdout))
    }

    /// Runs `request` as an initial scan when there are no matches yet and
    /// as a narrowing scan otherwise. The match set is replaced only on
    /// success. Returns the number of matches left.
    pub fn scan(&mut self, request: &ScanRequest) -> Result<usize, SessionError> {
        let target = self.target.as_mut().ok_or(SessionError::NoTarget)?;
        let next = match &self.matches {
            Some(previous) => rescan(target, previous, request)?,
            None => build_array_from_scan(target, &self.regions, request)?,
        };
        Ok(self.replace_matches(next))
    }

    /// Rescans the current matches with "any", refreshing stored values.
    pub fn update(&mut self) -> Result<usize, SessionError> {
        if self.matches.is_none() {
            return Err(SessionError::NoMatches);
        }
        let request = self.request(ScanMatchType::Any, ScanTarget::None);
        self.scan(&request)
    }

    /// Records every address in every region, starting over.
    pub fn snapshot(&mut self) -> Result<usize, SessionError> {
        self.matches = None;
        let request = self.request(ScanMatchType::Any, ScanTarget::None);
        self.scan(&request)
    }

    fn replace_matches(&mut self, next: MatchArray) -> usize {
        let count = next.live_count();
        self.matches = if count == 0 { None } else { Some(next) };
        count
    }

    pub fn nth(&self, n: usize) -> Result<MatchLocation, SessionError> {
        let matches = self.matches.as_ref().ok_or(SessionError::NoMatches)?;
        nth(matches, n).ok_or(SessionError::InvalidMatchId(n))
    }

    /// Drops match `n` in place.
    pub fn delete_match(&mut self, n: usize) -> Result<(), SessionError> {
        let loc = self.nth(n)?;
        let matches = self.matches.as_mut().ok_or(SessionError::NoMatches)?;
        matches.zero_out(loc)?;
        if matches.is_empty() {
            self.matches = None;
        }
        Ok(())
    }

    /// Removes the regions with the given ids (or, with `invert`, all the
    /// others) together with their matches. Returns how many matches went.
    pub fn delete_regions(&mut self, ids: &[u32], invert: bool) -> Result<usize, SessionError> {
        if let Some(missing) = ids.iter().find(|id| !self.regions.iter().any(|r| r.id() == **id)) {
            return Err(SessionError::UnknownRegion(*missing));
        }

        let selected: Vec<Region> = self.regions.iter().filter(|r| ids.contains(&r.id())).cloned().collect();
        let rebuilt = match &self.matches {
            Some(matches) => Some(delete_by_regions(matches, &selected, invert)?),
            None => None,
        };
        let removed = match rebuilt {
            Some((array, count)) => {
                self.replace_matches(array);
                count
            }
            None => 0,
        };

        self.regions.retain(|r| ids.contains(&r.id()) == invert);
        info!("{} regions left, {} matches removed", self.regions.len(), removed);
        Ok(removed)
    }

    /// Reads `len` bytes with the target attached for the duration.
    pub fn read_at(&mut self, address: Address, len: usize) -> Result<Vec<u8>, SessionError> {
        let target = self.target_mut()?;
        let mut guard = AttachGuard::new(target)?;
        Ok(guard.read_bytes(address, len)?)
    }

    pub fn write_at(&mut self, address: Address, data: &[u8]) -> Result<(), SessionError> {
        let target = self.target_mut()?;
        let mut guard = AttachGuard::new(target)?;
        Ok(guard.write_bytes(address, data)?)
    }
}
