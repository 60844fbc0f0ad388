// Mon Oct 12 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRange, Protection, Region, RegionScanLevel, RegionType};
use std::collections::HashMap;
use std::path::PathBuf;

/// One parsed line of `/proc/<pid>/maps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsEntry {
    pub start: u64,
    pub end: u64,
    pub perms: String,
    pub offset: u64,
    pub path: Option<String>,
}

impl MapsEntry {
    pub fn parse(line: &str) -> Result<Self, MemoryError> {
        let malformed = || MemoryError::MalformedMaps(line.to_string());
        let mut parts = line.split_whitespace();

        let (start, end) = parts.next().and_then(|r| r.split_once('-')).ok_or_else(malformed)?;
        let start = u64::from_str_radix(start, 16).map_err(|_| malformed())?;
        let end = u64::from_str_radix(end, 16).map_err(|_| malformed())?;
        let perms = parts.next().ok_or_else(malformed)?.to_string();
        let offset = parts
            .next()
            .and_then(|s| u64::from_str_radix(s, 16).ok())
            .ok_or_else(malformed)?;

        // device and inode
        parts.next().ok_or_else(malformed)?;
        parts.next().ok_or_else(malformed)?;

        let path: Vec<&str> = parts.collect();
        let path = if path.is_empty() { None } else { Some(path.join(" ")) };

        Ok(Self { start, end, perms, offset, path })
    }
}

/// Turns the maps text of a process into the ordered list of scan candidates.
///
/// Only readable and writable mappings are kept; `exe_path` identifies the
/// mappings that belong to the main executable. Ids are assigned in address
/// order over the regions that survive filtering.
pub fn parse_maps(
    content: &str,
    exe_path: Option<&str>,
    level: RegionScanLevel,
) -> Result<Vec<Region>, MemoryError> {
    let mut regions = Vec::new();
    let mut load_addrs: HashMap<String, u64> = HashMap::new();
    let mut prev_end = 0u64;
    let mut prev_was_exe = false;

    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let entry = MapsEntry::parse(line)?;

        let region_type = match entry.path.as_deref() {
            Some("[heap]") => RegionType::Heap,
            Some("[stack]") => RegionType::Stack,
            Some(path) if Some(path) == exe_path => RegionType::Exe,
            Some(path) if !path.starts_with('[') => RegionType::Code,
            _ => RegionType::Misc,
        };

        let load_addr = match entry.path.as_deref() {
            Some(path) if !path.starts_with('[') => *load_addrs
                .entry(path.to_string())
                .or_insert(entry.start - entry.offset.min(entry.start)),
            _ => entry.start,
        };

        let is_bss = entry.path.is_none() && prev_was_exe && prev_end == entry.start;
        prev_was_exe = region_type == RegionType::Exe;
        prev_end = entry.end;

        let protection = Protection::from_perms(&entry.perms);
        if !protection.can_read() || !protection.can_write() || entry.end <= entry.start {
            continue;
        }

        let wanted = match level {
            RegionScanLevel::HeapStackExecutable => {
                matches!(region_type, RegionType::Heap | RegionType::Stack | RegionType::Exe)
            }
            RegionScanLevel::HeapStackExecutableBss => {
                matches!(region_type, RegionType::Heap | RegionType::Stack | RegionType::Exe) || is_bss
            }
            RegionScanLevel::All => true,
        };
        if !wanted {
            log::trace!("skipping {:x}-{:x} {:?}", entry.start, entry.end, entry.path);
            continue;
        }

        let range = MemoryRange::new(Address::new(entry.start), Address::new(entry.end));
        let mut region = Region::new(regions.len() as u32, range, protection)
            .with_type(region_type)
            .with_load_addr(Address::new(load_addr));
        if let Some(path) = entry.path {
            region = region.with_filename(path);
        }
        regions.push(region);
    }

    Ok(regions)
}

/// Reads and filters the live maps of `pid`.
pub fn read_maps(pid: i32, level: RegionScanLevel) -> Result<Vec<Region>, MemoryError> {
    let maps_path = format!("/proc/{}/maps", pid);
    let content = std::fs::read_to_string(&maps_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MemoryError::ProcessNotFound(format!("no such process {}", pid))
        } else {
            MemoryError::Io(e)
        }
    })?;

    let exe_path = std::fs::read_link(format!("/proc/{}/exe", pid))
        .ok()
        .map(|p: PathBuf| p.to_string_lossy().into_owned());

    let regions = parse_maps(&content, exe_path.as_deref(), level)?;
    log::debug!("{} candidate regions in {}", regions.len(), maps_path);
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPS: &str = "\
55d0c0a00000-55d0c0a02000 r--p 00000000 08:01 1234 /usr/bin/game
55d0c0a02000-55d0c0a05000 r-xp 00002000 08:01 1234 /usr/bin/game
55d0c0a05000-55d0c0a06000 rw-p 00005000 08:01 1234 /usr/bin/game
55d0c0a06000-55d0c0a08000 rw-p 00000000 00:00 0
55d0c1000000-55d0c1021000 rw-p 00000000 00:00 0 [heap]
7f0000000000-7f0000001000 rw-p 00000000 00:00 0
7f0000100000-7f0000101000 rw-p 0001c000 08:01 99 /usr/lib/libc.so.6
7ffc00000000-7ffc00021000 rw-p 00000000 00:00 0 [stack]
7ffc00100000-7ffc00102000 r--p 00000000 00:00 0 [vvar]
";

    #[test]
    fn test_parse_entry() {
        let entry = MapsEntry::parse("00400000-00452000 r-xp 00000000 08:02 173521 /usr/bin/my app").unwrap();
        assert_eq!(entry.start, 0x400000);
        assert_eq!(entry.end, 0x452000);
        assert_eq!(entry.perms, "r-xp");
        assert_eq!(entry.path.as_deref(), Some("/usr/bin/my app"));

        let anon = MapsEntry::parse("7f0000000000-7f0000001000 rw-p 00000000 00:00 0").unwrap();
        assert!(anon.path.is_none());
    }

    #[test]
    fn test_parse_entry_rejects_garbage() {
        assert!(MapsEntry::parse("not a maps line").is_err());
        assert!(MapsEntry::parse("1000-zz r--p 0 0 0").is_err());
    }

    #[test]
    fn test_level_one_keeps_heap_stack_exe() {
        let regions = parse_maps(MAPS, Some("/usr/bin/game"), RegionScanLevel::HeapStackExecutable).unwrap();
        let types: Vec<RegionType> = regions.iter().map(|r| r.region_type()).collect();
        assert_eq!(types, vec![RegionType::Exe, RegionType::Heap, RegionType::Stack]);
        let ids: Vec<u32> = regions.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_level_two_adds_bss() {
        let regions = parse_maps(MAPS, Some("/usr/bin/game"), RegionScanLevel::HeapStackExecutableBss).unwrap();
        assert_eq!(regions.len(), 4);
        assert_eq!(regions[1].start(), Address::new(0x55d0c0a06000));
        assert_eq!(regions[1].region_type(), RegionType::Misc);
    }

    #[test]
    fn test_level_three_keeps_all_writable() {
        let regions = parse_maps(MAPS, Some("/usr/bin/game"), RegionScanLevel::All).unwrap();
        assert_eq!(regions.len(), 6);
        assert!(regions.iter().all(|r| r.is_readable() && r.is_writable()));
        assert!(regions.windows(2).all(|w| w[0].end() <= w[1].start()));
    }

    #[test]
    fn test_load_addr_is_first_mapping_of_file() {
        let regions = parse_maps(MAPS, Some("/usr/bin/game"), RegionScanLevel::All).unwrap();
        let exe = &regions[0];
        assert_eq!(exe.load_addr(), Address::new(0x55d0c0a00000));
        assert_eq!(exe.offset_of(Address::new(0x55d0c0a05010)), 0x5010);

        let libc = regions.iter().find(|r| r.filename() == Some("/usr/lib/libc.so.6")).unwrap();
        assert_eq!(libc.region_type(), RegionType::Code);
        assert_eq!(libc.load_addr(), Address::new(0x7f0000100000 - 0x1c000));
    }
}
