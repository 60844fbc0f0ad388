// Tue Jan 13 2026 - Alex

use crate::memory::maps::read_maps;
use crate::memory::{Address, MemoryError, MemoryTarget, Region, RegionScanLevel};
use libc::{c_int, pid_t};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;

/// Largest piece of a read buffer allocated at once.
const READ_CHUNK: usize = 1 << 20;

/// A live process reached through ptrace and `/proc/<pid>/mem`.
pub struct ProcessTarget {
    pid: pid_t,
    reader: Option<File>,
    writer: Option<File>,
    attached: bool,
}

impl ProcessTarget {
    pub fn new(pid: pid_t) -> Result<Self, MemoryError> {
        if pid <= 0 {
            return Err(MemoryError::ProcessNotFound(format!("`{}` is not a valid pid", pid)));
        }
        if !std::path::Path::new(&format!("/proc/{}", pid)).exists() {
            return Err(MemoryError::ProcessNotFound(format!("no such process {}", pid)));
        }
        Ok(Self { pid, reader: None, writer: None, attached: false })
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn mem_file(&mut self, write: bool) -> Result<&File, MemoryError> {
        let slot = if write { &mut self.writer } else { &mut self.reader };
        if slot.is_none() {
            let file = OpenOptions::new()
                .read(!write)
                .write(write)
                .open(format!("/proc/{}/mem", self.pid))?;
            *slot = Some(file);
        }
        slot.as_ref()
            .ok_or_else(|| MemoryError::ProcessNotFound(self.pid.to_string()))
    }

    fn wait_for_stop(&self) -> Result<(), MemoryError> {
        let mut status: c_int = 0;
        loop {
            let rc = unsafe { libc::waitpid(self.pid, &mut status, 0) };
            if rc == self.pid {
                break;
            }
            let err = std::io::Error::last_os_error();
            if err.kind() != std::io::ErrorKind::Interrupted {
                return Err(MemoryError::AttachFailed { pid: self.pid, reason: err.to_string() });
            }
        }
        if !libc::WIFSTOPPED(status) {
            return Err(MemoryError::AttachFailed {
                pid: self.pid,
                reason: format!("process did not stop (status {:#x})", status),
            });
        }
        Ok(())
    }
}

impl MemoryTarget for ProcessTarget {
    fn pid(&self) -> i32 {
        self.pid
    }

    fn attach(&mut self) -> Result<(), MemoryError> {
        if self.attached {
            return Ok(());
        }
        let rc = unsafe {
            libc::ptrace(
                libc::PTRACE_ATTACH,
                self.pid,
                std::ptr::null_mut::<libc::c_void>(),
                std::ptr::null_mut::<libc::c_void>(),
            )
        };
        if rc == -1 {
            return Err(MemoryError::AttachFailed {
                pid: self.pid,
                reason: std::io::Error::last_os_error().to_string(),
            });
        }
        if let Err(e) = self.wait_for_stop() {
            let _ = self.detach_raw();
            return Err(e);
        }
        self.attached = true;
        log::trace!("attached to {}", self.pid);
        Ok(())
    }

    fn detach(&mut self) -> Result<(), MemoryError> {
        if !self.attached {
            return Ok(());
        }
        self.attached = false;
        self.detach_raw()
    }

    fn read_bytes(&mut self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let file = self.mem_file(false)?;
        let mut buffer = Vec::new();
        let mut filled = 0;
        while filled < len {
            if filled == buffer.len() {
                let grow = (len - filled).min(READ_CHUNK);
                buffer
                    .try_reserve_exact(grow)
                    .map_err(|_| MemoryError::ReadFailed(addr.as_u64()))?;
                buffer.resize(filled + grow, 0);
            }
            match file.read_at(&mut buffer[filled..], addr.as_u64() + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) if filled > 0 => break,
                Err(_) => return Err(MemoryError::ReadFailed(addr.as_u64())),
            }
        }
        buffer.truncate(filled);
        Ok(buffer)
    }

    fn write_bytes(&mut self, addr: Address, data: &[u8]) -> Result<(), MemoryError> {
        let file = self.mem_file(true)?;
        file.write_all_at(data, addr.as_u64())
            .map_err(|_| MemoryError::WriteFailed(addr.as_u64()))
    }

    fn read_regions(&mut self, level: RegionScanLevel) -> Result<Vec<Region>, MemoryError> {
        read_maps(self.pid, level)
    }
}

impl ProcessTarget {
    fn detach_raw(&self) -> Result<(), MemoryError> {
        let rc = unsafe {
            libc::ptrace(
                libc::PTRACE_DETACH,
                self.pid,
                std::ptr::null_mut::<libc::c_void>(),
                std::ptr::null_mut::<libc::c_void>(),
            )
        };
        if rc == -1 {
            return Err(MemoryError::DetachFailed {
                pid: self.pid,
                reason: std::io::Error::last_os_error().to_string(),
            });
        }
        log::trace!("detached from {}", self.pid);
        Ok(())
    }
}

impl Drop for ProcessTarget {
    fn drop(&mut self) {
        if self.attached {
            let _ = self.detach_raw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_pid() {
        assert!(matches!(ProcessTarget::new(0), Err(MemoryError::ProcessNotFound(_))));
        assert!(matches!(ProcessTarget::new(-4), Err(MemoryError::ProcessNotFound(_))));
    }

    #[test]
    fn test_reads_own_memory() {
        let data: Vec<u8> = (0u8..64).collect();
        let mut target = ProcessTarget::new(std::process::id() as pid_t).unwrap();
        let addr = Address::new(data.as_ptr() as u64);
        let bytes = target.read_bytes(addr, data.len()).unwrap();
        assert_eq!(bytes, data);
    }

    #[test]
    fn test_read_stops_at_unmapped_memory() {
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        let base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                page * 3,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        assert_ne!(base, libc::MAP_FAILED);
        unsafe {
            std::ptr::write_bytes(base as *mut u8, 0x5a, page * 2);
            libc::munmap((base as usize + page * 2) as *mut libc::c_void, page);
        }

        let mut target = ProcessTarget::new(std::process::id() as pid_t).unwrap();
        let bytes = target.read_bytes(Address::new(base as u64), usize::MAX).unwrap();
        assert_eq!(bytes.len(), page * 2);
        assert!(bytes.iter().all(|&b| b == 0x5a));

        unsafe {
            libc::munmap(base, page * 2);
        }
    }
}
