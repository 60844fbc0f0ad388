// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Read failed at address 0x{0:x}")]
    ReadFailed(u64),
    #[error("Write failed at address 0x{0:x}")]
    WriteFailed(u64),
    #[error("Failed to attach to process {pid}: {reason}")]
    AttachFailed { pid: i32, reason: String },
    #[error("Failed to detach from process {pid}: {reason}")]
    DetachFailed { pid: i32, reason: String },
    #[error("Process not found: {0}")]
    ProcessNotFound(String),
    #[error("Malformed maps line: {0}")]
    MalformedMaps(String),
}
