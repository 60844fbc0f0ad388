// Mon Oct 12 2026 - Alex

use crate::config::ConfigError;
use crate::memory::MemoryError;
use crate::scan::ScanError;
use crate::store::StoreError;
use crate::value::ValueError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no target process, use `pid <n>` first")]
    NoTarget,
    #[error("there are currently no matches")]
    NoMatches,
    #[error("no match with id {0}")]
    InvalidMatchId(usize),
    #[error("no region with id {0}")]
    UnknownRegion(u32),
    #[error("{0} is not supported here")]
    Unsupported(String),
    #[error("usage: {0}")]
    Usage(String),
    #[error("unknown command `{0}`, try `help`")]
    UnknownCommand(String),
}
