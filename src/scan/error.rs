// Mon Oct 12 2026 - Alex

use crate::memory::MemoryError;
use crate::store::StoreError;
use crate::value::{ScanDataType, ScanMatchType};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("match store error: {0}")]
    Store(#[from] StoreError),
    #[error("this comparison needs previous matches, scan for a value first")]
    NeedsPreviousMatches,
    #[error("this comparison needs a value")]
    MissingValue,
    #[error("{match_type:?} is not supported for {data_type} scans")]
    DataTypeMismatch {
        match_type: ScanMatchType,
        data_type: ScanDataType,
    },
    #[error("none of the {0} areas could be read")]
    NothingReadable(usize),
}
