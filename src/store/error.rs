// Mon Oct 12 2026 - Alex

use crate::memory::Address;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("match array needs {needed} bytes but is bounded to {bound}")]
    AllocationFailed { needed: usize, bound: usize },
    #[error("address {next} appended after {last}, addresses must ascend")]
    OutOfOrder { last: Address, next: Address },
    #[error("match location refers to a previous match array")]
    StaleLocation,
    #[error("location does not hold a live match")]
    NotALiveMatch,
    #[error("location is outside the match array")]
    IndexOutOfRange,
}
