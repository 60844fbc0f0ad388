// Mon Oct 12 2026 - Alex

pub mod compare;
pub mod error;
pub mod flags;
pub mod types;
pub mod user;
#[allow(clippy::module_inception)]
pub mod value;

pub use compare::{compare_bytes, compare_numbers};
pub use error::ValueError;
pub use flags::{MatchFlags, Widths};
pub use types::{ScanDataType, ScanMatchType};
pub use user::{parse_bytearray, ByteMask, NumberValue, ScanTarget};
pub use value::Value;
