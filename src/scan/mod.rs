// Mon Oct 12 2026 - Alex

pub mod driver;
pub mod error;
pub mod request;

pub use driver::{build_array_from_scan, initial_bound, rescan};
pub use error::ScanError;
pub use request::ScanRequest;
