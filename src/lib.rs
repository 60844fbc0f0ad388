// Tue Jan 15 2026 - Alex

pub mod config;
pub mod memory;
pub mod scan;
pub mod session;
pub mod store;
pub mod ui;
pub mod utils;
pub mod value;

pub use config::Options;
pub use memory::{MemoryTarget, ProcessTarget};
pub use scan::{build_array_from_scan, rescan, ScanRequest};
pub use session::Session;
pub use store::{delete_by_region, MatchArray};
