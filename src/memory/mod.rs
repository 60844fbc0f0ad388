// Tue Jan 13 2026 - Alex

pub mod address;
pub mod endian;
pub mod error;
pub mod maps;
pub mod mock;
pub mod process;
pub mod protection;
pub mod range;
pub mod region;
pub mod traits;

pub use address::Address;
pub use endian::Endianness;
pub use error::MemoryError;
pub use process::ProcessTarget;
pub use protection::Protection;
pub use range::MemoryRange;
pub use region::{Region, RegionScanLevel, RegionType};
pub use traits::{AttachGuard, MemoryTarget};
