// Mon Oct 12 2026 - Alex

pub mod array;
pub mod delete;
pub mod error;
pub mod locator;

pub use array::{
    MatchArray, MatchArrayBuilder, MatchEntry, MatchLocation, SwathRef, ARRAY_HEADER_SIZE, ELEMENT_SIZE,
    SWATH_HEADER_SIZE,
};
pub use delete::{delete_by_region, delete_by_regions, retain};
pub use error::StoreError;
pub use locator::{locate_region, nth};
