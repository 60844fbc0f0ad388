// Mon Oct 12 2026 - Alex

pub mod cancel;
pub mod commands;
pub mod context;
pub mod error;

pub use cancel::CancellationToken;
pub use context::{Connector, Session};
pub use error::SessionError;
