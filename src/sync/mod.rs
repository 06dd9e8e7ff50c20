//! Sync module for multi-device document synchronization
//!
//! Provides:
//! - Version-gated writes (lost-update prevention)
//! - Timestamp-based sync resolution
//!
//! # Sync Protocol
//!
//! 1. Client sends its content and the `lastModified` it last saw (epoch ms)
//! 2. Server compares that timestamp with the stored `lastModified`
//! 3. Newer client edit: server applies it through the version gate
//! 4. Newer server copy: server returns it as a conflict, nothing is written
//! 5. Equal timestamps: nothing to do
//!
//! The timestamp decides whose edit should win; the version-guarded write
//! catches writers that slip in between that decision and the write.

mod gate;
mod resolver;
mod types;

pub use gate::VersionGate;
pub use resolver::SyncResolver;
pub use types::{SyncConflict, SyncOutcome, SyncRequest, SyncResponse, SyncStatus};
