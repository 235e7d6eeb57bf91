//! Snapshot export/import of the node tree and its on-disk persistence.

mod codec;
mod store;

pub use codec::SnapshotError;
pub use store::{SnapshotStore, SnapshotStoreError};
