use std::sync::Arc;

use crate::tree::snapshot::Snapshot;

/// Where the scroll search gets its hierarchy generations from.
pub trait SnapshotSource {
    /// Latest published generation, waiting for a pending refresh first.
    fn current(&self) -> Option<Arc<Snapshot>>;

    /// Request a new generation and block until it is published.
    fn refresh_and_wait(&self) -> Option<Arc<Snapshot>>;
}
