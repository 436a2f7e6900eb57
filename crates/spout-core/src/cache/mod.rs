//! Pending tuple cache: delivery id -> last tuple sent under it, sliding expiration.

mod entry;
mod pending;

pub use entry::PendingEntry;
pub use pending::PendingCache;

use std::sync::Arc;

use tokio::sync::Mutex;

/// The cache as shared between the dispatch loop and the optional sweeper.
pub type SharedPendingCache = Arc<Mutex<PendingCache>>;
