//! Trial-record storage.
//!
//! The [`Storage`] trait defines how finished trials are kept and
//! retrieved. Every [`Study`](crate::Study) owns an `Arc<dyn Storage>` so
//! the record set is transparently shared across threads. The in-memory
//! [`MemoryStorage`] is the default; persistent backends (e.g. the
//! relational store used by a multi-process study) live outside this
//! crate and plug in through the same trait.
//!
//! ```
//! use gridtune::prelude::*;
//! use gridtune::storage::MemoryStorage;
//!
//! let study = Study::builder()
//!     .maximize()
//!     .storage(MemoryStorage::new())
//!     .build();
//! ```

mod memory;

pub use memory::MemoryStorage;

use std::sync::Arc;

use parking_lot::RwLock;

use crate::sampler::CompletedTrial;

/// Trait for storing and retrieving finished trials.
///
/// Implementations must be `Send + Sync` because a study may be shared
/// across threads.
pub trait Storage: Send + Sync {
    /// Append a finished trial to the store.
    fn push(&self, trial: CompletedTrial);

    /// Return a reference to the in-memory trial buffer.
    ///
    /// All implementations maintain an `Arc<RwLock<Vec<…>>>` reflecting
    /// the current set of trials; callers take a read lock for
    /// allocation-free access.
    fn trials_arc(&self) -> &Arc<RwLock<Vec<CompletedTrial>>>;

    /// Atomically return the next unique trial ID.
    fn next_trial_id(&self) -> u64;

    /// Reload from an external source (e.g. records written by another
    /// process). Return `true` if the buffer changed.
    ///
    /// The default implementation is a no-op that returns `false`.
    fn refresh(&self) -> bool {
        false
    }
}
