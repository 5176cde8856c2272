//! Storage strategies for the task manager. The facade is constructed with
//! an explicit backend rather than resolving one through global state; the
//! in-memory backend simply discards every snapshot.

pub mod file;

use crate::error::TaskError;
use crate::task::store::EntityStore;

pub use file::FileBackend;

/// Called by the facade after every successful mutation with the full
/// current store. Backends own durability; the core owns correctness.
pub trait StorageBackend: Send {
    fn persist(&mut self, store: &EntityStore) -> Result<(), TaskError>;
}

/// Backend for purely in-memory managers.
#[derive(Debug, Default)]
pub struct InMemoryBackend;

impl StorageBackend for InMemoryBackend {
    fn persist(&mut self, _store: &EntityStore) -> Result<(), TaskError> {
        Ok(())
    }
}
