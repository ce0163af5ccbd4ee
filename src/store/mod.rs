//! Persistence of trees as their serialized string.

mod file_store;
mod store;
mod store_error;

pub use file_store::FileStore;
pub use store::{MemoryStore, TreeStore, load, save, sync_hook};
pub use store_error::StoreError;
