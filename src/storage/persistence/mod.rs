//! Key/value persistence backend implementations.

mod filesystem;
mod memory;
mod sqlite;

pub use filesystem::FilesystemKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;
