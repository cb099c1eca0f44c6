//! Storage layer: atomic files and the key/value medium built on them.

mod atomic_file;
mod key_value;

pub use atomic_file::{AtomicFile, AtomicFileError};
pub use key_value::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
