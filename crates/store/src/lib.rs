//! Store implementations for Confidant.

pub mod in_memory;
pub mod permissions;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use permissions::Permissions;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
