//! Outbound adapters implementing domain ports.
//!
//! - **memory**: mutex-guarded in-memory store backing both persistence
//!   ports, used by the recipe cascade CLI and integration tests.
//! - **snapshot**: JSON message snapshots read and written through `cap_std`.
//!
//! Adapters translate between domain types and storage. They contain no
//! business logic; the cascade rule lives in the domain.

pub mod memory;
pub mod snapshot;

pub use memory::InMemoryStore;
pub use snapshot::{SnapshotError, load_messages, write_messages};
