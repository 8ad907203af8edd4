/// Storage layer for post documents
///
/// `PostStore` is the seam handlers and services depend on. `PgPostStore`
/// keeps one row per post with nested lists in JSONB columns;
/// `MemoryPostStore` keeps everything in a process-local map.
pub mod memory_store;
pub mod pg_store;
pub mod post_store;

pub use memory_store::MemoryPostStore;
pub use pg_store::PgPostStore;
pub use post_store::{PostStore, StoreError, StoreResult};
