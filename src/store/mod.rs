//! In-memory-first stores with optional PostgreSQL write-through
//!
//! Each store keeps its working set in an `Arc<RwLock<HashMap>>` and,
//! when a database pool is attached, writes through on every save and
//! falls back to the database on a cache miss. Without a pool the store
//! is fully functional in process memory, which is also how the unit
//! tests run.

mod content;
mod notifications;
mod users;

pub use content::ContentStore;
pub use notifications::NotificationStore;
pub use users::UserStore;
