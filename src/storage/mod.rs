pub mod sqlite;
pub mod traits;

pub use sqlite::{SqliteBookmarkRepository, SqliteKeyValueRepository, SqliteStorage};
pub use traits::{BookmarkStore, KeyValueStore, KeyValueStoreExt};
