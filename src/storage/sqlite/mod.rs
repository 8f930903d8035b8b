mod bookmark_repository;
mod connection;
mod kv_repository;

pub use bookmark_repository::SqliteBookmarkRepository;
pub use connection::SqliteStorage;
pub use kv_repository::SqliteKeyValueRepository;
