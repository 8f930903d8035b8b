use rusqlite::{OptionalExtension, Row};

use crate::domain::{Bookmark, Collection, FeedId};
use crate::errors::{FeedwatchError, FeedwatchResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::BookmarkStore;

pub struct SqliteBookmarkRepository {
    storage: SqliteStorage,
}

impl SqliteBookmarkRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn bookmark_from_row(row: &Row<'_>) -> rusqlite::Result<Bookmark> {
        let id: i64 = row.get(0)?;
        Ok(Bookmark {
            id: FeedId::new(id.to_string()),
            collection_id: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            position: row.get(4)?,
        })
    }

    fn collection_from_row(row: &Row<'_>) -> rusqlite::Result<Collection> {
        Ok(Collection {
            id: row.get(0)?,
            title: row.get(1)?,
        })
    }

    /// Bookmark ids are row ids; anything else cannot exist.
    fn row_id(id: &FeedId) -> Option<i64> {
        id.as_str().parse().ok()
    }
}

impl BookmarkStore for SqliteBookmarkRepository {
    fn add_collection(&self, title: &str) -> FeedwatchResult<Collection> {
        let conn = self.storage.connection()?;

        let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM collections WHERE title = ?1)")?;
        let exists: bool = stmt.query_row([title], |row| row.get(0))?;
        drop(stmt);

        if exists {
            return Err(FeedwatchError::CollectionAlreadyExists(title.to_string()));
        }

        conn.execute("INSERT INTO collections (title) VALUES (?1)", [title])?;

        Ok(Collection {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
        })
    }

    fn remove_collection(&self, id: i64) -> FeedwatchResult<()> {
        let conn = self.storage.connection()?;
        conn.execute("DELETE FROM collections WHERE id = ?1", [id])?;
        Ok(())
    }

    fn collection(&self, id: i64) -> FeedwatchResult<Option<Collection>> {
        let conn = self.storage.connection()?;
        let collection = conn
            .query_row(
                "SELECT id, title FROM collections WHERE id = ?1",
                [id],
                Self::collection_from_row,
            )
            .optional()?;
        Ok(collection)
    }

    fn collection_by_title(&self, title: &str) -> FeedwatchResult<Option<Collection>> {
        let conn = self.storage.connection()?;
        let collection = conn
            .query_row(
                "SELECT id, title FROM collections WHERE title = ?1",
                [title],
                Self::collection_from_row,
            )
            .optional()?;
        Ok(collection)
    }

    fn collections(&self) -> FeedwatchResult<Vec<Collection>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT id, title FROM collections ORDER BY id")?;
        let collections = stmt.query_map([], Self::collection_from_row)?;

        collections
            .collect::<Result<Vec<_>, _>>()
            .map_err(FeedwatchError::from)
    }

    fn add_bookmark(&self, collection_id: i64, title: &str, url: &str) -> FeedwatchResult<Bookmark> {
        let conn = self.storage.connection()?;

        let mut stmt = conn.prepare(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE collection_id = ?1 AND url = ?2)",
        )?;
        let exists: bool = stmt.query_row((collection_id, url), |row| row.get(0))?;
        drop(stmt);

        if exists {
            return Err(FeedwatchError::FeedAlreadyExists(url.to_string()));
        }

        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM bookmarks WHERE collection_id = ?1",
            [collection_id],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO bookmarks (collection_id, title, url, position) VALUES (?1, ?2, ?3, ?4)",
            (collection_id, title, url, position),
        )?;

        Ok(Bookmark {
            id: FeedId::new(conn.last_insert_rowid().to_string()),
            collection_id,
            title: title.to_string(),
            url: url.to_string(),
            position,
        })
    }

    fn remove_bookmark(&self, id: &FeedId) -> FeedwatchResult<()> {
        let Some(row_id) = Self::row_id(id) else {
            return Ok(());
        };
        let conn = self.storage.connection()?;
        conn.execute("DELETE FROM bookmarks WHERE id = ?1", [row_id])?;
        Ok(())
    }

    fn get(&self, id: &FeedId) -> FeedwatchResult<Option<Bookmark>> {
        let Some(row_id) = Self::row_id(id) else {
            return Ok(None);
        };
        let conn = self.storage.connection()?;
        let bookmark = conn
            .query_row(
                "SELECT id, collection_id, title, url, position FROM bookmarks WHERE id = ?1",
                [row_id],
                Self::bookmark_from_row,
            )
            .optional()?;
        Ok(bookmark)
    }

    fn bookmarks_in(&self, collection_id: i64) -> FeedwatchResult<Vec<Bookmark>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, collection_id, title, url, position FROM bookmarks WHERE collection_id = ?1 ORDER BY position, id",
        )?;
        let bookmarks = stmt.query_map([collection_id], Self::bookmark_from_row)?;

        bookmarks
            .collect::<Result<Vec<_>, _>>()
            .map_err(FeedwatchError::from)
    }
}
