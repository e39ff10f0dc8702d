//! Library database using SQLite

use crate::{
    CompatibilityTier, GameList, ImportPreferences, LibraryError, LibraryRecord, NewLibraryRecord,
    Platform,
};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::Path;

/// Library database manager
pub struct LibraryDatabase {
    conn: Connection,
}

impl LibraryDatabase {
    /// Open or create a database
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let conn = Connection::open(path)?;

        let db = Self { conn };
        db.init_schema()?;

        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self, LibraryError> {
        let conn = Connection::open_in_memory()?;

        let db = Self { conn };
        db.init_schema()?;

        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), LibraryError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS library_records (
                id INTEGER PRIMARY KEY,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                platform TEXT NOT NULL,
                genres TEXT NOT NULL DEFAULT '[]',
                list TEXT NOT NULL DEFAULT 'backlog',
                cover_image_url TEXT,
                release_date TEXT,
                estimated_playtime_hours INTEGER,
                external_app_id INTEGER,
                compatibility TEXT NOT NULL DEFAULT 'unknown',
                created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS user_preferences (
                owner_id TEXT PRIMARY KEY,
                check_deck_compatibility INTEGER NOT NULL DEFAULT 0,
                replace_on_import INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_records_owner ON library_records(owner_id);
            CREATE INDEX IF NOT EXISTS idx_records_owner_platform ON library_records(owner_id, platform);
            CREATE INDEX IF NOT EXISTS idx_records_app_id ON library_records(owner_id, external_app_id);
        "#,
        )?;

        Ok(())
    }

    /// Get every record in an owner's partition
    pub fn get_records(&self, owner: &str) -> Result<Vec<LibraryRecord>, LibraryError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM library_records WHERE owner_id = ?1 ORDER BY title, id")?;

        let records = stmt
            .query_map(params![owner], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get an owner's records on one platform
    pub fn get_records_by_platform(
        &self,
        owner: &str,
        platform: Platform,
    ) -> Result<Vec<LibraryRecord>, LibraryError> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM library_records WHERE owner_id = ?1 AND platform = ?2 ORDER BY title, id",
        )?;

        let records = stmt
            .query_map(params![owner, platform], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get a record by ID
    pub fn get_record(&self, id: i64) -> Result<Option<LibraryRecord>, LibraryError> {
        let record = self
            .conn
            .query_row(
                "SELECT * FROM library_records WHERE id = ?1",
                params![id],
                Self::row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    /// Count an owner's records
    pub fn record_count(&self, owner: &str) -> Result<i64, LibraryError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM library_records WHERE owner_id = ?1",
            params![owner],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Create records in one transaction; all or nothing
    pub fn insert_records(
        &mut self,
        owner: &str,
        records: &[NewLibraryRecord],
    ) -> Result<Vec<i64>, LibraryError> {
        let tx = self.conn.transaction()?;
        let ids = Self::insert_in(&tx, owner, records)?;
        tx.commit()?;
        Ok(ids)
    }

    /// Delete records by ID in one transaction, scoped to the owner
    pub fn delete_records(&mut self, owner: &str, ids: &[i64]) -> Result<usize, LibraryError> {
        let tx = self.conn.transaction()?;
        let deleted = Self::delete_in(&tx, owner, ids)?;
        tx.commit()?;
        Ok(deleted)
    }

    /// Delete `delete_ids` and then create `records`, as one transaction
    pub fn replace_records(
        &mut self,
        owner: &str,
        delete_ids: &[i64],
        records: &[NewLibraryRecord],
    ) -> Result<(usize, Vec<i64>), LibraryError> {
        let tx = self.conn.transaction()?;
        let deleted = Self::delete_in(&tx, owner, delete_ids)?;
        let ids = Self::insert_in(&tx, owner, records)?;
        tx.commit()?;

        tracing::debug!(
            "Replaced records for {}: {} deleted, {} created",
            owner,
            deleted,
            ids.len()
        );
        Ok((deleted, ids))
    }

    fn insert_in(
        tx: &Transaction<'_>,
        owner: &str,
        records: &[NewLibraryRecord],
    ) -> Result<Vec<i64>, LibraryError> {
        let mut stmt = tx.prepare(
            r#"INSERT INTO library_records
               (owner_id, title, platform, genres, list, cover_image_url, release_date,
                estimated_playtime_hours, external_app_id, compatibility)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
        )?;

        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            let genres = serde_json::to_string(&record.genres)?;
            stmt.execute(params![
                owner,
                record.title,
                record.platform,
                genres,
                record.list,
                record.cover_image_url,
                record.release_date,
                record.estimated_playtime_hours,
                record.external_app_id,
                record.compatibility,
            ])?;
            ids.push(tx.last_insert_rowid());
        }

        Ok(ids)
    }

    fn delete_in(tx: &Transaction<'_>, owner: &str, ids: &[i64]) -> Result<usize, LibraryError> {
        let mut stmt = tx.prepare("DELETE FROM library_records WHERE id = ?1 AND owner_id = ?2")?;

        let mut deleted = 0;
        for id in ids {
            deleted += stmt.execute(params![id, owner])?;
        }
        Ok(deleted)
    }

    /// Get an owner's import preferences, defaulting when none are stored
    pub fn get_preferences(&self, owner: &str) -> Result<ImportPreferences, LibraryError> {
        let prefs = self
            .conn
            .query_row(
                "SELECT check_deck_compatibility, replace_on_import FROM user_preferences WHERE owner_id = ?1",
                params![owner],
                |row| {
                    Ok(ImportPreferences {
                        check_deck_compatibility: row.get(0)?,
                        replace_on_import: row.get(1)?,
                    })
                },
            )
            .optional()?
            .unwrap_or_default();

        Ok(prefs)
    }

    /// Store an owner's import preferences
    pub fn set_preferences(
        &self,
        owner: &str,
        prefs: &ImportPreferences,
    ) -> Result<(), LibraryError> {
        self.conn.execute(
            r#"INSERT INTO user_preferences (owner_id, check_deck_compatibility, replace_on_import)
               VALUES (?1, ?2, ?3)
               ON CONFLICT(owner_id) DO UPDATE SET
                   check_deck_compatibility = ?2,
                   replace_on_import = ?3,
                   updated_at = CURRENT_TIMESTAMP"#,
            params![owner, prefs.check_deck_compatibility, prefs.replace_on_import],
        )?;
        Ok(())
    }

    /// Convert a row to a LibraryRecord
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<LibraryRecord> {
        let genres: String = row.get("genres")?;
        let genres = serde_json::from_str(&genres).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

        Ok(LibraryRecord {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            title: row.get("title")?,
            platform: row.get("platform")?,
            genres,
            list: row.get("list")?,
            cover_image_url: row.get("cover_image_url")?,
            release_date: row.get("release_date")?,
            estimated_playtime_hours: row.get("estimated_playtime_hours")?,
            external_app_id: row.get("external_app_id")?,
            compatibility: row.get("compatibility")?,
        })
    }
}

fn text_column<T>(value: ValueRef<'_>) -> FromSqlResult<T>
where
    T: std::str::FromStr<Err = LibraryError>,
{
    value
        .as_str()?
        .parse()
        .map_err(|e: LibraryError| FromSqlError::Other(Box::new(e)))
}

impl ToSql for Platform {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Platform {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value)
    }
}

impl ToSql for GameList {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GameList {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value)
    }
}

impl ToSql for CompatibilityTier {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CompatibilityTier {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hades() -> NewLibraryRecord {
        let mut record = NewLibraryRecord::new("Hades", Platform::Pc).with_app_id(1145360);
        record.genres = vec!["Action".to_string(), "RPG".to_string()];
        record.estimated_playtime_hours = Some(22);
        record.compatibility = CompatibilityTier::Verified;
        record
    }

    #[test]
    fn test_database_creation() {
        let db = LibraryDatabase::in_memory().unwrap();
        assert_eq!(db.record_count("alice").unwrap(), 0);
    }

    #[test]
    fn test_insert_and_get_record() {
        let mut db = LibraryDatabase::in_memory().unwrap();

        let ids = db.insert_records("alice", &[hades()]).unwrap();
        let retrieved = db.get_record(ids[0]).unwrap().unwrap();

        assert_eq!(retrieved.title, "Hades");
        assert_eq!(retrieved.owner_id, "alice");
        assert_eq!(retrieved.platform, Platform::Pc);
        assert_eq!(retrieved.genres, vec!["Action", "RPG"]);
        assert_eq!(retrieved.list, GameList::Backlog);
        assert_eq!(retrieved.estimated_playtime_hours, Some(22));
        assert_eq!(retrieved.external_app_id, Some(1145360));
        assert_eq!(retrieved.compatibility, CompatibilityTier::Verified);
    }

    #[test]
    fn test_partitions_are_isolated() {
        let mut db = LibraryDatabase::in_memory().unwrap();
        db.insert_records("alice", &[hades()]).unwrap();

        assert_eq!(db.get_records("bob").unwrap().len(), 0);
        assert_eq!(db.get_records("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_filter_by_platform() {
        let mut db = LibraryDatabase::in_memory().unwrap();
        db.insert_records(
            "alice",
            &[hades(), NewLibraryRecord::new("Bloodborne", Platform::PlayStation)],
        )
        .unwrap();

        let pc = db.get_records_by_platform("alice", Platform::Pc).unwrap();
        assert_eq!(pc.len(), 1);
        assert_eq!(pc[0].title, "Hades");
    }

    #[test]
    fn test_delete_is_scoped_to_owner() {
        let mut db = LibraryDatabase::in_memory().unwrap();
        let ids = db.insert_records("alice", &[hades()]).unwrap();

        assert_eq!(db.delete_records("bob", &ids).unwrap(), 0);
        assert_eq!(db.delete_records("alice", &ids).unwrap(), 1);
        assert_eq!(db.record_count("alice").unwrap(), 0);
    }

    #[test]
    fn test_replace_records() {
        let mut db = LibraryDatabase::in_memory().unwrap();
        let old = db.insert_records("alice", &[hades()]).unwrap();

        let (deleted, created) = db
            .replace_records(
                "alice",
                &old,
                &[NewLibraryRecord::new("Celeste", Platform::Pc)],
            )
            .unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(created.len(), 1);
        let records = db.get_records("alice").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Celeste");
    }

    #[test]
    fn test_preferences_default_and_update() {
        let db = LibraryDatabase::in_memory().unwrap();
        assert_eq!(
            db.get_preferences("alice").unwrap(),
            ImportPreferences::default()
        );

        let prefs = ImportPreferences {
            check_deck_compatibility: true,
            replace_on_import: false,
        };
        db.set_preferences("alice", &prefs).unwrap();
        assert_eq!(db.get_preferences("alice").unwrap(), prefs);
    }
}
