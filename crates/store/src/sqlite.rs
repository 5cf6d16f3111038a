// Testimonial store backed by a single SQLite table

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};

use feedwall_ingest::{RecordFilter, RecordPatch, RecordStore, Source, StoreError, StoredRecord, Testimonial};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS testimonials (
    id TEXT PRIMARY KEY,                 -- UUID v4
    date TEXT,                           -- YYYY-MM-DD, or raw sheet text when unparseable
    review_type TEXT NOT NULL,
    review TEXT NOT NULL DEFAULT '',
    rating INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 5),
    name TEXT NOT NULL DEFAULT '',
    mobile TEXT NOT NULL DEFAULT '',
    source TEXT NOT NULL,                -- web-submission | import-csv | google-sheets-sync
    published INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_testimonials_source ON testimonials (source);
"#;

const COLUMNS: &str = "id, date, review_type, review, rating, name, mobile, source, published, created_at";

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(backend)?;
        log::debug!("opened store at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory().map_err(backend)?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(backend)?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM testimonials", [], |row| row.get(0))
            .map_err(backend)?;
        Ok(n as usize)
    }

    pub fn get(&self, id: &str) -> Result<Option<StoredRecord>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM testimonials WHERE id = ?1"),
                params![id],
                read_row,
            )
            .optional()
            .map_err(backend)?
            .transpose()
    }
}

/// Column values → record. The outer error is SQLite's, the inner one a
/// value this crate did not write.
fn read_row(row: &Row<'_>) -> rusqlite::Result<Result<StoredRecord, StoreError>> {
    let id: String = row.get(0)?;
    let source_text: String = row.get(7)?;
    let Some(source) = Source::parse(&source_text) else {
        return Ok(Err(StoreError::Backend(format!("record {id}: unknown source '{source_text}'"))));
    };
    Ok(Ok(StoredRecord {
        id,
        date: row.get(1)?,
        review_type: row.get(2)?,
        review: row.get(3)?,
        rating: row.get(4)?,
        name: row.get(5)?,
        mobile: row.get(6)?,
        source,
        published: row.get::<_, i64>(8)? != 0,
        created_at: row.get(9)?,
    }))
}

impl RecordStore for SqliteStore {
    fn select(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM testimonials \
                 WHERE (?1 IS NULL OR source = ?1) AND (?2 IS NULL OR published = ?2) \
                 ORDER BY created_at, rowid"
            ))
            .map_err(backend)?;

        let source = filter.source.map(|s| s.as_str());
        let published = filter.published.map(i64::from);
        let rows = stmt
            .query_map(params![source, published], read_row)
            .map_err(backend)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(backend)??);
        }
        Ok(out)
    }

    fn insert(&mut self, records: &[Testimonial]) -> Result<usize, StoreError> {
        let created_at = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction().map_err(backend)?;
        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO testimonials ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ))
                .map_err(backend)?;
            for t in records {
                stmt.execute(params![
                    uuid::Uuid::new_v4().to_string(),
                    t.stored_date(),
                    t.review_type,
                    t.review,
                    t.rating,
                    t.name,
                    t.mobile,
                    t.source.as_str(),
                    t.published,
                    created_at,
                ])
                .map_err(backend)?;
            }
        }
        // Dropping an uncommitted transaction rolls it back.
        tx.commit().map_err(backend)?;
        Ok(records.len())
    }

    fn update(&mut self, id: &str, patch: &RecordPatch) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute(
                "UPDATE testimonials SET review = COALESCE(?2, review), \
                 published = COALESCE(?3, published) WHERE id = ?1",
                params![id, patch.review, patch.published],
            )
            .map_err(backend)?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
