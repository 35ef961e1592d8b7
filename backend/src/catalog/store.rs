//! Read-side access to the catalog metadata tables.
//!
//! The store opens one SQLite connection per operation and maps rows
//! into the shared `common` models. All lookups are reads; catalog
//! contents are maintained by the data pipeline, not by this service.

use std::path::{Path, PathBuf};

use common::model::dataset::{Dataset, DatasetFile};
use common::model::table::{Field, Table};
use common::model::version::Version;
use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS dataset (
    id INTEGER PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    show INTEGER NOT NULL DEFAULT 1,
    files_url TEXT
);
CREATE TABLE IF NOT EXISTS table_def (
    id INTEGER PRIMARY KEY,
    dataset_id INTEGER NOT NULL REFERENCES dataset(id),
    name TEXT NOT NULL,
    hidden INTEGER NOT NULL DEFAULT 0,
    is_default INTEGER NOT NULL DEFAULT 0,
    position INTEGER NOT NULL DEFAULT 0,
    UNIQUE (dataset_id, name)
);
CREATE TABLE IF NOT EXISTS field (
    id INTEGER PRIMARY KEY,
    table_id INTEGER NOT NULL REFERENCES table_def(id),
    name TEXT NOT NULL,
    show_on_frontend INTEGER NOT NULL DEFAULT 1,
    obfuscate INTEGER NOT NULL DEFAULT 0,
    is_search_field INTEGER NOT NULL DEFAULT 0,
    position INTEGER NOT NULL DEFAULT 0,
    UNIQUE (table_id, name)
);
CREATE TABLE IF NOT EXISTS version (
    id INTEGER PRIMARY KEY,
    dataset_id INTEGER NOT NULL REFERENCES dataset(id),
    name TEXT NOT NULL,
    ord INTEGER NOT NULL,
    collected_at TEXT,
    download_url TEXT
);
CREATE TABLE IF NOT EXISTS file_manifest (
    dataset_id INTEGER PRIMARY KEY REFERENCES dataset(id)
);
CREATE TABLE IF NOT EXISTS dataset_file (
    id INTEGER PRIMARY KEY,
    dataset_id INTEGER NOT NULL REFERENCES dataset(id),
    name TEXT NOT NULL,
    size INTEGER NOT NULL DEFAULT 0,
    sha512 TEXT,
    url TEXT NOT NULL
);
";

#[derive(Clone)]
pub struct CatalogStore {
    db_path: PathBuf,
}

/// Name of the physical data table backing one dataset table.
pub fn data_table_name(slug: &str, table_name: &str) -> String {
    format!("data_{}_{}", slug, table_name).replace('-', "_")
}

fn dataset_from_row(row: &rusqlite::Row) -> rusqlite::Result<Dataset> {
    Ok(Dataset {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        show: row.get(4)?,
        files_url: row.get(5)?,
    })
}

const DATASET_COLS: &str = "id, slug, name, description, show, files_url";

impl CatalogStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        CatalogStore {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn open(&self) -> Result<Connection, String> {
        Connection::open(&self.db_path).map_err(|e| e.to_string())
    }

    /// Creates the metadata tables when missing. Safe to run on every
    /// startup.
    pub fn ensure_schema(&self) -> Result<(), String> {
        let conn = self.open()?;
        conn.execute_batch(SCHEMA).map_err(|e| e.to_string())
    }

    pub fn dataset(&self, slug: &str) -> Result<Option<Dataset>, String> {
        let conn = self.open()?;
        conn.query_row(
            &format!("SELECT {} FROM dataset WHERE slug = ?1", DATASET_COLS),
            params![slug],
            dataset_from_row,
        )
        .optional()
        .map_err(|e| e.to_string())
    }

    /// Visible datasets matching every search term (case-insensitive,
    /// against name or description), ordered by name.
    pub fn list_datasets(&self, search: &str) -> Result<Vec<Dataset>, String> {
        let conn = self.open()?;
        let mut sql = format!("SELECT {} FROM dataset WHERE show = 1", DATASET_COLS);
        let mut bound = Vec::new();
        for term in search.split_whitespace() {
            sql.push_str(" AND (name LIKE ? OR description LIKE ?)");
            let pattern = format!("%{}%", term);
            bound.push(pattern.clone());
            bound.push(pattern);
        }
        sql.push_str(" ORDER BY name");

        let mut stmt = conn.prepare(&sql).map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(&bound), dataset_from_row)
            .map_err(|e| e.to_string())?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| e.to_string())
    }

    /// Random sample of visible datasets for the home page.
    pub fn sample_datasets(&self, limit: i64) -> Result<Vec<Dataset>, String> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM dataset WHERE show = 1 ORDER BY RANDOM() LIMIT ?1",
                DATASET_COLS
            ))
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map(params![limit], dataset_from_row)
            .map_err(|e| e.to_string())?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| e.to_string())
    }

    fn fields(conn: &Connection, table_id: i64) -> rusqlite::Result<Vec<Field>> {
        let mut stmt = conn.prepare(
            "SELECT name, show_on_frontend, obfuscate, is_search_field \
             FROM field WHERE table_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![table_id], |row| {
            Ok(Field {
                name: row.get(0)?,
                show_on_frontend: row.get(1)?,
                obfuscate: row.get(2)?,
                is_search_field: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    fn table_from_row(conn: &Connection, row: &rusqlite::Row) -> rusqlite::Result<Table> {
        let id: i64 = row.get(0)?;
        Ok(Table {
            id,
            dataset_id: row.get(1)?,
            name: row.get(2)?,
            hidden: row.get(3)?,
            fields: Self::fields(conn, id)?,
        })
    }

    /// Looks a table up by name. Hidden tables resolve only when
    /// `allow_hidden` is set.
    pub fn table(
        &self,
        dataset_id: i64,
        name: &str,
        allow_hidden: bool,
    ) -> Result<Option<Table>, String> {
        let conn = self.open()?;
        let mut sql =
            "SELECT id, dataset_id, name, hidden FROM table_def \
             WHERE dataset_id = ?1 AND name = ?2"
                .to_string();
        if !allow_hidden {
            sql.push_str(" AND hidden = 0");
        }
        conn.query_row(&sql, params![dataset_id, name], |row| {
            Self::table_from_row(&conn, row)
        })
        .optional()
        .map_err(|e| e.to_string())
    }

    /// The dataset's canonical table: the one flagged as default, or
    /// the first by position.
    pub fn default_table(&self, dataset_id: i64) -> Result<Option<Table>, String> {
        let conn = self.open()?;
        conn.query_row(
            "SELECT id, dataset_id, name, hidden FROM table_def \
             WHERE dataset_id = ?1 AND hidden = 0 \
             ORDER BY is_default DESC, position LIMIT 1",
            params![dataset_id],
            |row| Self::table_from_row(&conn, row),
        )
        .optional()
        .map_err(|e| e.to_string())
    }

    pub fn latest_version(&self, dataset_id: i64) -> Result<Option<Version>, String> {
        let conn = self.open()?;
        conn.query_row(
            "SELECT id, dataset_id, name, ord, collected_at, download_url \
             FROM version WHERE dataset_id = ?1 ORDER BY ord DESC LIMIT 1",
            params![dataset_id],
            |row| {
                Ok(Version {
                    id: row.get(0)?,
                    dataset_id: row.get(1)?,
                    name: row.get(2)?,
                    ord: row.get(3)?,
                    collected_at: row.get(4)?,
                    download_url: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(|e| e.to_string())
    }

    /// Whether the dataset has a file manifest at all. Absent manifest
    /// and empty manifest are different states for the files page.
    pub fn has_file_manifest(&self, dataset_id: i64) -> Result<bool, String> {
        let conn = self.open()?;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM file_manifest WHERE dataset_id = ?1)",
            params![dataset_id],
            |row| row.get(0),
        )
        .map_err(|e| e.to_string())
    }

    pub fn files(&self, dataset_id: i64) -> Result<Vec<DatasetFile>, String> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, size, sha512, url FROM dataset_file \
                 WHERE dataset_id = ?1 ORDER BY name",
            )
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map(params![dataset_id], |row| {
                Ok(DatasetFile {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    size: row.get(2)?,
                    sha512: row.get(3)?,
                    url: row.get(4)?,
                })
            })
            .map_err(|e| e.to_string())?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| e.to_string())
    }
}
