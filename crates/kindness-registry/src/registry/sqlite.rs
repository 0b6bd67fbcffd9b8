use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};

use super::domain::{NewPosition, Position, PositionFilter, PositionId};
use super::store::{Change, PositionStore, StoreError};

const DB_SCHEMA_VERSION: i64 = 1;

const POSITION_COLUMNS: &str = "id, name, position_code, floor, section, level, position, \
     applicant_name, relation, mobile_phone, note";

/// SQLite-backed store. A connection is opened per operation so the handle
/// stays `Send + Sync`; every commit runs inside one immediate transaction.
#[derive(Debug, Clone)]
pub struct SqlitePositionStore {
    path: PathBuf,
}

fn map_position_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Position> {
    Ok(Position {
        id: PositionId(row.get(0)?),
        name: row.get(1)?,
        position_code: row.get(2)?,
        floor: row.get(3)?,
        section: row.get(4)?,
        level: row.get(5)?,
        position: row.get(6)?,
        applicant_name: row.get(7)?,
        relation: row.get(8)?,
        mobile_phone: row.get(9)?,
        note: row.get(10)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn conflict_or_sqlite(err: rusqlite::Error, code: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict {
            code: code.to_string(),
        }
    } else {
        StoreError::Sqlite(err)
    }
}

fn db_insert_position(conn: &Connection, new: &NewPosition) -> Result<usize, StoreError> {
    conn.execute(
        r#"
        INSERT INTO positions (
            name, position_code, floor, section, level, position,
            applicant_name, relation, mobile_phone, note
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            new.name,
            new.position_code,
            new.floor,
            new.section,
            new.level,
            new.position,
            new.applicant_name,
            new.relation,
            new.mobile_phone,
            new.note
        ],
    )
    .map_err(|err| conflict_or_sqlite(err, &new.position_code))
}

fn db_update_position(conn: &Connection, position: &Position) -> Result<usize, StoreError> {
    let rows = conn
        .execute(
            r#"
            UPDATE positions
            SET name = ?2,
                position_code = ?3,
                floor = ?4,
                section = ?5,
                level = ?6,
                position = ?7,
                applicant_name = ?8,
                relation = ?9,
                mobile_phone = ?10,
                note = ?11
            WHERE id = ?1
            "#,
            params![
                position.id.0,
                position.name,
                position.position_code,
                position.floor,
                position.section,
                position.level,
                position.position,
                position.applicant_name,
                position.relation,
                position.mobile_phone,
                position.note
            ],
        )
        .map_err(|err| conflict_or_sqlite(err, &position.position_code))?;

    if rows == 0 {
        return Err(StoreError::NotFound(position.id));
    }
    Ok(rows)
}

fn db_delete_position(conn: &Connection, id: PositionId) -> Result<usize, StoreError> {
    Ok(conn.execute("DELETE FROM positions WHERE id = ?1", params![id.0])?)
}

impl SqlitePositionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the database file and schema if they do not exist yet.
    pub fn init(&self) -> Result<(), StoreError> {
        self.with_conn(|_conn| Ok(()))
    }

    fn open(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(Duration::from_millis(500))?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.open()?;
        f(&conn)
    }

    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        if version == 0 {
            tracing::info!(
                from = version,
                to = DB_SCHEMA_VERSION,
                "sqlite schema migration"
            );
            conn.execute_batch(
                r#"
            CREATE TABLE positions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                position_code TEXT NOT NULL UNIQUE,
                floor TEXT NOT NULL,
                section TEXT NOT NULL,
                level TEXT NOT NULL,
                position TEXT NOT NULL,
                applicant_name TEXT,
                relation TEXT,
                mobile_phone TEXT,
                note TEXT
            );
            CREATE INDEX positions_name_idx ON positions(name);
            "#,
            )?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::ErrorCode::SchemaChanged as i32),
            Some(format!(
                "database schema version {version} is newer than supported version {DB_SCHEMA_VERSION}"
            )),
        ))
    }
}

impl PositionStore for SqlitePositionStore {
    fn get(&self, id: PositionId) -> Result<Option<Position>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {POSITION_COLUMNS} FROM positions WHERE id = ?1");
            Ok(conn
                .query_row(&sql, params![id.0], map_position_row)
                .optional()?)
        })
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Position>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {POSITION_COLUMNS} FROM positions WHERE position_code = ?1");
            Ok(conn
                .query_row(&sql, params![code], map_position_row)
                .optional()?)
        })
    }

    fn get_all(&self, filter: &PositionFilter) -> Result<Vec<Position>, StoreError> {
        self.with_conn(|conn| {
            let rows = match filter.name_contains.as_deref() {
                Some(term) => {
                    let sql = format!(
                        "SELECT {POSITION_COLUMNS} FROM positions WHERE instr(name, ?1) > 0 ORDER BY id"
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let mapped = stmt
                        .query_map(params![term], map_position_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    mapped
                }
                None => {
                    let sql = format!("SELECT {POSITION_COLUMNS} FROM positions ORDER BY id");
                    let mut stmt = conn.prepare(&sql)?;
                    let mapped = stmt
                        .query_map([], map_position_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    mapped
                }
            };
            Ok(rows)
        })
    }

    fn commit(&self, changes: Vec<Change>) -> Result<usize, StoreError> {
        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut affected = 0;
        for change in &changes {
            affected += match change {
                Change::Add(new) => db_insert_position(&tx, new)?,
                Change::Update(position) => db_update_position(&tx, position)?,
                Change::Remove(id) => db_delete_position(&tx, *id)?,
            };
        }
        tx.commit()?;
        Ok(affected)
    }
}
