use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;

use crate::domain::models::{EnergyRecord, EnergyRecordInput};

pub const LATEST_SCHEMA_VERSION: u32 = 1;

const MIGRATIONS: &[(u32, &str)] = &[(
    1,
    include_str!("../../migrations/001_create_energy_records.sql"),
)];

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("record with ID {0} not found")]
    NotFound(i64),
    #[error("invalid date {value:?} stored for record {id}: {source}")]
    InvalidDate {
        id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("unsupported schema version {current}; latest supported is {latest}")]
    UnsupportedSchemaVersion { current: u32, latest: u32 },
    #[error("error reading migrations directory {}: {source}", path.display())]
    MigrationsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error executing migration {}: {source}", path.display())]
    Migration {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

pub fn open_connection(path: &str) -> Result<Connection, DbError> {
    Connection::open(path).map_err(DbError::from)
}

pub fn run_migrations(connection: &mut Connection) -> Result<(), DbError> {
    let current_version = schema_version(connection)?;

    if current_version > LATEST_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            current: current_version,
            latest: LATEST_SCHEMA_VERSION,
        });
    }

    let transaction = connection.transaction()?;

    for (version, sql) in MIGRATIONS {
        if *version > current_version {
            transaction.execute_batch(sql)?;
            transaction.pragma_update(None, "user_version", version)?;
        }
    }

    transaction.commit()?;

    Ok(())
}

pub fn apply_migrations_dir(
    connection: &mut Connection,
    dir: &Path,
) -> Result<Vec<PathBuf>, DbError> {
    let dir_error = |source: std::io::Error| DbError::MigrationsDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(dir_error)? {
        let path = entry.map_err(dir_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort_by(|left, right| left.file_name().cmp(&right.file_name()));

    let transaction = connection.transaction()?;

    for path in &files {
        let sql = std::fs::read_to_string(path).map_err(|source| DbError::MigrationsDir {
            path: path.clone(),
            source,
        })?;
        transaction
            .execute_batch(&sql)
            .map_err(|source| DbError::Migration {
                path: path.clone(),
                source,
            })?;
        tracing::info!(migration = %path.display(), "migration executed");
    }

    transaction.commit()?;

    Ok(files)
}

pub fn schema_version(connection: &Connection) -> Result<u32, DbError> {
    let version = connection.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

struct RecordRow {
    id: i64,
    date: String,
    usage: f64,
    duration: f64,
    device: String,
}

impl RecordRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            usage: row.get(2)?,
            duration: row.get(3)?,
            device: row.get(4)?,
        })
    }

    fn into_record(self) -> Result<EnergyRecord, DbError> {
        let date = parse_stored_date(self.id, self.date)?;
        Ok(EnergyRecord {
            id: self.id,
            date,
            usage: self.usage,
            duration: self.duration,
            device: self.device,
        })
    }
}

fn parse_stored_date(id: i64, value: String) -> Result<DateTime<Utc>, DbError> {
    match DateTime::parse_from_rfc3339(&value) {
        Ok(date) => Ok(date.with_timezone(&Utc)),
        Err(source) => Err(DbError::InvalidDate { id, value, source }),
    }
}

pub fn insert_record(
    connection: &Connection,
    input: &EnergyRecordInput,
    date: DateTime<Utc>,
) -> Result<EnergyRecord, DbError> {
    let (id, stored_date): (i64, String) = connection.query_row(
        "INSERT INTO energy_records (date, usage, duration, device)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING id, date",
        params![
            format_timestamp(date),
            input.usage,
            input.duration,
            input.device
        ],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(EnergyRecord {
        id,
        date: parse_stored_date(id, stored_date)?,
        usage: input.usage,
        duration: input.duration,
        device: input.device.clone(),
    })
}

pub fn get_record(connection: &Connection, id: i64) -> Result<EnergyRecord, DbError> {
    let row = connection.query_row(
        "SELECT id, date, usage, duration, device FROM energy_records WHERE id = ?1",
        params![id],
        RecordRow::from_row,
    );

    match row {
        Ok(row) => row.into_record(),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DbError::NotFound(id)),
        Err(error) => Err(DbError::from(error)),
    }
}

pub fn list_records(connection: &Connection) -> Result<Vec<EnergyRecord>, DbError> {
    let mut statement = connection.prepare(
        "SELECT id, date, usage, duration, device
         FROM energy_records
         ORDER BY id ASC",
    )?;

    let rows = statement.query_map([], RecordRow::from_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?.into_record()?);
    }

    Ok(records)
}

pub fn update_record(
    connection: &Connection,
    id: i64,
    input: &EnergyRecordInput,
) -> Result<EnergyRecord, DbError> {
    let mut statement = connection.prepare(
        "UPDATE energy_records SET usage = ?1, duration = ?2, device = ?3
         WHERE id = ?4
         RETURNING date",
    )?;
    let mut rows = statement.query(params![input.usage, input.duration, input.device, id])?;

    let Some(row) = rows.next()? else {
        return Err(DbError::NotFound(id));
    };
    let stored_date: String = row.get(0)?;

    Ok(EnergyRecord {
        id,
        date: parse_stored_date(id, stored_date)?,
        usage: input.usage,
        duration: input.duration,
        device: input.device.clone(),
    })
}

pub fn delete_record(connection: &Connection, id: i64) -> Result<(), DbError> {
    let affected = connection.execute("DELETE FROM energy_records WHERE id = ?1", params![id])?;

    if affected == 0 {
        return Err(DbError::NotFound(id));
    }

    Ok(())
}
