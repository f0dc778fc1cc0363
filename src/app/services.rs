use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

use crate::adapters::db;
use crate::adapters::db::DbError;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::models::{EnergyRecord, EnergyRecordInput};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record with ID {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Storage(String),
}

impl StoreError {
    fn storage<E: std::fmt::Display>(context: &str, error: E) -> Self {
        Self::Storage(format!("{context}: {error}"))
    }
}

pub trait RecordStore: Send + Sync {
    fn create(&self, input: &EnergyRecordInput) -> Result<EnergyRecord, StoreError>;
    fn get_by_id(&self, id: i64) -> Result<EnergyRecord, StoreError>;
    fn list(&self) -> Result<Vec<EnergyRecord>, StoreError>;
    fn update(&self, id: i64, input: &EnergyRecordInput) -> Result<EnergyRecord, StoreError>;
    fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SqliteRecordStore<C = SystemClock> {
    connection: Arc<Mutex<Connection>>,
    clock: C,
}

impl<C> SqliteRecordStore<C>
where
    C: Clock,
{
    pub fn new(connection: Arc<Mutex<Connection>>, clock: C) -> Self {
        Self { connection, clock }
    }

    fn with_connection<T>(
        &self,
        context: &str,
        op: impl FnOnce(&Connection) -> Result<T, DbError>,
    ) -> Result<T, StoreError> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| StoreError::storage(context, "database lock poisoned"))?;

        op(&connection).map_err(|error| match error {
            DbError::NotFound(id) => StoreError::NotFound(id),
            other => StoreError::storage(context, other),
        })
    }
}

impl<C> RecordStore for SqliteRecordStore<C>
where
    C: Clock + Send + Sync,
{
    fn create(&self, input: &EnergyRecordInput) -> Result<EnergyRecord, StoreError> {
        let date = self.clock.now();
        self.with_connection("error inserting record", |connection| {
            db::insert_record(connection, input, date)
        })
    }

    fn get_by_id(&self, id: i64) -> Result<EnergyRecord, StoreError> {
        self.with_connection("error retrieving record", |connection| {
            db::get_record(connection, id)
        })
    }

    fn list(&self) -> Result<Vec<EnergyRecord>, StoreError> {
        self.with_connection("error fetching records", db::list_records)
    }

    fn update(&self, id: i64, input: &EnergyRecordInput) -> Result<EnergyRecord, StoreError> {
        self.with_connection("error updating record", |connection| {
            db::update_record(connection, id, input)
        })
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.with_connection("error deleting record", |connection| {
            db::delete_record(connection, id)
        })
    }
}

#[derive(Debug, Default)]
struct MemoryTable {
    last_id: i64,
    rows: BTreeMap<i64, EnergyRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryRecordStore<C = SystemClock> {
    table: Mutex<MemoryTable>,
    clock: C,
}

impl<C> InMemoryRecordStore<C>
where
    C: Clock,
{
    pub fn new(clock: C) -> Self {
        Self {
            table: Mutex::new(MemoryTable::default()),
            clock,
        }
    }

    fn with_table<T>(
        &self,
        context: &str,
        op: impl FnOnce(&mut MemoryTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut table = self
            .table
            .lock()
            .map_err(|_| StoreError::storage(context, "store lock poisoned"))?;
        op(&mut table)
    }
}

impl<C> RecordStore for InMemoryRecordStore<C>
where
    C: Clock + Send + Sync,
{
    fn create(&self, input: &EnergyRecordInput) -> Result<EnergyRecord, StoreError> {
        let date = self.clock.now();
        self.with_table("error inserting record", |table| {
            table.last_id += 1;
            let record = EnergyRecord {
                id: table.last_id,
                date,
                usage: input.usage,
                duration: input.duration,
                device: input.device.clone(),
            };
            table.rows.insert(record.id, record.clone());
            Ok(record)
        })
    }

    fn get_by_id(&self, id: i64) -> Result<EnergyRecord, StoreError> {
        self.with_table("error retrieving record", |table| {
            table.rows.get(&id).cloned().ok_or(StoreError::NotFound(id))
        })
    }

    fn list(&self) -> Result<Vec<EnergyRecord>, StoreError> {
        self.with_table("error fetching records", |table| {
            Ok(table.rows.values().cloned().collect())
        })
    }

    fn update(&self, id: i64, input: &EnergyRecordInput) -> Result<EnergyRecord, StoreError> {
        self.with_table("error updating record", |table| {
            let record = table.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            record.usage = input.usage;
            record.duration = input.duration;
            record.device = input.device.clone();
            Ok(record.clone())
        })
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.with_table("error deleting record", |table| {
            table
                .rows
                .remove(&id)
                .map(|_| ())
                .ok_or(StoreError::NotFound(id))
        })
    }
}
