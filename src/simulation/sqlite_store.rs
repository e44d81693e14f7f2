//! SQLite state store (feature `sqlite`).
//!
//! One database file with four tables: `elevator_system_state`,
//! `elevator_car_state`, `elevator_car_requests` and `system_requests`.
//! Each save runs in its own transaction, so there is nothing left to commit.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::error::StoreError;
use super::store::{CarRecord, RequestRecord, StateStore};
use super::types::CarId;

/// Stores simulation state in an SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    /// A private in-memory database.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS elevator_system_state (
                 id         INTEGER PRIMARY KEY,
                 num_floors INTEGER NOT NULL,
                 num_cars   INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS elevator_car_state (
                 car_id         INTEGER PRIMARY KEY,
                 current_floor  INTEGER NOT NULL,
                 direction      TEXT    NOT NULL,
                 current_state  TEXT    NOT NULL,
                 door_state     TEXT    NOT NULL,
                 door_open_time REAL
             );
             CREATE TABLE IF NOT EXISTS elevator_car_requests (
                 id        INTEGER PRIMARY KEY AUTOINCREMENT,
                 car_id    INTEGER NOT NULL,
                 floor     INTEGER NOT NULL,
                 direction TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS system_requests (
                 id        INTEGER PRIMARY KEY AUTOINCREMENT,
                 floor     INTEGER NOT NULL,
                 direction TEXT    NOT NULL
             );",
        )?;
        Ok(Self { conn })
    }

    fn load_requests(
        &self,
        sql: &str,
        car: Option<CarId>,
    ) -> Result<Vec<RequestRecord>, StoreError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<RequestRecord> {
            Ok(RequestRecord {
                floor: row.get(0)?,
                direction: row.get(1)?,
            })
        };
        let rows = match car {
            Some(car) => stmt.query_map(params![car.0 as i64], map_row)?,
            None => stmt.query_map([], map_row)?,
        };
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl StateStore for SqliteStore {
    fn save_system_config(&mut self, num_floors: u32, num_cars: usize) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO elevator_system_state (id, num_floors, num_cars) \
             VALUES (1, ?1, ?2)",
            params![num_floors, num_cars as i64],
        )?;
        Ok(())
    }

    fn load_system_config(&self) -> Result<Option<(u32, usize)>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT num_floors, num_cars FROM elevator_system_state WHERE id = 1",
                [],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        Ok(row.map(|(floors, cars)| (floors, cars as usize)))
    }

    fn save_car(&mut self, record: &CarRecord) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO elevator_car_state \
             (car_id, current_floor, direction, current_state, door_state, door_open_time) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.car_id as i64,
                record.current_floor,
                record.direction,
                record.state,
                record.door_state,
                record.door_opened_at,
            ],
        )?;
        Ok(())
    }

    fn load_car(&self, car: CarId) -> Result<Option<CarRecord>, StoreError> {
        let record = self
            .conn
            .query_row(
                "SELECT car_id, current_floor, direction, current_state, door_state, door_open_time \
                 FROM elevator_car_state WHERE car_id = ?1",
                params![car.0 as i64],
                |row| {
                    Ok(CarRecord {
                        car_id: row.get::<_, i64>(0)? as usize,
                        current_floor: row.get(1)?,
                        direction: row.get(2)?,
                        state: row.get(3)?,
                        door_state: row.get(4)?,
                        door_opened_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn save_car_requests(
        &mut self,
        car: CarId,
        requests: &[RequestRecord],
    ) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM elevator_car_requests WHERE car_id = ?1",
            params![car.0 as i64],
        )?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO elevator_car_requests (car_id, floor, direction) VALUES (?1, ?2, ?3)",
            )?;
            for request in requests {
                stmt.execute(params![car.0 as i64, request.floor, request.direction])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_car_requests(&self, car: CarId) -> Result<Vec<RequestRecord>, StoreError> {
        self.load_requests(
            "SELECT floor, direction FROM elevator_car_requests WHERE car_id = ?1 ORDER BY id",
            Some(car),
        )
    }

    fn save_system_requests(&mut self, requests: &[RequestRecord]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM system_requests", [])?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO system_requests (floor, direction) VALUES (?1, ?2)")?;
            for request in requests {
                stmt.execute(params![request.floor, request.direction])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_system_requests(&self) -> Result<Vec<RequestRecord>, StoreError> {
        self.load_requests(
            "SELECT floor, direction FROM system_requests ORDER BY id",
            None,
        )
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "DELETE FROM elevator_system_state;
             DELETE FROM elevator_car_state;
             DELETE FROM elevator_car_requests;
             DELETE FROM system_requests;",
        )?;
        Ok(())
    }
}
