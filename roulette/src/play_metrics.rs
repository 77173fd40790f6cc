/// Spin and teleport counters, one row per game plus one row per player.
/// Plain upserts; the counters have no algorithmic content beyond addition.
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::path::Path;
use versions::types::GameId;

#[derive(thiserror::Error, Debug)]
pub enum PlayMetricsError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetrics {
    pub spins: u64,
    pub teleports: u64,
    pub missed_teleports: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlayerMetrics {
    pub spins: u64,
    pub teleports: u64,
}

pub struct PlayMetricsStore {
    conn: Mutex<Connection>,
}

impl PlayMetricsStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlayMetricsError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, PlayMetricsError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, PlayMetricsError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS metrics (
                game INTEGER PRIMARY KEY,
                spins INTEGER NOT NULL DEFAULT 0,
                teleports INTEGER NOT NULL DEFAULT 0,
                missedTeleports INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS playerMetrics (
                player INTEGER PRIMARY KEY,
                spins INTEGER NOT NULL DEFAULT 0,
                teleports INTEGER NOT NULL DEFAULT 0
            );",
        )?;

        Ok(PlayMetricsStore {
            conn: Mutex::new(conn),
        })
    }

    /// Zero counters for games that were never spun.
    pub fn game_metrics(&self, game_id: GameId) -> Result<GameMetrics, PlayMetricsError> {
        let row = self
            .conn
            .lock()
            .query_row(
                "SELECT spins, teleports, missedTeleports FROM metrics WHERE game = ?1",
                params![game_id as i64],
                |row| {
                    Ok(GameMetrics {
                        spins: row.get::<_, i64>(0)? as u64,
                        teleports: row.get::<_, i64>(1)? as u64,
                        missed_teleports: row.get::<_, i64>(2)? as u64,
                    })
                },
            )
            .optional()?;

        Ok(row.unwrap_or_default())
    }

    pub fn record_spin(&self, game_id: GameId) -> Result<(), PlayMetricsError> {
        self.conn.lock().execute(
            "INSERT INTO metrics (game, spins) VALUES (?1, 1)
             ON CONFLICT(game) DO UPDATE SET spins = spins + 1",
            params![game_id as i64],
        )?;
        Ok(())
    }

    /// Adds a teleport report to an existing game row. Games that were never
    /// spun have no row and the report is dropped, matching the spin-first
    /// flow.
    pub fn record_teleports(
        &self,
        game_id: GameId,
        teleports: u64,
        missed: u64,
    ) -> Result<(), PlayMetricsError> {
        self.conn.lock().execute(
            "UPDATE metrics SET teleports = teleports + ?1, missedTeleports = missedTeleports + ?2
             WHERE game = ?3",
            params![teleports as i64, missed as i64, game_id as i64],
        )?;
        Ok(())
    }

    pub fn record_player_spin(&self, player_id: u64) -> Result<(), PlayMetricsError> {
        self.conn.lock().execute(
            "INSERT INTO playerMetrics (player, spins, teleports) VALUES (?1, 1, 0)
             ON CONFLICT(player) DO UPDATE SET spins = spins + 1",
            params![player_id as i64],
        )?;
        Ok(())
    }

    pub fn record_player_teleport(&self, player_id: u64) -> Result<(), PlayMetricsError> {
        self.conn.lock().execute(
            "INSERT INTO playerMetrics (player, spins, teleports) VALUES (?1, 1, 1)
             ON CONFLICT(player) DO UPDATE SET teleports = teleports + 1",
            params![player_id as i64],
        )?;
        Ok(())
    }

    pub fn player_metrics(&self, player_id: u64) -> Result<Option<PlayerMetrics>, PlayMetricsError> {
        let row = self
            .conn
            .lock()
            .query_row(
                "SELECT spins, teleports FROM playerMetrics WHERE player = ?1",
                params![player_id as i64],
                |row| {
                    Ok(PlayerMetrics {
                        spins: row.get::<_, i64>(0)? as u64,
                        teleports: row.get::<_, i64>(1)? as u64,
                    })
                },
            )
            .optional()?;

        Ok(row)
    }
}
