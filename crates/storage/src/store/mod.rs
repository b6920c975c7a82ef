#![forbid(unsafe_code)]

mod error;
mod read;

pub use error::StoreError;

use dt_core::ids::{AssetId, LeagueId, ManagerId};
use dt_core::model::{Asset, LeagueSeason, Manager, Transaction};
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SCHEMA_VERSION: i64 = 1;
const DB_FILE: &str = "dynastytrace.db";

/// SQLite-backed league store: the persistence half of the ingestion
/// collaborator. The engine consumes it read-only through
/// [`dt_core::store::LeagueStore`]; the write paths exist for seeding and
/// tests.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys = ON;")?;

        install_schema(&conn)?;
        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn upsert_league(&mut self, league: &LeagueSeason) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO leagues (id, season, name, previous_league_id)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
              season = excluded.season,
              name = excluded.name,
              previous_league_id = excluded.previous_league_id
            "#,
            params![
                league.id.as_str(),
                league.season,
                league.name.as_deref(),
                league.previous_league_id.as_ref().map(|id| id.as_str()),
            ],
        )?;
        Ok(())
    }

    pub fn upsert_manager(&mut self, manager: &Manager) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO managers (id, username, display_name)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
              username = excluded.username,
              display_name = excluded.display_name
            "#,
            params![
                manager.id.as_str(),
                manager.username,
                manager.display_name.as_deref(),
            ],
        )?;
        Ok(())
    }

    pub fn upsert_asset(&mut self, asset: &Asset) -> Result<(), StoreError> {
        let kind = if asset.is_draft_pick() {
            "draft_pick"
        } else {
            "player"
        };
        let payload = serde_json::to_string(asset)?;
        self.conn.execute(
            r#"
            INSERT INTO assets (id, kind, payload_json)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
              kind = excluded.kind,
              payload_json = excluded.payload_json
            "#,
            params![asset.id().as_str(), kind, payload],
        )?;
        Ok(())
    }

    /// Insert one transaction and its items atomically. Item rowids follow
    /// the slice order, which downstream code relies on as the stable
    /// tie-break for equal timestamps.
    pub fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError> {
        if transaction.items.is_empty() {
            return Err(StoreError::InvalidInput(
                "transaction must carry at least one item",
            ));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO transactions (id, league_id, tx_type, season, week, ts)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                transaction.id.as_str(),
                transaction.league_id.as_str(),
                transaction.tx_type.as_str(),
                transaction.season,
                transaction.week,
                transaction.timestamp,
            ],
        )?;
        for item in &transaction.items {
            tx.execute(
                r#"
                INSERT INTO transaction_items (transaction_id, asset_id, manager_id, direction)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    transaction.id.as_str(),
                    item.asset_id.as_str(),
                    item.manager_id.as_str(),
                    item.direction.as_str(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn set_roster_slot(
        &mut self,
        asset_id: &AssetId,
        manager_id: &ManagerId,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO roster_slots (asset_id, manager_id)
            VALUES (?1, ?2)
            ON CONFLICT(asset_id) DO UPDATE SET manager_id = excluded.manager_id
            "#,
            params![asset_id.as_str(), manager_id.as_str()],
        )?;
        Ok(())
    }

    pub fn clear_roster_slot(&mut self, asset_id: &AssetId) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM roster_slots WHERE asset_id = ?1",
            params![asset_id.as_str()],
        )?;
        Ok(())
    }

    /// Number of transactions persisted for one league. Seeding sanity
    /// checks use this; the engine itself never needs counts.
    pub fn transaction_count(&self, league_id: &LeagueId) -> Result<i64, StoreError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE league_id = ?1",
            params![league_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS leagues (
          id TEXT PRIMARY KEY,
          season INTEGER NOT NULL,
          name TEXT,
          previous_league_id TEXT
        );

        CREATE TABLE IF NOT EXISTS managers (
          id TEXT PRIMARY KEY,
          username TEXT NOT NULL,
          display_name TEXT
        );

        CREATE TABLE IF NOT EXISTS assets (
          id TEXT PRIMARY KEY,
          kind TEXT NOT NULL CHECK (kind IN ('player', 'draft_pick')),
          payload_json TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS transactions (
          id TEXT PRIMARY KEY,
          league_id TEXT NOT NULL REFERENCES leagues(id),
          tx_type TEXT NOT NULL,
          season INTEGER NOT NULL,
          week INTEGER,
          ts INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_transactions_league_ts
          ON transactions(league_id, ts);

        CREATE TABLE IF NOT EXISTS transaction_items (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          transaction_id TEXT NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
          asset_id TEXT NOT NULL,
          manager_id TEXT NOT NULL,
          direction TEXT NOT NULL CHECK (direction IN ('add', 'drop'))
        );
        CREATE INDEX IF NOT EXISTS idx_transaction_items_tx
          ON transaction_items(transaction_id);

        CREATE TABLE IF NOT EXISTS roster_slots (
          asset_id TEXT PRIMARY KEY,
          manager_id TEXT NOT NULL
        );
        "#,
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
        params![SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}
