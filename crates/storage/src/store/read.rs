#![forbid(unsafe_code)]

use super::*;
use dt_core::ids::TransactionId;
use dt_core::model::{Direction, TransactionItem, TransactionType};
use dt_core::store::LeagueStore;
use rusqlite::OptionalExtension;

impl LeagueStore for SqliteStore {
    type Error = StoreError;

    fn league(&self, id: &LeagueId) -> Result<Option<LeagueSeason>, Self::Error> {
        self.conn
            .query_row(
                "SELECT id, season, name, previous_league_id FROM leagues WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u16>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?
            .map(|(id, season, name, previous)| {
                Ok(LeagueSeason {
                    id: league_id(&id)?,
                    season,
                    name,
                    previous_league_id: previous.as_deref().map(league_id).transpose()?,
                })
            })
            .transpose()
    }

    fn list_transactions(&self, league_ids: &[LeagueId]) -> Result<Vec<Transaction>, Self::Error> {
        if league_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; league_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, league_id, tx_type, season, week, ts FROM transactions \
             WHERE league_id IN ({placeholders}) ORDER BY ts, rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(league_ids.iter().map(|id| id.as_str())),
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u16>(3)?,
                    row.get::<_, Option<u8>>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            },
        )?;

        let mut items_stmt = self.conn.prepare(
            "SELECT asset_id, manager_id, direction FROM transaction_items \
             WHERE transaction_id = ?1 ORDER BY id",
        )?;

        let mut transactions = Vec::new();
        for row in rows {
            let (id, league, tx_type, season, week, ts) = row?;
            let item_rows = items_stmt.query_map(params![id.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            let mut items = Vec::new();
            for item in item_rows {
                let (asset, manager, direction) = item?;
                items.push(TransactionItem {
                    asset_id: asset_id(&asset)?,
                    manager_id: manager_id(&manager)?,
                    direction: Direction::parse(&direction).ok_or_else(|| {
                        StoreError::Corrupt(format!("unknown item direction: {direction}"))
                    })?,
                });
            }
            transactions.push(Transaction {
                id: transaction_id(&id)?,
                league_id: league_id(&league)?,
                tx_type: TransactionType::parse(&tx_type).ok_or_else(|| {
                    StoreError::Corrupt(format!("unknown transaction type: {tx_type}"))
                })?,
                season,
                week,
                timestamp: ts,
                items,
            });
        }
        Ok(transactions)
    }

    fn asset(&self, id: &AssetId) -> Result<Option<Asset>, Self::Error> {
        self.conn
            .query_row(
                "SELECT payload_json FROM assets WHERE id = ?1",
                params![id.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .map(|payload| {
                serde_json::from_str(&payload)
                    .map_err(|err| StoreError::Corrupt(format!("asset {id}: {err}")))
            })
            .transpose()
    }

    fn manager(&self, id: &ManagerId) -> Result<Option<Manager>, Self::Error> {
        self.conn
            .query_row(
                "SELECT id, username, display_name FROM managers WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()?
            .map(|(id, username, display_name)| {
                Ok(Manager {
                    id: manager_id(&id)?,
                    username,
                    display_name,
                })
            })
            .transpose()
    }

    fn current_roster_holder(&self, asset: &AssetId) -> Result<Option<ManagerId>, Self::Error> {
        self.conn
            .query_row(
                "SELECT manager_id FROM roster_slots WHERE asset_id = ?1",
                params![asset.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .map(|id| manager_id(&id))
            .transpose()
    }
}

fn league_id(raw: &str) -> Result<LeagueId, StoreError> {
    LeagueId::try_new(raw)
        .map_err(|err| StoreError::Corrupt(format!("league id {raw:?}: {}", err.message())))
}

fn asset_id(raw: &str) -> Result<AssetId, StoreError> {
    AssetId::try_new(raw)
        .map_err(|err| StoreError::Corrupt(format!("asset id {raw:?}: {}", err.message())))
}

fn manager_id(raw: &str) -> Result<ManagerId, StoreError> {
    ManagerId::try_new(raw)
        .map_err(|err| StoreError::Corrupt(format!("manager id {raw:?}: {}", err.message())))
}

fn transaction_id(raw: &str) -> Result<TransactionId, StoreError> {
    TransactionId::try_new(raw)
        .map_err(|err| StoreError::Corrupt(format!("transaction id {raw:?}: {}", err.message())))
}
