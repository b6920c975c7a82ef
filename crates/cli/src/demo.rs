#![forbid(unsafe_code)]

//! Demo dynasty seeder: two seasons, three managers, a startup draft, a
//! rookie-season pickup and two trades. Gives every subcommand something to
//! chew on without a real league export.

use dt_core::ids::{AssetId, LeagueId, ManagerId, TransactionId};
use dt_core::model::{
    Asset, Direction, LeagueSeason, Manager, Transaction, TransactionItem, TransactionType,
};
use dt_storage::{SqliteStore, StoreError};

pub struct DemoCounts {
    pub leagues: usize,
    pub managers: usize,
    pub assets: usize,
    pub transactions: usize,
}

pub fn seed_demo(store: &mut SqliteStore) -> Result<DemoCounts, StoreError> {
    let leagues = [
        LeagueSeason {
            id: league("league-2023")?,
            season: 2023,
            name: Some("Demo Dynasty".to_string()),
            previous_league_id: None,
        },
        LeagueSeason {
            id: league("league-2024")?,
            season: 2024,
            name: Some("Demo Dynasty".to_string()),
            previous_league_id: Some(league("league-2023")?),
        },
    ];
    for entry in &leagues {
        store.upsert_league(entry)?;
    }

    let managers = [
        ("m1", "arrowhead"),
        ("m2", "bluechip"),
        ("m3", "capstone"),
    ];
    for (id, username) in managers {
        store.upsert_manager(&Manager {
            id: manager(id)?,
            username: username.to_string(),
            display_name: Some(username.to_string()),
        })?;
    }

    let players = [
        ("player-x", "Jaxon Reed", "WR"),
        ("player-y", "Cole Banner", "RB"),
        ("player-r", "Trey Holt", "TE"),
    ];
    for (id, name, position) in players {
        store.upsert_asset(&Asset::Player {
            id: asset(id)?,
            name: name.to_string(),
            position: Some(position.to_string()),
            team: None,
        })?;
    }
    store.upsert_asset(&Asset::DraftPick {
        id: asset("pick-2023-1-m1")?,
        season: 2023,
        round: 1,
        original_owner: manager("m1")?,
        current_owner: manager("m1")?,
        previous_owner: None,
        pick_number: Some(3),
        selected_player: Some(asset("player-x")?),
    })?;
    store.upsert_asset(&Asset::DraftPick {
        id: asset("pick-2025-2-m2")?,
        season: 2025,
        round: 2,
        original_owner: manager("m2")?,
        current_owner: manager("m1")?,
        previous_owner: Some(manager("m2")?),
        pick_number: None,
        selected_player: None,
    })?;

    let transactions = [
        transaction(
            "t1",
            "league-2023",
            TransactionType::Draft,
            2023,
            1_680_300_000_000,
            &[
                ("pick-2023-1-m1", "m1", Direction::Drop),
                ("player-x", "m1", Direction::Add),
            ],
        )?,
        transaction(
            "t3",
            "league-2024",
            TransactionType::FreeAgent,
            2024,
            1_715_000_000_000,
            &[("player-r", "m3", Direction::Add)],
        )?,
        transaction(
            "t2",
            "league-2024",
            TransactionType::Trade,
            2024,
            1_725_000_000_000,
            &[
                ("player-x", "m1", Direction::Drop),
                ("player-x", "m2", Direction::Add),
                ("player-y", "m2", Direction::Drop),
                ("player-y", "m1", Direction::Add),
            ],
        )?,
        transaction(
            "t4",
            "league-2024",
            TransactionType::Trade,
            2024,
            1_727_000_000_000,
            &[
                ("player-y", "m1", Direction::Drop),
                ("player-y", "m2", Direction::Add),
                ("pick-2025-2-m2", "m2", Direction::Drop),
                ("pick-2025-2-m2", "m1", Direction::Add),
            ],
        )?,
    ];
    for entry in &transactions {
        store.insert_transaction(entry)?;
    }

    store.set_roster_slot(&asset("player-x")?, &manager("m2")?)?;
    store.set_roster_slot(&asset("player-y")?, &manager("m2")?)?;
    store.set_roster_slot(&asset("player-r")?, &manager("m3")?)?;

    Ok(DemoCounts {
        leagues: leagues.len(),
        managers: managers.len(),
        assets: players.len() + 2,
        transactions: transactions.len(),
    })
}

fn league(raw: &str) -> Result<LeagueId, StoreError> {
    LeagueId::try_new(raw).map_err(|_| StoreError::InvalidInput("demo league id"))
}

fn manager(raw: &str) -> Result<ManagerId, StoreError> {
    ManagerId::try_new(raw).map_err(|_| StoreError::InvalidInput("demo manager id"))
}

fn asset(raw: &str) -> Result<AssetId, StoreError> {
    AssetId::try_new(raw).map_err(|_| StoreError::InvalidInput("demo asset id"))
}

fn transaction(
    id: &str,
    league_id: &str,
    tx_type: TransactionType,
    season: u16,
    timestamp: i64,
    items: &[(&str, &str, Direction)],
) -> Result<Transaction, StoreError> {
    let mut resolved = Vec::with_capacity(items.len());
    for (asset_id, manager_id, direction) in items {
        resolved.push(TransactionItem {
            asset_id: asset(asset_id)?,
            manager_id: manager(manager_id)?,
            direction: *direction,
        });
    }
    Ok(Transaction {
        id: TransactionId::try_new(id).map_err(|_| StoreError::InvalidInput("demo tx id"))?,
        league_id: league(league_id)?,
        tx_type,
        season,
        week: None,
        timestamp,
        items: resolved,
    })
}
