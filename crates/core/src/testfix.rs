#![forbid(unsafe_code)]

//! In-memory store used by the engine's unit tests: a small dynasty with a
//! startup draft, a rookie draft, trades across two seasons and a traded
//! future pick, plus purpose-built pathological variants.

use crate::ids::{AssetId, LeagueId, ManagerId, TransactionId};
use crate::model::{
    Asset, Direction, LeagueSeason, Manager, Transaction, TransactionItem, TransactionType,
};
use crate::store::LeagueStore;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;

pub(crate) struct FixtureStore {
    leagues: Vec<LeagueSeason>,
    managers: BTreeMap<ManagerId, Manager>,
    assets: BTreeMap<AssetId, Asset>,
    transactions: Vec<Transaction>,
    roster: BTreeMap<AssetId, ManagerId>,
}

impl FixtureStore {
    pub(crate) fn asset(id: &str) -> AssetId {
        AssetId::try_new(id).expect("fixture asset id")
    }

    pub(crate) fn manager(id: &str) -> ManagerId {
        ManagerId::try_new(id).expect("fixture manager id")
    }

    pub(crate) fn transaction(id: &str) -> TransactionId {
        TransactionId::try_new(id).expect("fixture transaction id")
    }

    pub(crate) fn league_2023() -> LeagueId {
        LeagueId::try_new("league-2023").expect("fixture league id")
    }

    pub(crate) fn league_2024() -> LeagueId {
        LeagueId::try_new("league-2024").expect("fixture league id")
    }

    pub(crate) fn seasons_oldest_first(&self) -> Vec<LeagueSeason> {
        self.leagues.clone()
    }

    fn empty_single_league() -> Self {
        Self {
            leagues: vec![LeagueSeason {
                id: Self::league_2024(),
                season: 2024,
                name: Some("Fixture League".to_string()),
                previous_league_id: None,
            }],
            managers: default_managers(),
            assets: BTreeMap::new(),
            transactions: Vec::new(),
            roster: BTreeMap::new(),
        }
    }

    fn player(&mut self, id: &str, name: &str, position: &str) {
        self.assets.insert(
            Self::asset(id),
            Asset::Player {
                id: Self::asset(id),
                name: name.to_string(),
                position: Some(position.to_string()),
                team: None,
            },
        );
    }

    fn tx(
        &mut self,
        id: &str,
        league: &LeagueId,
        tx_type: TransactionType,
        season: u16,
        timestamp: i64,
        items: &[(&str, &str, Direction)],
    ) {
        self.transactions.push(Transaction {
            id: Self::transaction(id),
            league_id: league.clone(),
            tx_type,
            season,
            week: None,
            timestamp,
            items: items
                .iter()
                .map(|(asset, manager, direction)| TransactionItem {
                    asset_id: Self::asset(asset),
                    manager_id: Self::manager(manager),
                    direction: *direction,
                })
                .collect(),
        });
    }

    /// The main fixture: 2023 league rolled over into 2024.
    ///
    /// t1  2023 startup draft: pick-2023-1-m1 becomes player-x for m1.
    /// t3  2024 rookie draft:  pick-2024-1-m3 becomes player-r for m3.
    /// t2  2024 trade:         m1 sends player-x to m2 for player-y.
    /// t4  2024 trade:         m1 sends player-y to m2 for a 2025 pick.
    pub(crate) fn two_season_dynasty() -> Self {
        let mut store = Self::empty_single_league();
        store.leagues = vec![
            LeagueSeason {
                id: Self::league_2023(),
                season: 2023,
                name: Some("Fixture League".to_string()),
                previous_league_id: None,
            },
            LeagueSeason {
                id: Self::league_2024(),
                season: 2024,
                name: Some("Fixture League".to_string()),
                previous_league_id: Some(Self::league_2023()),
            },
        ];

        store.player("player-x", "Jaxon Reed", "WR");
        store.player("player-y", "Cole Banner", "RB");
        store.player("player-r", "Trey Holt", "TE");
        store.assets.insert(
            Self::asset("pick-2023-1-m1"),
            Asset::DraftPick {
                id: Self::asset("pick-2023-1-m1"),
                season: 2023,
                round: 1,
                original_owner: Self::manager("m1"),
                current_owner: Self::manager("m1"),
                previous_owner: None,
                pick_number: Some(3),
                selected_player: Some(Self::asset("player-x")),
            },
        );
        store.assets.insert(
            Self::asset("pick-2024-1-m3"),
            Asset::DraftPick {
                id: Self::asset("pick-2024-1-m3"),
                season: 2024,
                round: 1,
                original_owner: Self::manager("m3"),
                current_owner: Self::manager("m3"),
                previous_owner: None,
                pick_number: Some(1),
                selected_player: Some(Self::asset("player-r")),
            },
        );
        store.assets.insert(
            Self::asset("pick-2025-2-m2"),
            Asset::DraftPick {
                id: Self::asset("pick-2025-2-m2"),
                season: 2025,
                round: 2,
                original_owner: Self::manager("m2"),
                current_owner: Self::manager("m1"),
                previous_owner: Some(Self::manager("m2")),
                pick_number: None,
                selected_player: None,
            },
        );

        let l2023 = Self::league_2023();
        let l2024 = Self::league_2024();
        store.tx(
            "t1",
            &l2023,
            TransactionType::Draft,
            2023,
            1_680_300_000_000,
            &[
                ("pick-2023-1-m1", "m1", Direction::Drop),
                ("player-x", "m1", Direction::Add),
            ],
        );
        store.tx(
            "t3",
            &l2024,
            TransactionType::Draft,
            2024,
            1_715_000_000_000,
            &[
                ("pick-2024-1-m3", "m3", Direction::Drop),
                ("player-r", "m3", Direction::Add),
            ],
        );
        store.tx(
            "t2",
            &l2024,
            TransactionType::Trade,
            2024,
            1_725_000_000_000,
            &[
                ("player-x", "m1", Direction::Drop),
                ("player-x", "m2", Direction::Add),
                ("player-y", "m2", Direction::Drop),
                ("player-y", "m1", Direction::Add),
            ],
        );
        store.tx(
            "t4",
            &l2024,
            TransactionType::Trade,
            2024,
            1_727_000_000_000,
            &[
                ("player-y", "m1", Direction::Drop),
                ("player-y", "m2", Direction::Add),
                ("pick-2025-2-m2", "m2", Direction::Drop),
                ("pick-2025-2-m2", "m1", Direction::Add),
            ],
        );

        store
            .roster
            .insert(Self::asset("player-x"), Self::manager("m2"));
        store
            .roster
            .insert(Self::asset("player-y"), Self::manager("m2"));
        store
            .roster
            .insert(Self::asset("player-r"), Self::manager("m3"));
        store
    }

    /// Two commissioner moves sharing one timestamp.
    pub(crate) fn tied_timestamps() -> Self {
        let mut store = Self::empty_single_league();
        store.player("player-x", "Jaxon Reed", "WR");
        let league = Self::league_2024();
        store.tx(
            "t1",
            &league,
            TransactionType::Commissioner,
            2024,
            500,
            &[("player-x", "m1", Direction::Add)],
        );
        store.tx(
            "t2",
            &league,
            TransactionType::Commissioner,
            2024,
            500,
            &[("player-x", "m1", Direction::Drop)],
        );
        store
    }

    /// A transaction whose every item points at an asset the store has never
    /// seen.
    pub(crate) fn with_phantom_items() -> Self {
        let mut store = Self::empty_single_league();
        let league = Self::league_2024();
        store.tx(
            "t1",
            &league,
            TransactionType::Waiver,
            2024,
            100,
            &[("ghost-1", "m1", Direction::Add), ("ghost-2", "m1", Direction::Drop)],
        );
        store
    }

    /// previous-league pointers forming a loop: 2024 → 2023 → 2024.
    pub(crate) fn looped_dynasty() -> Self {
        let mut store = Self::two_season_dynasty();
        store.leagues[0].previous_league_id = Some(Self::league_2024());
        store
    }

    /// 2024 points at a 2023 league the store does not hold.
    pub(crate) fn dangling_dynasty() -> Self {
        let mut store = Self::empty_single_league();
        store.leagues[0].previous_league_id = Some(Self::league_2023());
        store.player("player-x", "Jaxon Reed", "WR");
        let league = Self::league_2024();
        store.tx(
            "t1",
            &league,
            TransactionType::FreeAgent,
            2024,
            100,
            &[("player-x", "m1", Direction::Add)],
        );
        store
    }

    /// One trade between three managers: a, b and c rotate one step.
    pub(crate) fn three_party_trade() -> Self {
        let mut store = Self::empty_single_league();
        store.player("player-a", "Avery North", "QB");
        store.player("player-b", "Beck Sullivan", "WR");
        store.player("player-c", "Cruz Delgado", "RB");
        let league = Self::league_2024();
        store.tx(
            "t1",
            &league,
            TransactionType::Trade,
            2024,
            100,
            &[
                ("player-a", "m1", Direction::Drop),
                ("player-c", "m1", Direction::Add),
                ("player-b", "m2", Direction::Drop),
                ("player-a", "m2", Direction::Add),
                ("player-c", "m3", Direction::Drop),
                ("player-b", "m3", Direction::Add),
            ],
        );
        store
    }

    /// A traded for B, then B traded straight back for A.
    pub(crate) fn cycle_trades() -> Self {
        let mut store = Self::empty_single_league();
        store.player("player-a", "Avery North", "QB");
        store.player("player-b", "Beck Sullivan", "WR");
        let league = Self::league_2024();
        store.tx(
            "t1",
            &league,
            TransactionType::Trade,
            2024,
            100,
            &[
                ("player-a", "m1", Direction::Drop),
                ("player-a", "m2", Direction::Add),
                ("player-b", "m2", Direction::Drop),
                ("player-b", "m1", Direction::Add),
            ],
        );
        store.tx(
            "t2",
            &league,
            TransactionType::Trade,
            2024,
            200,
            &[
                ("player-a", "m2", Direction::Drop),
                ("player-a", "m1", Direction::Add),
                ("player-b", "m1", Direction::Drop),
                ("player-b", "m2", Direction::Add),
            ],
        );
        store
            .roster
            .insert(Self::asset("player-a"), Self::manager("m1"));
        store
            .roster
            .insert(Self::asset("player-b"), Self::manager("m2"));
        store
    }

    /// One trade where m2 sends `received` assets to m1 for player-x alone.
    pub(crate) fn wide_trade(received: usize) -> Self {
        let mut store = Self::empty_single_league();
        store.player("player-x", "Jaxon Reed", "WR");
        let names: Vec<String> = (0..received).map(|index| format!("haul-{index}")).collect();
        for (index, name) in names.iter().enumerate() {
            store.player(name, &format!("Haul Player {index}"), "WR");
        }

        let mut items: Vec<(&str, &str, Direction)> = vec![
            ("player-x", "m1", Direction::Drop),
            ("player-x", "m2", Direction::Add),
        ];
        for name in &names {
            items.push((name.as_str(), "m2", Direction::Drop));
            items.push((name.as_str(), "m1", Direction::Add));
        }
        store.tx(
            "t1",
            &Self::league_2024(),
            TransactionType::Trade,
            2024,
            100,
            &items,
        );
        store
    }

    /// `hops` chained trades: asset-0 for asset-1, asset-1 for asset-2, ...
    pub(crate) fn deep_chain(hops: usize) -> Self {
        let mut store = Self::empty_single_league();
        let league = Self::league_2024();
        for index in 0..=hops {
            let id = format!("asset-{index}");
            store.player(&id, &format!("Depth Player {index}"), "WR");
        }
        for index in 0..hops {
            let given = format!("asset-{index}");
            let received = format!("asset-{}", index + 1);
            store.tx(
                &format!("t{index}"),
                &league,
                TransactionType::Trade,
                2024,
                (index as i64 + 1) * 1_000,
                &[
                    (given.as_str(), "m1", Direction::Drop),
                    (given.as_str(), "m2", Direction::Add),
                    (received.as_str(), "m2", Direction::Drop),
                    (received.as_str(), "m1", Direction::Add),
                ],
            );
        }
        store
    }
}

/// Fixture store whose transaction fetch fails for one league, so tests can
/// exercise the per-season degradation path.
pub(crate) struct OutageStore {
    inner: FixtureStore,
    down: LeagueId,
}

impl OutageStore {
    /// The two-season dynasty with the 2023 league unreachable.
    pub(crate) fn down_2023() -> Self {
        Self {
            inner: FixtureStore::two_season_dynasty(),
            down: FixtureStore::league_2023(),
        }
    }

    pub(crate) fn seasons_oldest_first(&self) -> Vec<LeagueSeason> {
        self.inner.seasons_oldest_first()
    }
}

#[derive(Debug)]
pub(crate) struct OutageError(LeagueId);

impl fmt::Display for OutageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "league {} is unreachable", self.0)
    }
}

impl std::error::Error for OutageError {}

impl LeagueStore for OutageStore {
    type Error = OutageError;

    fn league(&self, id: &LeagueId) -> Result<Option<LeagueSeason>, Self::Error> {
        self.inner.league(id).map_err(|err| match err {})
    }

    fn list_transactions(&self, league_ids: &[LeagueId]) -> Result<Vec<Transaction>, Self::Error> {
        if league_ids.contains(&self.down) {
            return Err(OutageError(self.down.clone()));
        }
        self.inner
            .list_transactions(league_ids)
            .map_err(|err| match err {})
    }

    fn asset(&self, id: &AssetId) -> Result<Option<Asset>, Self::Error> {
        self.inner.asset(id).map_err(|err| match err {})
    }

    fn manager(&self, id: &ManagerId) -> Result<Option<Manager>, Self::Error> {
        self.inner.manager(id).map_err(|err| match err {})
    }

    fn current_roster_holder(&self, asset_id: &AssetId) -> Result<Option<ManagerId>, Self::Error> {
        self.inner
            .current_roster_holder(asset_id)
            .map_err(|err| match err {})
    }
}

fn default_managers() -> BTreeMap<ManagerId, Manager> {
    let mut managers = BTreeMap::new();
    for (id, username) in [("m1", "arrowhead"), ("m2", "bluechip"), ("m3", "capstone")] {
        managers.insert(
            FixtureStore::manager(id),
            Manager {
                id: FixtureStore::manager(id),
                username: username.to_string(),
                display_name: Some(username.to_string()),
            },
        );
    }
    managers
}

impl LeagueStore for FixtureStore {
    type Error = Infallible;

    fn league(&self, id: &LeagueId) -> Result<Option<LeagueSeason>, Self::Error> {
        Ok(self.leagues.iter().find(|league| &league.id == id).cloned())
    }

    fn list_transactions(&self, league_ids: &[LeagueId]) -> Result<Vec<Transaction>, Self::Error> {
        let mut matched: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| league_ids.contains(&tx.league_id))
            .cloned()
            .collect();
        // Same contract as the SQLite store: timestamp order, ingestion
        // order on ties.
        matched.sort_by_key(|tx| tx.timestamp);
        Ok(matched)
    }

    fn asset(&self, id: &AssetId) -> Result<Option<Asset>, Self::Error> {
        Ok(self.assets.get(id).cloned())
    }

    fn manager(&self, id: &ManagerId) -> Result<Option<Manager>, Self::Error> {
        Ok(self.managers.get(id).cloned())
    }

    fn current_roster_holder(&self, asset_id: &AssetId) -> Result<Option<ManagerId>, Self::Error> {
        Ok(self.roster.get(asset_id).cloned())
    }
}
