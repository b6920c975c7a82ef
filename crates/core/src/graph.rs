#![forbid(unsafe_code)]

use crate::error::EngineError;
use crate::ids::{AssetId, ManagerId, TransactionId};
use crate::model::{Asset, Direction, LeagueSeason, Transaction, TransactionType};
use crate::policy::orient_trade_parties;
use crate::serialize::ts_string;
use crate::store::LeagueStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One manager's half (or third, ...) of a transaction: what they gave and
/// what they received, in persisted item order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManagerSide {
    pub manager: ManagerId,
    pub assets_given: Vec<AssetId>,
    pub assets_received: Vec<AssetId>,
}

/// A transaction enriched for traversal: the flat manager-from/manager-to
/// pair two-party tracing expects, plus the full per-manager grouping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionChainLink {
    pub transaction_id: TransactionId,
    pub tx_type: TransactionType,
    pub season: u16,
    pub week: Option<u8>,
    #[serde(with = "ts_string")]
    pub timestamp: i64,
    pub manager_from: Option<ManagerId>,
    pub manager_to: Option<ManagerId>,
    pub assets_involved: Vec<AssetId>,
    pub sides: Vec<ManagerSide>,
    /// Ingestion ordinal; the stable tie-break for equal timestamps.
    #[serde(skip)]
    pub ordinal: usize,
}

impl TransactionChainLink {
    pub fn involves(&self, asset: &AssetId) -> bool {
        self.assets_involved.contains(asset)
    }

    /// Manager who gained the asset in this transaction.
    pub fn receiver_of(&self, asset: &AssetId) -> Option<&ManagerId> {
        self.sides
            .iter()
            .find(|side| side.assets_received.contains(asset))
            .map(|side| &side.manager)
    }

    /// Manager who lost the asset in this transaction.
    pub fn giver_of(&self, asset: &AssetId) -> Option<&ManagerId> {
        self.sides
            .iter()
            .find(|side| side.assets_given.contains(asset))
            .map(|side| &side.manager)
    }
}

/// Immutable per-trace snapshot of one dynasty's transaction history.
///
/// Three indices: `nodes` (asset id → asset), `edges` (asset id → its
/// transaction ids, chronological), `chains` (transaction id → enriched
/// link). Built fresh for one trace and discarded with the response.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: BTreeMap<AssetId, Asset>,
    edges: BTreeMap<AssetId, Vec<TransactionId>>,
    chains: BTreeMap<TransactionId, TransactionChainLink>,
    seasons: Vec<u16>,
}

impl Graph {
    pub fn asset(&self, id: &AssetId) -> Option<&Asset> {
        self.nodes.get(id)
    }

    pub fn link(&self, id: &TransactionId) -> Option<&TransactionChainLink> {
        self.chains.get(id)
    }

    /// The asset's transactions, oldest first (ties in ingestion order).
    pub fn links_for(&self, asset: &AssetId) -> Vec<&TransactionChainLink> {
        self.edges
            .get(asset)
            .map(|ids| ids.iter().filter_map(|id| self.chains.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.nodes.values()
    }

    pub fn seasons(&self) -> &[u16] {
        &self.seasons
    }

    /// First season of the dynasty; a draft in it is the startup draft.
    pub fn first_season(&self) -> Option<u16> {
        self.seasons.iter().copied().min()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Newest timestamp anywhere in the graph; the deterministic "now" for
    /// open-ended tenure arithmetic.
    pub fn latest_timestamp(&self) -> Option<i64> {
        self.chains.values().map(|link| link.timestamp).max()
    }
}

/// Build the graph for a dynasty's season list, oldest season first.
///
/// A season whose fetch fails degrades to an empty contribution (warned);
/// a transaction with no resolvable item at all is a data-integrity error.
/// With a `focus_asset`, trade orientation is anchored around whichever
/// manager group touches that asset.
pub fn build_graph<S: LeagueStore>(
    store: &S,
    seasons: &[LeagueSeason],
    focus_asset: Option<&AssetId>,
) -> Result<Graph, EngineError> {
    let mut graph = Graph {
        seasons: seasons.iter().map(|season| season.season).collect(),
        ..Graph::default()
    };
    let mut ordinal = 0usize;

    for season in seasons {
        let transactions = match store.list_transactions(std::slice::from_ref(&season.id)) {
            Ok(transactions) => transactions,
            Err(err) => {
                warn!(
                    league = %season.id,
                    season = season.season,
                    error = %err,
                    "season fetch failed; contributing nothing for it"
                );
                continue;
            }
        };

        for transaction in transactions {
            register_transaction(store, &mut graph, &transaction, focus_asset, ordinal)?;
            ordinal += 1;
        }
    }

    // Edge lists are appended in season order; one stable sort pins the
    // chronological invariant even when timestamps interleave across seasons.
    let chains = &graph.chains;
    for ids in graph.edges.values_mut() {
        ids.sort_by_key(|id| {
            chains
                .get(id)
                .map(|link| (link.timestamp, link.ordinal))
                .unwrap_or((i64::MAX, usize::MAX))
        });
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        chains = graph.chain_count(),
        "graph built"
    );
    Ok(graph)
}

fn register_transaction<S: LeagueStore>(
    store: &S,
    graph: &mut Graph,
    transaction: &Transaction,
    focus_asset: Option<&AssetId>,
    ordinal: usize,
) -> Result<(), EngineError> {
    let mut sides: Vec<ManagerSide> = Vec::new();
    let mut involved: Vec<AssetId> = Vec::new();
    let mut resolved = 0usize;

    for item in &transaction.items {
        let Some(asset) = store.asset(&item.asset_id).map_err(EngineError::store)? else {
            warn!(
                transaction = %transaction.id,
                asset = %item.asset_id,
                "transaction item resolves to no asset; skipping item"
            );
            continue;
        };
        resolved += 1;

        // Later seasons carry the freshest asset record (a pick gains its
        // selected player only once the draft happens), so last write wins.
        graph.nodes.insert(item.asset_id.clone(), asset);
        if !involved.contains(&item.asset_id) {
            involved.push(item.asset_id.clone());
        }

        let slot = match sides.iter().position(|s| s.manager == item.manager_id) {
            Some(index) => index,
            None => {
                sides.push(ManagerSide {
                    manager: item.manager_id.clone(),
                    assets_given: Vec::new(),
                    assets_received: Vec::new(),
                });
                sides.len() - 1
            }
        };
        match item.direction {
            Direction::Add => sides[slot].assets_received.push(item.asset_id.clone()),
            Direction::Drop => sides[slot].assets_given.push(item.asset_id.clone()),
        }
    }

    if resolved == 0 {
        return Err(EngineError::DataIntegrity(format!(
            "transaction {} has no resolvable items",
            transaction.id
        )));
    }

    let (manager_from, manager_to) = match transaction.tx_type {
        TransactionType::Trade => orient_trade_parties(&sides, focus_asset),
        _ => {
            let to = sides
                .iter()
                .find(|side| !side.assets_received.is_empty())
                .map(|side| side.manager.clone());
            let from = sides
                .iter()
                .find(|side| !side.assets_given.is_empty())
                .map(|side| side.manager.clone());
            (from, to)
        }
    };

    for asset_id in &involved {
        graph
            .edges
            .entry(asset_id.clone())
            .or_default()
            .push(transaction.id.clone());
    }

    graph.chains.insert(
        transaction.id.clone(),
        TransactionChainLink {
            transaction_id: transaction.id.clone(),
            tx_type: transaction.tx_type,
            season: transaction.season,
            week: transaction.week,
            timestamp: transaction.timestamp,
            manager_from,
            manager_to,
            assets_involved: involved,
            sides,
            ordinal,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testfix::{FixtureStore, OutageStore};

    #[test]
    fn build_is_idempotent() {
        let store = FixtureStore::two_season_dynasty();
        let seasons = store.seasons_oldest_first();
        let first = build_graph(&store, &seasons, None).unwrap();
        let second = build_graph(&store, &seasons, None).unwrap();
        assert_eq!(first.node_count(), second.node_count());
        assert_eq!(first.edge_count(), second.edge_count());
        assert_eq!(first.chain_count(), second.chain_count());
    }

    #[test]
    fn edges_are_chronological_with_stable_ties() {
        let store = FixtureStore::tied_timestamps();
        let seasons = store.seasons_oldest_first();
        let graph = build_graph(&store, &seasons, None).unwrap();
        let links = graph.links_for(&FixtureStore::asset("player-x"));
        let mut last = (i64::MIN, 0usize);
        for link in &links {
            assert!((link.timestamp, link.ordinal) >= last);
            last = (link.timestamp, link.ordinal);
        }
        // Equal timestamps keep ingestion order.
        assert_eq!(links[0].transaction_id.as_str(), "t1");
        assert_eq!(links[1].transaction_id.as_str(), "t2");
    }

    #[test]
    fn unresolvable_transaction_is_data_integrity() {
        let store = FixtureStore::with_phantom_items();
        let seasons = store.seasons_oldest_first();
        let err = build_graph(&store, &seasons, None).unwrap_err();
        assert!(matches!(err, EngineError::DataIntegrity(_)));
    }

    #[test]
    fn failed_season_fetch_degrades_to_empty() {
        let store = OutageStore::down_2023();
        let seasons = store.seasons_oldest_first();
        let graph = build_graph(&store, &seasons, None).unwrap();

        // The 2023 startup draft is gone; every 2024 transaction survives.
        assert!(graph.link(&FixtureStore::transaction("t1")).is_none());
        assert!(graph.link(&FixtureStore::transaction("t2")).is_some());
        assert!(graph.link(&FixtureStore::transaction("t3")).is_some());
        assert!(graph.link(&FixtureStore::transaction("t4")).is_some());
        // Both seasons stay in the chain even though one contributed nothing.
        assert_eq!(graph.seasons(), &[2023, 2024]);
    }

    #[test]
    fn multi_season_stitching_unifies_the_graph() {
        let store = FixtureStore::two_season_dynasty();
        let seasons = store.seasons_oldest_first();
        let graph = build_graph(&store, &seasons, None).unwrap();
        // Player X appears in both seasons; one node, both transactions.
        let links = graph.links_for(&FixtureStore::asset("player-x"));
        let seasons_spanned: std::collections::BTreeSet<u16> =
            links.iter().map(|link| link.season).collect();
        assert_eq!(seasons_spanned.len(), 2);
    }

    #[test]
    fn focus_asset_orients_multi_party_trade() {
        let store = FixtureStore::three_party_trade();
        let seasons = store.seasons_oldest_first();
        let focus = FixtureStore::asset("player-c");
        let graph = build_graph(&store, &seasons, Some(&focus)).unwrap();
        let link = graph.links_for(&focus)[0];
        assert_eq!(link.manager_from.as_ref().unwrap().as_str(), "m3");
        assert_eq!(link.manager_to.as_ref().unwrap().as_str(), "m1");
        assert_eq!(link.sides.len(), 3);
    }
}
