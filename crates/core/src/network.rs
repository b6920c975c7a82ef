#![forbid(unsafe_code)]

//! Breadth-first ego-network expansion: asset → transaction → co-involved
//! assets → their transactions, out to a bounded number of hops.

use crate::error::EngineError;
use crate::graph::{Graph, build_graph};
use crate::ids::{AssetId, LeagueId, TransactionId};
use crate::model::{Asset, TransactionType};
use crate::seasons::resolve_season_chain;
use crate::store::LeagueStore;
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};

pub const DEFAULT_NETWORK_DEPTH: usize = 2;

/// Draft picks carry less visual weight than players in the ego-network.
const PICK_IMPORTANCE_DISCOUNT: f64 = 0.8;

#[derive(Clone, Debug, Default)]
pub struct NetworkFilters {
    /// Allow-list of transaction types to expand through; empty means all.
    pub transaction_types: Vec<TransactionType>,
    /// Whether draft picks appear as nodes at all.
    pub include_draft_picks: bool,
}

impl NetworkFilters {
    pub fn all() -> Self {
        Self {
            transaction_types: Vec::new(),
            include_draft_picks: true,
        }
    }

    fn admits_type(&self, tx_type: TransactionType) -> bool {
        self.transaction_types.is_empty() || self.transaction_types.contains(&tx_type)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct NetworkNode {
    pub asset: Asset,
    pub depth: usize,
    pub importance: f64,
}

/// One directed discovery step: `from_asset` led to `to_asset` through
/// `transaction_id` at `depth` hops from the focal asset.
#[derive(Clone, Debug, Serialize)]
pub struct NetworkConnection {
    pub from_asset: AssetId,
    pub to_asset: AssetId,
    pub transaction_id: TransactionId,
    pub depth: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerNetworkResponse {
    pub focus_asset: AssetId,
    pub degrees: usize,
    pub nodes: Vec<NetworkNode>,
    pub connections: Vec<NetworkConnection>,
    pub node_count: usize,
    pub connection_count: usize,
}

pub fn build_player_network<S: LeagueStore>(
    store: &S,
    dynasty_root: &LeagueId,
    focus_asset: &AssetId,
    depth: usize,
    filters: &NetworkFilters,
) -> Result<PlayerNetworkResponse, EngineError> {
    let seasons = resolve_season_chain(store, dynasty_root)?;
    let graph = build_graph(store, &seasons, Some(focus_asset))?;
    explore_network(&graph, focus_asset, depth, filters)
}

/// Depth-limited BFS over an already-built graph.
pub fn explore_network(
    graph: &Graph,
    focus_asset: &AssetId,
    depth: usize,
    filters: &NetworkFilters,
) -> Result<PlayerNetworkResponse, EngineError> {
    let Some(focus) = graph.asset(focus_asset) else {
        return Err(EngineError::not_found("asset", focus_asset.as_str()));
    };

    let mut nodes = vec![NetworkNode {
        asset: focus.clone(),
        depth: 0,
        importance: importance_of(focus, 0),
    }];
    let mut connections: Vec<NetworkConnection> = Vec::new();
    let mut visited: BTreeSet<AssetId> = BTreeSet::new();
    visited.insert(focus_asset.clone());

    let mut queue: VecDeque<(AssetId, usize)> = VecDeque::new();
    queue.push_back((focus_asset.clone(), 0));

    while let Some((current, current_depth)) = queue.pop_front() {
        if current_depth >= depth {
            continue;
        }
        for link in graph.links_for(&current) {
            if !filters.admits_type(link.tx_type) {
                continue;
            }
            for neighbor in &link.assets_involved {
                if neighbor == &current || visited.contains(neighbor) {
                    continue;
                }
                let Some(asset) = graph.asset(neighbor) else {
                    continue;
                };
                if asset.is_draft_pick() && !filters.include_draft_picks {
                    continue;
                }
                let neighbor_depth = current_depth + 1;
                visited.insert(neighbor.clone());
                nodes.push(NetworkNode {
                    asset: asset.clone(),
                    depth: neighbor_depth,
                    importance: importance_of(asset, neighbor_depth),
                });
                connections.push(NetworkConnection {
                    from_asset: current.clone(),
                    to_asset: neighbor.clone(),
                    transaction_id: link.transaction_id.clone(),
                    depth: neighbor_depth,
                });
                queue.push_back((neighbor.clone(), neighbor_depth));
            }
        }
    }

    let degrees = nodes.iter().map(|node| node.depth).max().unwrap_or(0);
    Ok(PlayerNetworkResponse {
        focus_asset: focus_asset.clone(),
        degrees,
        node_count: nodes.len(),
        connection_count: connections.len(),
        nodes,
        connections,
    })
}

/// Linear decay by hop, floored so distant nodes stay visible; draft picks
/// are discounted 20% relative to players.
fn importance_of(asset: &Asset, depth: usize) -> f64 {
    let base = (1.0 - 0.3 * depth as f64).max(0.1);
    if asset.is_draft_pick() {
        base * PICK_IMPORTANCE_DISCOUNT
    } else {
        base
    }
}
