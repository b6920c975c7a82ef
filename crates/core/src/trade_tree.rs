#![forbid(unsafe_code)]

//! Recursive "what came back" resolution: from the transaction in which an
//! asset last changed hands, follow every later trade and branch into the
//! package the trading manager received, down to terminal roster status.

use crate::MAX_TRACE_DEPTH;
use crate::error::EngineError;
use crate::graph::{Graph, TransactionChainLink, build_graph};
use crate::ids::{AssetId, LeagueId, ManagerId, TransactionId};
use crate::model::{Asset, TransactionType};
use crate::seasons::resolve_season_chain;
use crate::store::LeagueStore;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    OnRoster,
    Dropped,
    DraftedAsPlayer,
}

#[derive(Clone, Debug, Serialize)]
pub struct TradePackage {
    pub assets_received: Vec<AssetTradeTree>,
    /// Set when the depth guard cut the package instead of expanding it.
    pub truncated_reason: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AssetTradeTree {
    pub asset: Asset,
    pub origin: Option<TransactionChainLink>,
    pub chronological_history: Vec<TransactionChainLink>,
    pub final_trade: Option<TransactionChainLink>,
    pub current_status: AssetStatus,
    pub current_holder: Option<ManagerId>,
    pub trade_package: Option<TradePackage>,
}

pub fn build_asset_trade_tree<S: LeagueStore>(
    store: &S,
    dynasty_root: &LeagueId,
    asset_id: &AssetId,
    starting_transaction_id: &TransactionId,
) -> Result<AssetTradeTree, EngineError> {
    let seasons = resolve_season_chain(store, dynasty_root)?;
    let graph = build_graph(store, &seasons, Some(asset_id))?;
    resolve_trade_tree(store, &graph, asset_id, starting_transaction_id)
}

pub fn resolve_trade_tree<S: LeagueStore>(
    store: &S,
    graph: &Graph,
    asset_id: &AssetId,
    starting_transaction_id: &TransactionId,
) -> Result<AssetTradeTree, EngineError> {
    if graph.asset(asset_id).is_none() {
        return Err(EngineError::not_found("asset", asset_id.as_str()));
    }
    let Some(starting) = graph.link(starting_transaction_id) else {
        return Err(EngineError::not_found(
            "transaction",
            starting_transaction_id.as_str(),
        ));
    };
    let mut visited = BTreeSet::new();
    tree_for(store, graph, asset_id, starting, &mut visited, 0)
}

fn tree_for<S: LeagueStore>(
    store: &S,
    graph: &Graph,
    asset_id: &AssetId,
    starting: &TransactionChainLink,
    visited: &mut BTreeSet<AssetId>,
    depth: usize,
) -> Result<AssetTradeTree, EngineError> {
    let Some(asset) = graph.asset(asset_id).cloned() else {
        return Err(EngineError::not_found("asset", asset_id.as_str()));
    };

    let history: Vec<TransactionChainLink> =
        graph.links_for(asset_id).into_iter().cloned().collect();
    let origin = history.first().cloned();
    let cursor = (starting.timestamp, starting.ordinal);
    let final_trade = history
        .iter()
        .rfind(|link| {
            link.tx_type == TransactionType::Trade && (link.timestamp, link.ordinal) > cursor
        })
        .cloned();

    let (current_status, current_holder) = resolve_status(store, &asset)?;

    let trade_package = match &final_trade {
        None => None,
        Some(_) if depth >= MAX_TRACE_DEPTH => {
            warn!(asset = %asset_id, depth, "trade-tree depth guard fired");
            Some(TradePackage {
                assets_received: Vec::new(),
                truncated_reason: Some("depth limit reached".to_string()),
            })
        }
        Some(final_link) => {
            Some(expand_package(store, graph, asset_id, final_link, visited, depth)?)
        }
    };

    Ok(AssetTradeTree {
        asset,
        origin,
        chronological_history: history,
        final_trade,
        current_status,
        current_holder,
        trade_package,
    })
}

/// Everything the trading manager got back in the final trade, each branch
/// resolved recursively. The current asset sits in `visited` only while its
/// descendants are expanded: an asset may recur in sibling branches but
/// never in its own ancestor chain.
fn expand_package<S: LeagueStore>(
    store: &S,
    graph: &Graph,
    asset_id: &AssetId,
    final_link: &TransactionChainLink,
    visited: &mut BTreeSet<AssetId>,
    depth: usize,
) -> Result<TradePackage, EngineError> {
    let received: Vec<AssetId> = final_link
        .giver_of(asset_id)
        .and_then(|giver| final_link.sides.iter().find(|side| &side.manager == giver))
        .map(|side| side.assets_received.clone())
        .unwrap_or_default();

    visited.insert(asset_id.clone());
    let mut branches = Vec::new();
    for next in &received {
        if next == asset_id || visited.contains(next) {
            continue;
        }
        branches.push(tree_for(store, graph, next, final_link, visited, depth + 1)?);
    }
    visited.remove(asset_id);

    Ok(TradePackage {
        assets_received: branches,
        truncated_reason: None,
    })
}

fn resolve_status<S: LeagueStore>(
    store: &S,
    asset: &Asset,
) -> Result<(AssetStatus, Option<ManagerId>), EngineError> {
    match asset {
        Asset::DraftPick {
            selected_player: Some(_),
            current_owner,
            ..
        } => Ok((AssetStatus::DraftedAsPlayer, Some(current_owner.clone()))),
        Asset::DraftPick { current_owner, .. } => {
            // An unspent pick is still held under its current owner.
            Ok((AssetStatus::OnRoster, Some(current_owner.clone())))
        }
        Asset::Player { id, .. } => {
            let holder = store.current_roster_holder(id).map_err(EngineError::store)?;
            match holder {
                Some(manager) => Ok((AssetStatus::OnRoster, Some(manager))),
                None => Ok((AssetStatus::Dropped, None)),
            }
        }
    }
}
