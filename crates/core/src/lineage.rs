#![forbid(unsafe_code)]

//! Forward chain tracing and bidirectional point-in-time lineage.
//!
//! Every traversal threads an explicit [`TraceContext`] through recursion; a
//! guard firing terminates one branch with an empty result, never an error.

use crate::error::EngineError;
use crate::graph::{Graph, TransactionChainLink, build_graph};
use crate::ids::{AssetId, LeagueId, ManagerId, TransactionId};
use crate::model::{Asset, Direction, Manager, TransactionType};
use crate::policy::backward_substitute;
use crate::seasons::resolve_season_chain;
use crate::serialize::{ms_to_date, opt_ts_string, ts_string};
use crate::store::LeagueStore;
use crate::{MAX_TRACE_DEPTH, MAX_VISITED_ASSETS};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Shared traversal state for one trace. Passed through recursion so the
/// tracer stays reentrant; independent top-level calls never share one.
#[derive(Debug, Default)]
pub struct TraceContext {
    visited_assets: BTreeSet<AssetId>,
    visited_transactions: BTreeSet<TransactionId>,
    depth: usize,
}

impl TraceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the asset may be entered; false terminates the branch.
    fn enter_asset(&mut self, asset: &AssetId) -> bool {
        if self.depth > MAX_TRACE_DEPTH {
            warn!(asset = %asset, depth = self.depth, "trace depth guard fired");
            return false;
        }
        if self.visited_assets.len() >= MAX_VISITED_ASSETS {
            warn!(asset = %asset, "visited-asset guard fired");
            return false;
        }
        if !self.visited_assets.insert(asset.clone()) {
            return false;
        }
        true
    }

    fn enter_transaction(&mut self, transaction: &TransactionId) -> bool {
        self.visited_transactions.insert(transaction.clone())
    }
}

/// Flattened forward history of one asset plus the chains of everything it
/// was exchanged for, recursively.
#[derive(Clone, Debug, Serialize)]
pub struct TransactionChain {
    pub asset: Asset,
    pub transaction_path: Vec<TransactionChainLink>,
    pub original_owner: Option<ManagerId>,
    pub current_owner: Option<ManagerId>,
    pub seasons_spanned: usize,
    pub derived_assets: Vec<TransactionChain>,
    /// True when a guard (cycle, depth, visited-set size) cut this branch.
    pub truncated: bool,
}

impl TransactionChain {
    fn empty(asset: Asset) -> Self {
        Self {
            asset,
            transaction_path: Vec::new(),
            original_owner: None,
            current_owner: None,
            seasons_spanned: 0,
            derived_assets: Vec::new(),
            truncated: true,
        }
    }
}

/// Resolve the dynasty, build its graph and trace one asset's full chain.
pub fn build_transaction_chain<S: LeagueStore>(
    store: &S,
    dynasty_root: &LeagueId,
    asset_id: &AssetId,
) -> Result<TransactionChain, EngineError> {
    let seasons = resolve_season_chain(store, dynasty_root)?;
    let graph = build_graph(store, &seasons, Some(asset_id))?;
    trace_chain(&graph, asset_id)
}

/// Trace one asset's chain over an already-built graph.
pub fn trace_chain(graph: &Graph, asset_id: &AssetId) -> Result<TransactionChain, EngineError> {
    if graph.asset(asset_id).is_none() {
        return Err(EngineError::not_found("asset", asset_id.as_str()));
    }
    let mut ctx = TraceContext::new();
    Ok(chain_with_ctx(graph, asset_id, &mut ctx))
}

fn chain_with_ctx(graph: &Graph, asset_id: &AssetId, ctx: &mut TraceContext) -> TransactionChain {
    // Recursion only reaches assets registered in the graph.
    let Some(asset) = graph.asset(asset_id).cloned() else {
        return TransactionChain::empty(Asset::Player {
            id: asset_id.clone(),
            name: String::new(),
            position: None,
            team: None,
        });
    };
    if !ctx.enter_asset(asset_id) {
        return TransactionChain::empty(asset);
    }

    let links = graph.links_for(asset_id);
    let mut original_owner: Option<ManagerId> = None;
    let mut current_owner: Option<ManagerId> = None;
    let mut seasons = BTreeSet::new();
    let mut derived = Vec::new();

    for link in &links {
        ctx.enter_transaction(&link.transaction_id);
        seasons.insert(link.season);

        if original_owner.is_none() {
            // First holder on record: whoever is seen giving it away held it
            // first; failing that, whoever first received it.
            original_owner = link
                .giver_of(asset_id)
                .or_else(|| link.receiver_of(asset_id))
                .cloned();
        }
        if let Some(receiver) = link.receiver_of(asset_id) {
            current_owner = Some(receiver.clone());
        }

        if link.tx_type != TransactionType::Trade {
            continue;
        }
        // Everything the giving manager got back in this trade starts a
        // derived chain: the pick that became a pick that became a player.
        let Some(giver) = link.giver_of(asset_id) else {
            continue;
        };
        let Some(side) = link.sides.iter().find(|side| &side.manager == giver) else {
            continue;
        };
        for received in &side.assets_received {
            if received == asset_id {
                continue;
            }
            // A re-encountered asset comes back from the guard as an empty
            // chain with `truncated` set, so callers can tell the branch was
            // cut rather than absent.
            ctx.depth += 1;
            let child = chain_with_ctx(graph, received, ctx);
            ctx.depth -= 1;
            derived.push(child);
        }
    }

    TransactionChain {
        asset,
        transaction_path: links.into_iter().cloned().collect(),
        original_owner,
        current_owner,
        seasons_spanned: seasons.len(),
        derived_assets: derived,
        truncated: false,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginType {
    StartupDraft,
    RookieDraft,
    Waiver,
    FreeAgent,
    Commissioner,
    Unknown,
}

#[derive(Clone, Debug, Serialize)]
pub struct OriginPoint {
    pub origin_type: OriginType,
    pub transaction_id: Option<TransactionId>,
    pub season: Option<u16>,
    #[serde(with = "opt_ts_string")]
    pub timestamp: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalState {
    ActiveRoster,
    Traded,
    Dropped,
    DraftPickUsed,
}

/// One manager's contiguous hold of an asset.
#[derive(Clone, Debug, Serialize)]
pub struct Tenure {
    pub manager: ManagerId,
    #[serde(with = "ts_string")]
    pub start_ms: i64,
    #[serde(with = "opt_ts_string")]
    pub end_ms: Option<i64>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub days_held: i64,
}

/// Lineage of one asset item of the target transaction.
#[derive(Clone, Debug, Serialize)]
pub struct AssetLineage {
    pub asset: Asset,
    /// Whether the reference manager gained or lost it in the target.
    pub direction: Direction,
    /// Origin-first path of transactions behind the target.
    pub backward_path: Vec<TransactionChainLink>,
    pub origin: OriginPoint,
    /// Transactions after the target, oldest first.
    pub forward_path: Vec<TransactionChainLink>,
    pub final_state: FinalState,
    pub timeline: Vec<Tenure>,
}

/// Full backward-to-origin, forward-to-present justification of one
/// transaction from one manager's side.
#[derive(Clone, Debug, Serialize)]
pub struct CompleteTransactionLineage {
    pub transaction: TransactionChainLink,
    pub manager: Manager,
    pub assets: Vec<AssetLineage>,
}

pub fn build_complete_transaction_lineage<S: LeagueStore>(
    store: &S,
    dynasty_root: &LeagueId,
    transaction_id: &TransactionId,
    manager_id: &ManagerId,
) -> Result<CompleteTransactionLineage, EngineError> {
    let seasons = resolve_season_chain(store, dynasty_root)?;
    let graph = build_graph(store, &seasons, None)?;
    trace_complete_lineage(store, &graph, transaction_id, manager_id)
}

pub fn trace_complete_lineage<S: LeagueStore>(
    store: &S,
    graph: &Graph,
    transaction_id: &TransactionId,
    manager_id: &ManagerId,
) -> Result<CompleteTransactionLineage, EngineError> {
    let Some(target) = graph.link(transaction_id) else {
        return Err(EngineError::not_found("transaction", transaction_id.as_str()));
    };
    let Some(manager) = store.manager(manager_id).map_err(EngineError::store)? else {
        return Err(EngineError::not_found("manager", manager_id.as_str()));
    };

    let mut assets = Vec::new();
    for asset_id in &target.assets_involved {
        let direction = if target.receiver_of(asset_id) == Some(manager_id) {
            Direction::Add
        } else if target.giver_of(asset_id) == Some(manager_id) {
            Direction::Drop
        } else {
            // The item moved between other parties of this transaction; it
            // is not part of this manager's side of the story.
            continue;
        };
        let Some(asset) = graph.asset(asset_id).cloned() else {
            continue;
        };

        let mut ctx = TraceContext::new();
        ctx.enter_transaction(&target.transaction_id);
        let (backward_path, origin) = trace_backward(graph, target, asset_id, &mut ctx);
        let (forward_path, final_state) = trace_forward(graph, target, asset_id, manager_id);
        let timeline = build_timeline(&backward_path, target, &forward_path);

        assets.push(AssetLineage {
            asset,
            direction,
            backward_path,
            origin,
            forward_path,
            final_state,
            timeline,
        });
    }

    Ok(CompleteTransactionLineage {
        transaction: target.clone(),
        manager,
        assets,
    })
}

/// Walk backward from the anchor to the earliest transaction with no further
/// predecessor. Crossing a trade substitutes the asset with what the
/// acquiring manager gave in exchange (`backward_substitute`). Returns the
/// path origin-first.
fn trace_backward(
    graph: &Graph,
    anchor: &TransactionChainLink,
    asset_id: &AssetId,
    ctx: &mut TraceContext,
) -> (Vec<TransactionChainLink>, OriginPoint) {
    let mut path: Vec<TransactionChainLink> = Vec::new();
    let mut current_asset = asset_id.clone();
    let mut cursor = (anchor.timestamp, anchor.ordinal);
    let mut origin: Option<OriginPoint> = None;

    for _ in 0..=MAX_TRACE_DEPTH {
        let prev = graph
            .links_for(&current_asset)
            .into_iter()
            .filter(|link| (link.timestamp, link.ordinal) < cursor)
            .next_back()
            .cloned();
        let Some(prev) = prev else {
            break;
        };
        if !ctx.enter_transaction(&prev.transaction_id) {
            warn!(transaction = %prev.transaction_id, "backward trace cycle; stopping");
            break;
        }

        cursor = (prev.timestamp, prev.ordinal);
        match prev.tx_type {
            TransactionType::Trade => {
                let substituted = prev
                    .receiver_of(&current_asset)
                    .cloned()
                    .and_then(|receiver| backward_substitute(&prev.sides, &receiver));
                path.push(prev);
                match substituted {
                    Some(next) => current_asset = next,
                    None => break,
                }
            }
            _ => {
                origin = Some(classify_origin(&prev, graph.first_season()));
                path.push(prev);
                break;
            }
        }
    }

    let origin = origin.unwrap_or_else(|| {
        // No non-trade predecessor found: the anchor itself may be the
        // asset's origin, otherwise the history runs out mid-trade.
        if path.is_empty() && anchor.tx_type != TransactionType::Trade {
            classify_origin(anchor, graph.first_season())
        } else {
            OriginPoint {
                origin_type: OriginType::Unknown,
                transaction_id: path.last().map(|link| link.transaction_id.clone()),
                season: path.last().map(|link| link.season),
                timestamp: path.last().map(|link| link.timestamp),
            }
        }
    });

    path.reverse();
    (path, origin)
}

pub(crate) fn classify_origin(link: &TransactionChainLink, first_season: Option<u16>) -> OriginPoint {
    let origin_type = match link.tx_type {
        TransactionType::Draft => {
            if first_season == Some(link.season) {
                OriginType::StartupDraft
            } else {
                OriginType::RookieDraft
            }
        }
        TransactionType::Waiver => OriginType::Waiver,
        TransactionType::FreeAgent => OriginType::FreeAgent,
        TransactionType::Commissioner => OriginType::Commissioner,
        TransactionType::Trade => OriginType::Unknown,
    };
    OriginPoint {
        origin_type,
        transaction_id: Some(link.transaction_id.clone()),
        season: Some(link.season),
        timestamp: Some(link.timestamp),
    }
}

/// Walk forward from the anchor to the most recent subsequent transaction
/// and classify where the asset ended up relative to the manager.
fn trace_forward(
    graph: &Graph,
    anchor: &TransactionChainLink,
    asset_id: &AssetId,
    manager_id: &ManagerId,
) -> (Vec<TransactionChainLink>, FinalState) {
    let cursor = (anchor.timestamp, anchor.ordinal);
    let path: Vec<TransactionChainLink> = graph
        .links_for(asset_id)
        .into_iter()
        .filter(|link| (link.timestamp, link.ordinal) > cursor)
        .cloned()
        .collect();

    // A consumed pick ends the story regardless of later bookkeeping.
    if let Some(Asset::DraftPick {
        selected_player: Some(_),
        ..
    }) = graph.asset(asset_id)
    {
        return (path, FinalState::DraftPickUsed);
    }

    let mut holder = anchor.receiver_of(asset_id).cloned();
    let mut left_via: Option<TransactionType> = None;
    for link in &path {
        if let Some(receiver) = link.receiver_of(asset_id) {
            holder = Some(receiver.clone());
        } else if link.giver_of(asset_id).is_some() {
            holder = None;
        }
        if link.giver_of(asset_id) == Some(manager_id) {
            left_via = Some(link.tx_type);
        }
    }

    let final_state = if holder.as_ref() == Some(manager_id) {
        FinalState::ActiveRoster
    } else {
        match left_via {
            Some(TransactionType::Trade) => FinalState::Traded,
            Some(_) => FinalState::Dropped,
            // Never seen leaving this manager: either still theirs as of the
            // anchor, or it was the side they gave away in the anchor.
            None => {
                if anchor.giver_of(asset_id) == Some(manager_id)
                    && anchor.tx_type == TransactionType::Trade
                {
                    FinalState::Traded
                } else if holder.is_some() {
                    FinalState::Traded
                } else {
                    FinalState::Dropped
                }
            }
        }
    };
    (path, final_state)
}

/// One tenure per contiguous hold, closed whenever `manager_to` changes.
/// The last tenure stays open; its `days_held` runs to the newest timestamp
/// in the walked list so the output stays a pure function of the graph.
fn build_timeline(
    backward: &[TransactionChainLink],
    target: &TransactionChainLink,
    forward: &[TransactionChainLink],
) -> Vec<Tenure> {
    const DAY_MS: i64 = 86_400_000;

    let ordered: Vec<&TransactionChainLink> = backward
        .iter()
        .chain(std::iter::once(target))
        .chain(forward.iter())
        .collect();
    let horizon = ordered.last().map(|link| link.timestamp).unwrap_or(0);

    let mut tenures: Vec<Tenure> = Vec::new();
    for link in ordered {
        let Some(to) = link.manager_to.clone() else {
            continue;
        };
        if let Some(open) = tenures.last_mut() {
            if open.manager == to {
                continue;
            }
            open.end_ms = Some(link.timestamp);
            open.end_date = Some(ms_to_date(link.timestamp));
            open.days_held = (link.timestamp - open.start_ms).max(0) / DAY_MS;
        }
        tenures.push(Tenure {
            manager: to,
            start_ms: link.timestamp,
            end_ms: None,
            start_date: ms_to_date(link.timestamp),
            end_date: None,
            days_held: (horizon - link.timestamp).max(0) / DAY_MS,
        });
    }
    tenures
}
