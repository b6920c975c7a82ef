#![forbid(unsafe_code)]

//! Roster-wide acquisition summaries: for every asset a manager currently
//! holds (derived from the graph, not the roster table), how it was
//! acquired and how long it has been held.

use crate::error::EngineError;
use crate::graph::{Graph, TransactionChainLink, build_graph};
use crate::ids::{LeagueId, ManagerId};
use crate::lineage::{OriginType, classify_origin};
use crate::model::Asset;
use crate::seasons::resolve_season_chain;
use crate::serialize::{ms_to_date, opt_ts_string};
use crate::store::LeagueStore;
use serde::Serialize;

/// Worker cap for roster-wide fan-out. Each summary is pure and read-only
/// against the shared graph, so this is throughput bounding, not locking.
const MAX_SUMMARY_WORKERS: usize = 4;

const DAY_MS: i64 = 86_400_000;

#[derive(Clone, Debug, Serialize)]
pub struct AcquisitionSummary {
    pub asset: Asset,
    pub origin_type: OriginType,
    pub acquired_via: Option<TransactionChainLink>,
    #[serde(with = "opt_ts_string")]
    pub acquired_ms: Option<i64>,
    pub acquired_date: Option<String>,
    pub days_held: i64,
}

pub fn build_roster_acquisition_summaries<S: LeagueStore>(
    store: &S,
    dynasty_root: &LeagueId,
    manager_id: &ManagerId,
) -> Result<Vec<AcquisitionSummary>, EngineError> {
    if store.manager(manager_id).map_err(EngineError::store)?.is_none() {
        return Err(EngineError::not_found("manager", manager_id.as_str()));
    }
    let seasons = resolve_season_chain(store, dynasty_root)?;
    let graph = build_graph(store, &seasons, None)?;
    Ok(roster_acquisition_summaries(&graph, manager_id))
}

/// Summaries for every asset currently held by the manager, asset-id order.
pub fn roster_acquisition_summaries(
    graph: &Graph,
    manager_id: &ManagerId,
) -> Vec<AcquisitionSummary> {
    let held: Vec<&Asset> = graph
        .assets()
        .filter(|asset| current_holder(graph, asset).as_ref() == Some(manager_id))
        .collect();
    if held.is_empty() {
        return Vec::new();
    }

    let workers = MAX_SUMMARY_WORKERS.min(held.len());
    let chunk_size = held.len().div_ceil(workers);
    let mut summaries = Vec::with_capacity(held.len());
    std::thread::scope(|scope| {
        let handles: Vec<_> = held
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|asset| summarize(graph, asset, manager_id))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            if let Ok(mut chunk) = handle.join() {
                summaries.append(&mut chunk);
            }
        }
    });
    summaries
}

fn current_holder(graph: &Graph, asset: &Asset) -> Option<ManagerId> {
    let mut holder: Option<ManagerId> = None;
    for link in graph.links_for(asset.id()) {
        if let Some(receiver) = link.receiver_of(asset.id()) {
            holder = Some(receiver.clone());
        } else if link.giver_of(asset.id()).is_some() {
            holder = None;
        }
    }
    holder
}

fn summarize(graph: &Graph, asset: &Asset, manager_id: &ManagerId) -> AcquisitionSummary {
    let links = graph.links_for(asset.id());
    let origin_type = links
        .first()
        .map(|link| classify_origin(link, graph.first_season()).origin_type)
        .unwrap_or(OriginType::Unknown);

    // The start of the manager's current tenure: the last transaction in
    // which the asset became theirs while previously held elsewhere.
    let mut acquired_via: Option<TransactionChainLink> = None;
    let mut previous: Option<ManagerId> = None;
    for link in &links {
        let receiver = link.receiver_of(asset.id()).cloned();
        if receiver.as_ref() == Some(manager_id) && previous.as_ref() != Some(manager_id) {
            acquired_via = Some((*link).clone());
        }
        if let Some(receiver) = receiver {
            previous = Some(receiver);
        } else if link.giver_of(asset.id()).is_some() {
            previous = None;
        }
    }

    let acquired_ms = acquired_via.as_ref().map(|link| link.timestamp);
    let horizon = graph.latest_timestamp().unwrap_or(0);
    AcquisitionSummary {
        asset: asset.clone(),
        origin_type,
        acquired_date: acquired_ms.map(ms_to_date),
        days_held: acquired_ms
            .map(|start| (horizon - start).max(0) / DAY_MS)
            .unwrap_or(0),
        acquired_ms,
        acquired_via,
    }
}
