#![forbid(unsafe_code)]

use crate::MAX_SEASON_CHAIN;
use crate::error::EngineError;
use crate::ids::LeagueId;
use crate::model::LeagueSeason;
use crate::store::LeagueStore;
use std::collections::BTreeSet;
use tracing::warn;

/// Walk `previous_league_id` pointers backward from `league_id` and return
/// the dynasty's league-seasons oldest first.
///
/// A cyclic or self-referential pointer terminates the walk where the loop
/// closes (warned, not an error); the chain built so far is still returned.
/// An unknown starting league is a not-found error; an unknown league in the
/// middle of the chain just ends the walk, since older history being absent
/// from the store is a normal partial-ingest state.
pub fn resolve_season_chain<S: LeagueStore>(
    store: &S,
    league_id: &LeagueId,
) -> Result<Vec<LeagueSeason>, EngineError> {
    let Some(start) = store.league(league_id).map_err(EngineError::store)? else {
        return Err(EngineError::not_found("league", league_id.as_str()));
    };

    let mut seen = BTreeSet::new();
    seen.insert(start.id.clone());

    let mut chain = vec![start];
    while let Some(prev_id) = chain
        .last()
        .and_then(|season| season.previous_league_id.clone())
    {
        if !seen.insert(prev_id.clone()) {
            warn!(league = %prev_id, "previous-league pointer loop; stopping season walk");
            break;
        }
        if chain.len() >= MAX_SEASON_CHAIN {
            warn!(
                league = %prev_id,
                limit = MAX_SEASON_CHAIN,
                "season chain exceeds limit; stopping season walk"
            );
            break;
        }
        match store.league(&prev_id).map_err(EngineError::store)? {
            Some(season) => chain.push(season),
            None => break,
        }
    }

    chain.reverse();
    Ok(chain)
}
