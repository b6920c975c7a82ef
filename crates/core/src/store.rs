#![forbid(unsafe_code)]

use crate::ids::{AssetId, LeagueId, ManagerId};
use crate::model::{Asset, LeagueSeason, Manager, Transaction};

/// Read-only boundary to the ingestion/persistence collaborator. The engine
/// never writes through this trait and never caches across calls.
pub trait LeagueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn league(&self, id: &LeagueId) -> Result<Option<LeagueSeason>, Self::Error>;

    /// Every transaction persisted for the given league-seasons, with item
    /// joins already resolved, ordered by (timestamp, ingestion order).
    fn list_transactions(&self, league_ids: &[LeagueId]) -> Result<Vec<Transaction>, Self::Error>;

    fn asset(&self, id: &AssetId) -> Result<Option<Asset>, Self::Error>;

    fn manager(&self, id: &ManagerId) -> Result<Option<Manager>, Self::Error>;

    /// Live roster-slot holder, if any. Used only to resolve `on_roster`
    /// status; lineage itself is derived from transactions.
    fn current_roster_holder(&self, asset_id: &AssetId) -> Result<Option<ManagerId>, Self::Error>;
}
