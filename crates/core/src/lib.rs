#![forbid(unsafe_code)]

pub mod error;
pub mod graph;
pub mod ids;
pub mod lineage;
pub mod model;
pub mod network;
pub mod policy;
pub mod seasons;
pub mod serialize;
pub mod store;
pub mod summary;
pub mod trade_tree;

#[cfg(test)]
pub(crate) mod testfix;

pub use error::EngineError;
pub use graph::{Graph, ManagerSide, TransactionChainLink, build_graph};
pub use lineage::{
    CompleteTransactionLineage, TransactionChain, build_complete_transaction_lineage,
    build_transaction_chain,
};
pub use network::{NetworkFilters, PlayerNetworkResponse, build_player_network};
pub use seasons::resolve_season_chain;
pub use store::LeagueStore;
pub use summary::{build_roster_acquisition_summaries, roster_acquisition_summaries};
pub use trade_tree::{AssetTradeTree, build_asset_trade_tree};

/// Hard ceiling on recursive trace depth. Entering a branch deeper than this
/// terminates the branch with an empty result, never an error.
pub const MAX_TRACE_DEPTH: usize = 10;

/// Hard ceiling on distinct assets one trace may visit.
pub const MAX_VISITED_ASSETS: usize = 500;

/// Hard ceiling on the previous-league walk; dynasties longer than this are
/// not a thing, so hitting it means a pointer loop in the data.
pub const MAX_SEASON_CHAIN: usize = 50;
