#![forbid(unsafe_code)]

use crate::ids::{AssetId, LeagueId, ManagerId, TransactionId};
use serde::{Deserialize, Serialize};

/// One tracked asset. A draft pick keeps its identity (season, round,
/// original owner) while ownership changes hands; once a player is selected
/// with it the pick is consumed and `selected_player` points at the result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Asset {
    Player {
        id: AssetId,
        name: String,
        position: Option<String>,
        team: Option<String>,
    },
    DraftPick {
        id: AssetId,
        season: u16,
        round: u8,
        original_owner: ManagerId,
        current_owner: ManagerId,
        previous_owner: Option<ManagerId>,
        pick_number: Option<u16>,
        selected_player: Option<AssetId>,
    },
}

impl Asset {
    pub fn id(&self) -> &AssetId {
        match self {
            Asset::Player { id, .. } => id,
            Asset::DraftPick { id, .. } => id,
        }
    }

    pub fn is_draft_pick(&self) -> bool {
        matches!(self, Asset::DraftPick { .. })
    }

    /// Display label: player name, or "2025 round 2 (via manager)" for picks.
    pub fn label(&self) -> String {
        match self {
            Asset::Player { name, .. } => name.clone(),
            Asset::DraftPick {
                season,
                round,
                original_owner,
                ..
            } => format!("{season} round {round} (via {original_owner})"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Trade,
    Draft,
    Waiver,
    FreeAgent,
    Commissioner,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trade => "trade",
            Self::Draft => "draft",
            Self::Waiver => "waiver",
            Self::FreeAgent => "free_agent",
            Self::Commissioner => "commissioner",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "trade" => Some(Self::Trade),
            "draft" => Some(Self::Draft),
            "waiver" => Some(Self::Waiver),
            "free_agent" => Some(Self::FreeAgent),
            "commissioner" => Some(Self::Commissioner),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Add,
    Drop,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Drop => "drop",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "add" => Some(Self::Add),
            "drop" => Some(Self::Drop),
            _ => None,
        }
    }
}

/// One (asset, manager, direction) triple inside a transaction. Items arrive
/// in persisted order; that order is load-bearing for tie-breaking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub asset_id: AssetId,
    pub manager_id: ManagerId,
    pub direction: Direction,
}

/// One atomic event. Timestamps are ordering-only; equal timestamps are legal
/// and must never panic anything downstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub league_id: LeagueId,
    pub tx_type: TransactionType,
    pub season: u16,
    pub week: Option<u8>,
    pub timestamp: i64,
    pub items: Vec<TransactionItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub id: ManagerId,
    pub username: String,
    pub display_name: Option<String>,
}

/// One season-scoped league record; `previous_league_id` links a season to
/// its predecessor, forming the dynasty chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueSeason {
    pub id: LeagueId,
    pub season: u16,
    pub name: Option<String>,
    pub previous_league_id: Option<LeagueId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{AssetId, ManagerId};

    #[test]
    fn transaction_type_roundtrip() {
        for tx_type in [
            TransactionType::Trade,
            TransactionType::Draft,
            TransactionType::Waiver,
            TransactionType::FreeAgent,
            TransactionType::Commissioner,
        ] {
            assert_eq!(TransactionType::parse(tx_type.as_str()), Some(tx_type));
        }
        assert_eq!(TransactionType::parse("ir_move"), None);
    }

    #[test]
    fn asset_serializes_tagged() {
        let pick = Asset::DraftPick {
            id: AssetId::try_new("pick-2025-2-m1").unwrap(),
            season: 2025,
            round: 2,
            original_owner: ManagerId::try_new("m1").unwrap(),
            current_owner: ManagerId::try_new("m2").unwrap(),
            previous_owner: Some(ManagerId::try_new("m1").unwrap()),
            pick_number: None,
            selected_player: None,
        };
        let json = serde_json::to_value(&pick).unwrap();
        assert_eq!(json["kind"], "draft_pick");
        assert_eq!(json["season"], 2025);
        let back: Asset = serde_json::from_value(json).unwrap();
        assert_eq!(back, pick);
    }

    #[test]
    fn pick_label_names_season_round_and_origin() {
        let pick = Asset::DraftPick {
            id: AssetId::try_new("pick-2025-1-m3").unwrap(),
            season: 2025,
            round: 1,
            original_owner: ManagerId::try_new("m3").unwrap(),
            current_owner: ManagerId::try_new("m3").unwrap(),
            previous_owner: None,
            pick_number: None,
            selected_player: None,
        };
        assert_eq!(pick.label(), "2025 round 1 (via m3)");
    }
}
