#![forbid(unsafe_code)]

//! Named policy functions for the places where the engine deliberately
//! simplifies messy real-world data. Traversal code calls these by name so a
//! sharper multi-party resolution can replace them without touching the
//! walkers.

use crate::graph::ManagerSide;
use crate::ids::{AssetId, ManagerId};

/// Collapse a transaction's per-manager item groups to one (from, to) pair.
///
/// With a focus asset, orient around whichever group touches it: the group
/// giving the focus asset is `from`, the group receiving it is `to`. Without
/// one, take the first two groups in item order. Known approximation: for a
/// trade between three or more managers this pins two parties and ignores the
/// rest; the full grouping stays available on the link's `sides`.
pub fn orient_trade_parties(
    sides: &[ManagerSide],
    focus_asset: Option<&AssetId>,
) -> (Option<ManagerId>, Option<ManagerId>) {
    if sides.is_empty() {
        return (None, None);
    }

    if let Some(focus) = focus_asset {
        let giver = sides
            .iter()
            .find(|side| side.assets_given.contains(focus))
            .map(|side| side.manager.clone());
        let receiver = sides
            .iter()
            .find(|side| side.assets_received.contains(focus))
            .map(|side| side.manager.clone());
        if giver.is_some() || receiver.is_some() {
            let from = giver.or_else(|| {
                sides
                    .iter()
                    .find(|side| Some(&side.manager) != receiver.as_ref())
                    .map(|side| side.manager.clone())
            });
            let to = receiver.or_else(|| {
                sides
                    .iter()
                    .find(|side| Some(&side.manager) != from.as_ref())
                    .map(|side| side.manager.clone())
            });
            return (from, to);
        }
    }

    let from = Some(sides[0].manager.clone());
    let to = sides.get(1).map(|side| side.manager.clone());
    (from, to)
}

/// What a manager gave up in exchange when tracing backward across a trade:
/// the first asset in that manager's give list, item order.
///
/// For multi-asset packages the original behavior is effectively arbitrary;
/// the deterministic rule here is persisted item order (lowest item rowid).
pub fn backward_substitute(sides: &[ManagerSide], manager: &ManagerId) -> Option<AssetId> {
    sides
        .iter()
        .find(|side| &side.manager == manager)
        .and_then(|side| side.assets_given.first())
        .cloned()
}
