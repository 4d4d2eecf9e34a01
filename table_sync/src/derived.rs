//! Values recomputed from every accepted snapshot.

use crate::rules::{NextToActInfo, TableRules};
use crate::snapshot::{ActionKind, Address, Amount, LegalAction, TableSnapshot};

/// Ephemeral view derived from the latest snapshot plus the local identity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedState {
    /// Store version this was computed from (0 before the first snapshot)
    pub source_version: u64,
    pub current_round: String,
    pub total_pot: Amount,
    pub next_to_act: Option<NextToActInfo>,
    /// `None` when no local identity is known or it holds no seat
    pub player_legal_actions: Option<Vec<LegalAction>>,
    pub is_player_turn: bool,
    pub table_type: String,
    pub can_deal: bool,
    pub local_seat: Option<u8>,
    pub local_position: &'static str,
    pub is_user_playing: bool,
}

impl DerivedState {
    /// Compute derived values. Never fails: missing players or an unseated
    /// identity fall back to empty/false values.
    pub fn compute(
        snapshot: &TableSnapshot,
        source_version: u64,
        identity: Option<&Address>,
        rules: &dyn TableRules,
        default_table_type: &str,
    ) -> Self {
        let identity = identity.filter(|address| !address.is_empty());
        let local_seat = identity
            .and_then(|address| snapshot.player_by_address(address))
            .map(|player| player.seat);

        let (player_legal_actions, is_player_turn) = match identity {
            Some(address) => (
                rules.players_legal_actions(snapshot, address),
                rules.is_players_turn(snapshot, address),
            ),
            None => (None, false),
        };

        Self {
            source_version,
            current_round: rules.current_round(snapshot),
            total_pot: rules.total_pot(snapshot),
            next_to_act: rules.who_is_next_to_act(snapshot, identity),
            player_legal_actions,
            is_player_turn,
            table_type: snapshot
                .table_type
                .clone()
                .filter(|kind| !kind.is_empty())
                .unwrap_or_else(|| default_table_type.to_string()),
            can_deal: can_deal(snapshot),
            local_seat,
            local_position: local_seat
                .map(|seat| rules.position_name(snapshot, seat))
                .unwrap_or(""),
            is_user_playing: rules.is_user_playing(snapshot, identity),
        }
    }
}

/// True iff any seated player may deal
pub fn can_deal(snapshot: &TableSnapshot) -> bool {
    snapshot
        .players
        .iter()
        .any(|player| player.can(&ActionKind::Deal))
}
