//! Pure rule functions over a table snapshot.

use crate::snapshot::{Address, Amount, LegalAction, PlayerRecord, TableSnapshot};
use std::time::Duration;

/// Who acts next and what they may do
#[derive(Debug, Clone, PartialEq)]
pub struct NextToActInfo {
    pub seat: u8,
    pub player: Option<PlayerRecord>,
    pub is_current_user_turn: bool,
    pub available_actions: Vec<LegalAction>,
    pub time_remaining: Duration,
}

/// Rules a table variant supplies. Game legality itself stays on the
/// server; these only read what the snapshot already says.
pub trait TableRules: Send + Sync {
    fn who_is_next_to_act(
        &self,
        snapshot: &TableSnapshot,
        identity: Option<&Address>,
    ) -> Option<NextToActInfo>;

    fn current_round(&self, snapshot: &TableSnapshot) -> String {
        snapshot.round.clone().unwrap_or_default()
    }

    fn total_pot(&self, snapshot: &TableSnapshot) -> Amount {
        snapshot
            .pots
            .iter()
            .fold(Amount::ZERO, |total, pot| total.saturating_add(*pot))
    }

    fn position_name(&self, snapshot: &TableSnapshot, seat: u8) -> &'static str;

    fn players_legal_actions(
        &self,
        snapshot: &TableSnapshot,
        address: &Address,
    ) -> Option<Vec<LegalAction>> {
        snapshot
            .player_by_address(address)
            .map(|player| player.legal_actions.clone())
    }

    fn is_players_turn(&self, snapshot: &TableSnapshot, address: &Address) -> bool {
        match (snapshot.player_by_address(address), snapshot.next_to_act) {
            (Some(player), Some(next)) => player.seat == next,
            _ => false,
        }
    }

    fn is_user_playing(&self, snapshot: &TableSnapshot, identity: Option<&Address>) -> bool {
        identity.is_some_and(|address| snapshot.player_by_address(address).is_some())
    }
}

/// Rules for hold'em style tables
#[derive(Debug, Clone)]
pub struct StandardRules {
    turn_budget: Duration,
}

impl StandardRules {
    pub fn new(turn_budget: Duration) -> Self {
        Self { turn_budget }
    }
}

impl Default for StandardRules {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl TableRules for StandardRules {
    fn who_is_next_to_act(
        &self,
        snapshot: &TableSnapshot,
        identity: Option<&Address>,
    ) -> Option<NextToActInfo> {
        let seat = snapshot.next_to_act?;
        let player = snapshot.player_at(seat).cloned();

        let is_current_user_turn = match (&player, identity) {
            (Some(player), Some(address)) => !address.is_empty() && &player.address == address,
            _ => false,
        };
        let available_actions = player
            .as_ref()
            .map(|player| player.legal_actions.clone())
            .unwrap_or_default();

        Some(NextToActInfo {
            seat,
            player,
            is_current_user_turn,
            available_actions,
            time_remaining: self.turn_budget,
        })
    }

    fn position_name(&self, snapshot: &TableSnapshot, seat: u8) -> &'static str {
        let Some(dealer) = snapshot.dealer_seat else {
            return "";
        };
        if seat == dealer {
            return "Dealer";
        }

        let mut seats: Vec<u8> = snapshot.players.iter().map(|player| player.seat).collect();
        seats.sort_unstable();

        // Seats in acting order, starting left of the dealer
        let order: Vec<u8> = seats
            .iter()
            .copied()
            .filter(|s| *s > dealer)
            .chain(seats.iter().copied().filter(|s| *s <= dealer))
            .collect();

        let (small_blind, big_blind) = match order.as_slice() {
            // Heads-up: the dealer posts the small blind
            [first, _] if seats.len() == 2 => (dealer, *first),
            [first, second, ..] => (*first, *second),
            _ => return "",
        };

        if seat == small_blind {
            "Small Blind"
        } else if seat == big_blind {
            "Big Blind"
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ActionKind;
    use serde_json::json;

    fn table(dealer: u8, seats: &[u8], next_to_act: u8) -> TableSnapshot {
        let players: Vec<_> = seats
            .iter()
            .map(|seat| {
                json!({
                    "seat": seat,
                    "address": format!("0xP{seat}"),
                    "legalActions": [{ "action": "call" }, { "action": "fold" }]
                })
            })
            .collect();

        TableSnapshot::ingest(
            json!({
                "type": "cash",
                "round": "turn",
                "dealer": dealer,
                "nextToAct": next_to_act,
                "players": players,
                "pots": ["100", "250", 50]
            }),
            9,
        )
        .unwrap()
    }

    #[test]
    fn test_next_to_act_for_local_player() {
        let rules = StandardRules::default();
        let snapshot = table(0, &[0, 2, 5], 2);
        let me = Address::new("0xp2");

        let info = rules.who_is_next_to_act(&snapshot, Some(&me)).unwrap();
        assert_eq!(info.seat, 2);
        assert!(info.is_current_user_turn);
        assert_eq!(info.available_actions.len(), 2);
        assert_eq!(info.time_remaining, Duration::from_secs(30));
    }

    #[test]
    fn test_next_to_act_for_other_player() {
        let rules = StandardRules::default();
        let snapshot = table(0, &[0, 2, 5], 5);

        let info = rules
            .who_is_next_to_act(&snapshot, Some(&Address::new("0xp2")))
            .unwrap();
        assert!(!info.is_current_user_turn);
        assert_eq!(info.player.unwrap().seat, 5);

        let info = rules.who_is_next_to_act(&snapshot, None).unwrap();
        assert!(!info.is_current_user_turn);
    }

    #[test]
    fn test_next_to_act_on_empty_seat() {
        let rules = StandardRules::default();
        let snapshot = table(0, &[0, 2], 7);

        let info = rules.who_is_next_to_act(&snapshot, None).unwrap();
        assert!(info.player.is_none());
        assert!(info.available_actions.is_empty());
    }

    #[test]
    fn test_round_and_pot() {
        let rules = StandardRules::default();
        let snapshot = table(0, &[0, 1], 1);
        assert_eq!(rules.current_round(&snapshot), "turn");
        assert_eq!(rules.total_pot(&snapshot), Amount(400));
    }

    #[test]
    fn test_legal_actions_and_turn() {
        let rules = StandardRules::default();
        let snapshot = table(0, &[0, 3], 3);

        let actions = rules
            .players_legal_actions(&snapshot, &Address::new("0xP3"))
            .unwrap();
        assert_eq!(actions[0].action, ActionKind::Call);
        assert!(rules.is_players_turn(&snapshot, &Address::new("0xp3")));
        assert!(!rules.is_players_turn(&snapshot, &Address::new("0xp0")));

        let stranger = Address::new("0xnobody");
        assert!(rules.players_legal_actions(&snapshot, &stranger).is_none());
        assert!(!rules.is_players_turn(&snapshot, &stranger));
        assert!(!rules.is_user_playing(&snapshot, Some(&stranger)));
        assert!(rules.is_user_playing(&snapshot, Some(&Address::new("0xp0"))));
    }

    #[test]
    fn test_position_names_ring_game() {
        let rules = StandardRules::default();
        let snapshot = table(5, &[1, 3, 5, 7], 1);

        assert_eq!(rules.position_name(&snapshot, 5), "Dealer");
        assert_eq!(rules.position_name(&snapshot, 7), "Small Blind");
        assert_eq!(rules.position_name(&snapshot, 1), "Big Blind");
        assert_eq!(rules.position_name(&snapshot, 3), "");
    }

    #[test]
    fn test_position_names_heads_up() {
        let rules = StandardRules::default();
        let snapshot = table(4, &[0, 4], 0);

        assert_eq!(rules.position_name(&snapshot, 4), "Dealer");
        assert_eq!(rules.position_name(&snapshot, 0), "Big Blind");
    }
}
