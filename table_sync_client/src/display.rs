//! Plain-text rendering of the table for the terminal.

use table_sync::{DerivedState, LegalAction, TableSnapshot};

/// One-block summary of the table as the local player sees it
pub fn render_summary(derived: &DerivedState, snapshot: Option<&TableSnapshot>) -> String {
    let Some(snapshot) = snapshot else {
        return "Waiting for table state...".to_string();
    };

    let mut lines = Vec::new();

    let round = if derived.current_round.is_empty() {
        "waiting"
    } else {
        derived.current_round.as_str()
    };
    lines.push(format!(
        "{} | round: {} | pot: {}",
        derived.table_type, round, derived.total_pot
    ));

    if !snapshot.board.is_empty() {
        lines.push(format!("board: {}", snapshot.board.join(" ")));
    }

    for player in &snapshot.players {
        let mut tags = Vec::new();
        if snapshot.dealer_seat == Some(player.seat) {
            tags.push("D".to_string());
        }
        if derived.local_seat == Some(player.seat) {
            tags.push("you".to_string());
        }
        if derived
            .next_to_act
            .as_ref()
            .is_some_and(|next| next.seat == player.seat)
        {
            tags.push("to act".to_string());
        }

        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        lines.push(format!(
            "  seat {}: {} stack {} ({}){}",
            player.seat, player.address, player.stack, player.status, tags
        ));
    }

    if let Some(seat) = derived.local_seat {
        let position = if derived.local_position.is_empty() {
            String::new()
        } else {
            format!(", {}", derived.local_position)
        };
        lines.push(format!("You are in seat {}{}", seat, position));
    }

    if derived.is_player_turn {
        let actions = derived
            .player_legal_actions
            .as_deref()
            .map(format_legal_actions)
            .unwrap_or_default();
        lines.push(format!("Your turn: {}", actions));
    } else if let Some(next) = &derived.next_to_act {
        lines.push(format!(
            "Waiting on seat {} ({}s)",
            next.seat,
            next.time_remaining.as_secs()
        ));
    }

    if derived.can_deal {
        lines.push("Ready to deal: type 'deal'".to_string());
    }

    lines.join("\n")
}

/// "check, bet (10-500)" style listing
pub fn format_legal_actions(actions: &[LegalAction]) -> String {
    actions
        .iter()
        .map(|legal| match (legal.min(), legal.max()) {
            (Some(min), Some(max)) => format!("{} ({}-{})", legal.action, min, max),
            (Some(min), None) => format!("{} (min {})", legal.action, min),
            _ => legal.action.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
