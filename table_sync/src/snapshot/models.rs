//! Canonical table snapshot types and the ingestion boundary.

use crate::errors::{SyncError, SyncResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Owner identity. Lowercased once on construction so every comparison
/// downstream is plain equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed-point chip amount in the smallest unit.
///
/// The server sends amounts as decimal strings (they overflow `u64`), but
/// small values occasionally arrive as plain JSON numbers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "AmountRepr", into = "String")]
pub struct Amount(pub u128);

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Text(String),
    Number(u64),
}

impl TryFrom<AmountRepr> for Amount {
    type Error = String;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Number(value) => Ok(Self(u128::from(value))),
            AmountRepr::Text(text) if text.trim().is_empty() => Ok(Self(0)),
            AmountRepr::Text(text) => text
                .trim()
                .parse()
                .map(Self)
                .map_err(|_| format!("invalid amount '{text}'")),
        }
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Amount {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Player action names as the table server spells them
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    PostSmallBlind,
    PostBigBlind,
    Fold,
    Check,
    Bet,
    Call,
    Raise,
    AllIn,
    Muck,
    SitIn,
    SitOut,
    Show,
    Join,
    Leave,
    Deal,
    Other(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PostSmallBlind => "post-small-blind",
            Self::PostBigBlind => "post-big-blind",
            Self::Fold => "fold",
            Self::Check => "check",
            Self::Bet => "bet",
            Self::Call => "call",
            Self::Raise => "raise",
            Self::AllIn => "all-in",
            Self::Muck => "muck",
            Self::SitIn => "sit-in",
            Self::SitOut => "sit-out",
            Self::Show => "show",
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Deal => "deal",
            Self::Other(name) => name,
        }
    }

    /// Whether the action only makes sense with an amount attached
    pub fn requires_amount(&self) -> bool {
        matches!(self, Self::Bet | Self::Raise)
    }
}

impl From<&str> for ActionKind {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "post-small-blind" => Self::PostSmallBlind,
            "post-big-blind" => Self::PostBigBlind,
            "fold" => Self::Fold,
            "check" => Self::Check,
            "bet" => Self::Bet,
            "call" => Self::Call,
            "raise" => Self::Raise,
            "all-in" => Self::AllIn,
            "muck" => Self::Muck,
            "sit-in" => Self::SitIn,
            "sit-out" => Self::SitOut,
            "show" => Self::Show,
            "join" => Self::Join,
            "leave" => Self::Leave,
            "deal" => Self::Deal,
            _ => Self::Other(raw.to_string()),
        }
    }
}

impl From<String> for ActionKind {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seat status as reported by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlayerStatus {
    #[default]
    Active,
    Folded,
    AllIn,
    SittingOut,
    Showing,
    Busted,
    Other(String),
}

impl PlayerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Folded => "folded",
            Self::AllIn => "all-in",
            Self::SittingOut => "sitting-out",
            Self::Showing => "showing",
            Self::Busted => "busted",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for PlayerStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "folded" => Self::Folded,
            "all-in" => Self::AllIn,
            "sitting-out" | "sit-out" => Self::SittingOut,
            "showing" => Self::Showing,
            "busted" => Self::Busted,
            _ => Self::Other(raw),
        }
    }
}

impl From<PlayerStatus> for String {
    fn from(status: PlayerStatus) -> Self {
        match status {
            PlayerStatus::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One server-authoritative legal action with its constraints
/// (min/max amounts, action index, ...) kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalAction {
    pub action: ActionKind,
    #[serde(flatten)]
    pub constraints: Map<String, Value>,
}

impl LegalAction {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            constraints: Map::new(),
        }
    }

    /// Minimum amount, when the server constrains one
    pub fn min(&self) -> Option<Amount> {
        self.amount_constraint("min")
    }

    /// Maximum amount, when the server constrains one
    pub fn max(&self) -> Option<Amount> {
        self.amount_constraint("max")
    }

    fn amount_constraint(&self, key: &str) -> Option<Amount> {
        self.constraints
            .get(key)
            .and_then(|value| Amount::deserialize(value).ok())
    }
}

/// A seated participant. Unknown server fields are kept in `extra` so that
/// comparing two records compares everything the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub seat: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: Address,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stack: Amount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hole_cards: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PlayerStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub legal_actions: Vec<LegalAction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayerRecord {
    pub fn can(&self, action: &ActionKind) -> bool {
        self.legal_actions.iter().any(|legal| &legal.action == action)
    }
}

/// One complete, authoritative view of a table.
///
/// Built only through [`TableSnapshot::ingest`]: the dealer sentinel is
/// already remapped and `board` already merges `communityCards`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub address: String,
    #[serde(rename = "type")]
    pub table_type: Option<String>,
    pub round: Option<String>,
    #[serde(rename = "dealer")]
    pub dealer_seat: Option<u8>,
    pub next_to_act: Option<u8>,
    pub players: Vec<PlayerRecord>,
    pub board: Vec<String>,
    pub pots: Vec<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire shape of the state object before normalisation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTableState {
    #[serde(default, deserialize_with = "null_as_default")]
    address: String,
    #[serde(rename = "type", default)]
    table_type: Option<String>,
    #[serde(default)]
    round: Option<String>,
    #[serde(default)]
    dealer: Option<i64>,
    #[serde(default)]
    next_to_act: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    players: Vec<PlayerRecord>,
    #[serde(default)]
    board: Option<Vec<String>>,
    #[serde(default)]
    community_cards: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pots: Vec<Amount>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TableSnapshot {
    /// Accept a raw state payload, either `{data: {...}}` or the flat state
    /// object itself, and normalise it.
    ///
    /// `table_size` is the seat count; the server uses it as a "wrap to the
    /// first seat" sentinel for `dealer` and `nextToAct`, which maps to 0.
    ///
    /// # Errors
    ///
    /// `MalformedResponse` when the payload carries neither shape, fails to
    /// deserialize, repeats a seat, carries a hole-card list that is not
    /// empty or a pair, or names a seat beyond the sentinel.
    pub fn ingest(payload: Value, table_size: u8) -> SyncResult<Self> {
        let Value::Object(mut outer) = payload else {
            return Err(SyncError::MalformedResponse(
                "table state is not a JSON object".to_string(),
            ));
        };

        let state = match outer.remove("data") {
            Some(Value::Object(inner)) => inner,
            other => {
                if !outer.contains_key("type") {
                    return Err(SyncError::MalformedResponse(
                        "response carries neither a nested state nor a flat state object"
                            .to_string(),
                    ));
                }
                if let Some(data) = other {
                    outer.insert("data".to_string(), data);
                }
                outer
            }
        };

        let raw: RawTableState = serde_json::from_value(Value::Object(state))
            .map_err(|e| SyncError::MalformedResponse(e.to_string()))?;

        raw.normalize(table_size)
    }

    pub fn player_at(&self, seat: u8) -> Option<&PlayerRecord> {
        self.players.iter().find(|player| player.seat == seat)
    }

    pub fn player_by_address(&self, address: &Address) -> Option<&PlayerRecord> {
        if address.is_empty() {
            return None;
        }
        self.players
            .iter()
            .find(|player| &player.address == address)
    }

    pub fn has_seat(&self, seat: u8) -> bool {
        self.player_at(seat).is_some()
    }

    /// Whether `other` differs in anything consumers react to: the player
    /// list, the seat to act, the round, the board or the pots.
    pub fn differs_materially(&self, other: &TableSnapshot) -> bool {
        self.players != other.players
            || self.next_to_act != other.next_to_act
            || self.round != other.round
            || self.board != other.board
            || self.pots != other.pots
    }
}

impl RawTableState {
    fn normalize(self, table_size: u8) -> SyncResult<TableSnapshot> {
        let dealer_seat = normalize_seat("dealer", self.dealer, table_size)?;
        let next_to_act = normalize_seat("nextToAct", self.next_to_act, table_size)?;

        let mut seen = HashSet::new();
        for player in &self.players {
            if !seen.insert(player.seat) {
                return Err(SyncError::MalformedResponse(format!(
                    "seat {} appears more than once",
                    player.seat
                )));
            }
            if !matches!(player.hole_cards.len(), 0 | 2) {
                return Err(SyncError::MalformedResponse(format!(
                    "seat {} has {} hole cards",
                    player.seat,
                    player.hole_cards.len()
                )));
            }
        }

        Ok(TableSnapshot {
            address: self.address,
            table_type: self.table_type,
            round: self.round,
            dealer_seat,
            next_to_act,
            players: self.players,
            board: self
                .board
                .filter(|board| !board.is_empty())
                .or(self.community_cards)
                .unwrap_or_default(),
            pots: self.pots,
            extra: self.extra,
        })
    }
}

fn normalize_seat(field: &str, raw: Option<i64>, table_size: u8) -> SyncResult<Option<u8>> {
    let Some(seat) = raw else {
        return Ok(None);
    };
    // Negative seats mean "nobody" before the first hand
    if seat < 0 {
        return Ok(None);
    }
    if seat == i64::from(table_size) {
        return Ok(Some(0));
    }
    if seat > i64::from(table_size) {
        return Err(SyncError::MalformedResponse(format!(
            "{field} seat {seat} is outside a {table_size}-seat table"
        )));
    }
    u8::try_from(seat)
        .map(Some)
        .map_err(|_| SyncError::MalformedResponse(format!("{field} seat {seat} is invalid")))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
