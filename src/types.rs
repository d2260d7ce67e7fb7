use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Opaque ID types for type safety
pub type BankId = String;
pub type PresetId = String;

/// Player ordinal within a round (0..N-1)
pub type PlayerIdx = usize;

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 12;
pub const DEFAULT_PLAYER_COUNT: usize = 4;

pub const MIN_TIMER_MINUTES: u32 = 1;
pub const MAX_TIMER_MINUTES: u32 = 15;
pub const DEFAULT_TIMER_MINUTES: u32 = 5;

pub const MAX_ALL_IMPOSTOR_COOLDOWN: u32 = 9;
pub const MAX_PLAYER_PRESETS: usize = 10;

/// Injectable time source
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// Current time in epoch milliseconds
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

pub fn system_clock() -> Clock {
    Arc::new(now_millis)
}

/// Display name for a player slot, falling back to "Player N" when blank
pub fn default_player_name(index: PlayerIdx) -> String {
    format!("Player {}", index + 1)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerIdx,
    pub name: String,
}

/// A user-created category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WordBank {
    pub id: BankId,
    pub name: String,
    pub words: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played_at: Option<Timestamp>,
}

/// Name plus free-form words, as typed into the create/edit form
#[derive(Debug, Clone, Default)]
pub struct BankInput {
    pub name: String,
    pub words: WordsInput,
}

impl BankInput {
    pub fn new(name: impl Into<String>, words: impl Into<WordsInput>) -> Self {
        Self {
            name: name.into(),
            words: words.into(),
        }
    }
}

/// Words may arrive as one comma-separated string or as a list
#[derive(Debug, Clone)]
pub enum WordsInput {
    Text(String),
    List(Vec<String>),
}

impl Default for WordsInput {
    fn default() -> Self {
        WordsInput::Text(String::new())
    }
}

impl From<&str> for WordsInput {
    fn from(value: &str) -> Self {
        WordsInput::Text(value.to_string())
    }
}

impl From<String> for WordsInput {
    fn from(value: String) -> Self {
        WordsInput::Text(value)
    }
}

impl From<Vec<String>> for WordsInput {
    fn from(value: Vec<String>) -> Self {
        WordsInput::List(value)
    }
}

impl From<&[&str]> for WordsInput {
    fn from(value: &[&str]) -> Self {
        WordsInput::List(value.iter().map(|w| w.to_string()).collect())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BankSortMode {
    #[default]
    OrderOfSaving,
    RecentlyPlayed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PresetSortMode {
    #[default]
    RecentlyUsed,
    OrderOfSaving,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundConfig {
    pub player_count: usize,
    pub impostor_count: usize,
    pub player_names: Vec<String>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            player_count: DEFAULT_PLAYER_COUNT,
            impostor_count: 1,
            player_names: vec![String::new(); DEFAULT_PLAYER_COUNT],
        }
    }
}

impl RoundConfig {
    /// Trimmed, defaulted players in seat order
    pub fn players(&self) -> Vec<Player> {
        (0..self.player_count)
            .map(|i| {
                let name = self
                    .player_names
                    .get(i)
                    .map(|n| n.trim())
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| default_player_name(i));
                Player { id: i, name }
            })
            .collect()
    }
}

/// Saved player setup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPreset {
    pub id: PresetId,
    pub name: String,
    pub player_count: usize,
    pub impostor_count: usize,
    pub player_names: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<Timestamp>,
}

impl PlayerPreset {
    pub fn config(&self) -> RoundConfig {
        RoundConfig {
            player_count: self.player_count,
            impostor_count: self.impostor_count,
            player_names: self.player_names.clone(),
        }
    }
}

/// One round's assignment; lives only in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub word: String,
    pub impostor_ids: BTreeSet<PlayerIdx>,
    pub starting_player_id: PlayerIdx,
    pub all_impostors: bool,
}

impl RoundResult {
    pub fn is_impostor(&self, player: PlayerIdx) -> bool {
        self.impostor_ids.contains(&player)
    }

    /// What the given player is allowed to see
    pub fn card_for(&self, player: PlayerIdx) -> RoleCard {
        if self.is_impostor(player) {
            RoleCard::Impostor
        } else {
            RoleCard::Word(self.word.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCard {
    Word(String),
    Impostor,
}

/// Screens the presentation layer moves between
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Home,
    Players,
    Categories,
    CustomBanks,
    RevealLoop,
    Discussion,
    PostGame,
}
