//! Last-used settings and player presets
//!
//! All preferences live in one JSON object under [`PREFERENCES_KEY`]. The
//! object is parsed once when the store is opened and kept as an in-memory
//! snapshot; every write merges into the snapshot first and then persists it,
//! so reads always observe the latest write even if the device store
//! rejected it.
//!
//! Accessors never fail. Missing, mistyped or out-of-range values are clamped
//! or replaced by their documented default.

use crate::banks::{name_key, IdGenerator, UlidGenerator};
use crate::storage::SharedStore;
use crate::types::*;
use crate::words;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

pub const PREFERENCES_KEY: &str = "impostor_game_v1";

/// Keys inside the preferences object
pub mod keys {
    pub const LAST_PLAYER_COUNT: &str = "lastPlayerCount";
    pub const LAST_IMPOSTOR_COUNT: &str = "lastImpostorCount";
    pub const SAVED_PLAYERS: &str = "savedPlayers";
    pub const LAST_SELECTED_CATEGORIES: &str = "lastSelectedCategories";
    pub const SELECTED_CUSTOM_BANK_IDS: &str = "lastSelectedCustomBankIds";
    pub const ENABLED_CUSTOM_BANK_IDS: &str = "enabledCustomBankIds";
    pub const TIMER_MINUTES: &str = "roundTimerMinutes";
    pub const ALL_IMPOSTOR_COOLDOWN: &str = "allImpostorCooldown";
    pub const BANK_SORT_MODE: &str = "customBankSortMode";
    pub const PRESET_SORT_MODE: &str = "playerPresetSortMode";
    pub const PLAYER_PRESETS: &str = "playerPresets";
}

// ========== Clamping ==========

/// Numeric view of a JSON value; numeric strings count, everything else is garbage
fn json_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn clamp_rounded(value: &Value, min: u32, max: u32, default: u32) -> u32 {
    json_number(value)
        .map(|n| n.round().clamp(min as f64, max as f64) as u32)
        .unwrap_or(default)
}

/// Epoch-millisecond timestamp, only from real JSON numbers
pub(crate) fn json_timestamp(value: Option<&Value>) -> Option<Timestamp> {
    let n = value?.as_f64()?;
    n.is_finite().then(|| n.round() as Timestamp)
}

pub fn clamp_player_count(value: &Value) -> usize {
    clamp_rounded(
        value,
        MIN_PLAYERS as u32,
        MAX_PLAYERS as u32,
        MIN_PLAYERS as u32,
    ) as usize
}

/// Impostors must leave at least one player who knows the word
pub fn clamp_impostor_count(value: &Value, player_count: usize) -> usize {
    let max = player_count.clamp(MIN_PLAYERS, MAX_PLAYERS) - 1;
    clamp_rounded(value, 1, max as u32, 1) as usize
}

pub fn clamp_timer_minutes(value: &Value) -> u32 {
    clamp_rounded(
        value,
        MIN_TIMER_MINUTES,
        MAX_TIMER_MINUTES,
        DEFAULT_TIMER_MINUTES,
    )
}

pub fn clamp_cooldown(value: &Value) -> u32 {
    clamp_rounded(value, 0, MAX_ALL_IMPOSTOR_COOLDOWN, 0)
}

pub fn parse_bank_sort_mode(value: &Value) -> BankSortMode {
    match value.as_str().map(|s| s.trim().to_lowercase()).as_deref() {
        Some("order_of_saving" | "created" | "oldest" | "saved") => BankSortMode::OrderOfSaving,
        Some("recently_played" | "played" | "recent") => BankSortMode::RecentlyPlayed,
        _ => BankSortMode::default(),
    }
}

pub fn parse_preset_sort_mode(value: &Value) -> PresetSortMode {
    match value.as_str().map(|s| s.trim().to_lowercase()).as_deref() {
        Some("recently_used" | "recent" | "used") => PresetSortMode::RecentlyUsed,
        Some("order_of_saving" | "created" | "oldest" | "saved") => PresetSortMode::OrderOfSaving,
        _ => PresetSortMode::default(),
    }
}

/// Player names, accepting the legacy `[{ "name": ... }]` shape
fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect()
}

// ========== Presets ==========

/// Repair one stored preset, or `None` when it has no id or name
pub fn normalize_preset(raw: &Value, now: Timestamp) -> Option<PlayerPreset> {
    let obj = raw.as_object()?;

    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return None,
    };
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())?
        .to_string();

    // Older presets stored the names under `players`
    let mut player_names = string_list(obj.get("playerNames").or_else(|| obj.get("players")));
    let player_count = match obj.get("playerCount") {
        Some(v) if !v.is_null() => clamp_player_count(v),
        _ => clamp_player_count(&json!(player_names.len())),
    };
    player_names.resize(player_count, String::new());
    let impostor_count =
        clamp_impostor_count(obj.get("impostorCount").unwrap_or(&Value::Null), player_count);

    let created_at = json_timestamp(obj.get("createdAt")).unwrap_or(now);
    let updated_at = json_timestamp(obj.get("updatedAt")).unwrap_or(created_at);

    Some(PlayerPreset {
        id,
        name,
        player_count,
        impostor_count,
        player_names,
        created_at,
        updated_at,
        last_used_at: json_timestamp(obj.get("lastUsedAt")),
    })
}

/// Presets in display order for the given mode
pub fn sort_presets(presets: &[PlayerPreset], mode: PresetSortMode) -> Vec<PlayerPreset> {
    let mut sorted = presets.to_vec();
    match mode {
        PresetSortMode::OrderOfSaving => sorted.sort_by_key(|p| p.created_at),
        PresetSortMode::RecentlyUsed => sorted.sort_by(|a, b| {
            match (a.last_used_at, b.last_used_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then(b.updated_at.cmp(&a.updated_at))
        }),
    }
    sorted
}

/// Drop the least relevant presets beyond the cap, keeping stored order.
/// The preset named by `keep` is never evicted.
fn enforce_preset_cap(
    presets: Vec<PlayerPreset>,
    mode: PresetSortMode,
    keep: &str,
) -> Vec<PlayerPreset> {
    if presets.len() <= MAX_PLAYER_PRESETS {
        return presets;
    }

    let mut ranked: Vec<PlayerPreset> = match mode {
        PresetSortMode::RecentlyUsed => sort_presets(&presets, mode),
        PresetSortMode::OrderOfSaving => {
            let mut newest_first = presets.clone();
            newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            newest_first
        }
    };
    let slots = if ranked.iter().any(|p| p.id == keep) {
        ranked.retain(|p| p.id != keep);
        MAX_PLAYER_PRESETS - 1
    } else {
        MAX_PLAYER_PRESETS
    };
    let evicted: Vec<PlayerPreset> = ranked.split_off(slots.min(ranked.len()));
    for preset in &evicted {
        tracing::info!("Evicted player preset {} ({})", preset.id, preset.name);
    }

    presets
        .into_iter()
        .filter(|p| !evicted.iter().any(|e| e.id == p.id))
        .collect()
}

// ========== Store ==========

/// Cached, typed view over the preferences object
pub struct PreferenceStore {
    storage: SharedStore,
    snapshot: Map<String, Value>,
    ids: Arc<dyn IdGenerator>,
    clock: Clock,
}

impl PreferenceStore {
    /// Read and parse the stored preferences once
    pub fn open(storage: SharedStore) -> Self {
        let snapshot = Self::read_snapshot(&storage);
        Self {
            storage,
            snapshot,
            ids: Arc::new(UlidGenerator),
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    fn read_snapshot(storage: &SharedStore) -> Map<String, Value> {
        match storage.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    tracing::warn!("Stored preferences are not an object, ignoring");
                    Map::new()
                }
                Err(e) => {
                    tracing::warn!("Stored preferences are not valid JSON: {}", e);
                    Map::new()
                }
            },
            Ok(None) => Map::new(),
            Err(e) => {
                tracing::warn!("Failed to read preferences: {}", e);
                Map::new()
            }
        }
    }

    /// The whole cached snapshot
    pub fn load_all(&self) -> &Map<String, Value> {
        &self.snapshot
    }

    /// Merge `partial` over the snapshot and persist the result
    pub fn save(&mut self, partial: Map<String, Value>) {
        self.snapshot.extend(partial);

        let json = Value::Object(self.snapshot.clone()).to_string();
        if let Err(e) = self.storage.set(PREFERENCES_KEY, &json) {
            tracing::warn!("Failed to save preferences: {}", e);
        }
    }

    fn save_one(&mut self, key: &str, value: Value) {
        let mut partial = Map::new();
        partial.insert(key.to_string(), value);
        self.save(partial);
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.snapshot.get(key).filter(|v| !v.is_null())
    }

    // ---- reads ----

    /// Last player count; derived from saved names when only those exist
    pub fn player_count(&self) -> usize {
        match self.get(keys::LAST_PLAYER_COUNT) {
            Some(v) => clamp_player_count(v),
            None => {
                let names = self.saved_players();
                if names.len() >= MIN_PLAYERS {
                    clamp_player_count(&json!(names.len()))
                } else {
                    DEFAULT_PLAYER_COUNT
                }
            }
        }
    }

    pub fn impostor_count(&self, player_count: usize) -> usize {
        clamp_impostor_count(
            self.get(keys::LAST_IMPOSTOR_COUNT).unwrap_or(&Value::Null),
            player_count,
        )
    }

    pub fn saved_players(&self) -> Vec<String> {
        string_list(self.get(keys::SAVED_PLAYERS))
    }

    /// Built-in categories only; older versions mixed custom names in here
    pub fn selected_categories(&self) -> Vec<String> {
        let mut names = string_list(self.get(keys::LAST_SELECTED_CATEGORIES));
        let mut seen = HashSet::new();
        names.retain(|n| words::is_builtin_category(n) && seen.insert(n.clone()));
        names
    }

    pub fn selected_custom_bank_ids(&self) -> Vec<BankId> {
        string_list(self.get(keys::SELECTED_CUSTOM_BANK_IDS))
    }

    /// `None` when the store predates the enabled list
    pub fn enabled_custom_bank_ids(&self) -> Option<Vec<BankId>> {
        self.get(keys::ENABLED_CUSTOM_BANK_IDS)
            .map(|v| string_list(Some(v)))
    }

    pub fn timer_minutes(&self) -> u32 {
        clamp_timer_minutes(self.get(keys::TIMER_MINUTES).unwrap_or(&Value::Null))
    }

    pub fn all_impostor_cooldown(&self) -> u32 {
        clamp_cooldown(self.get(keys::ALL_IMPOSTOR_COOLDOWN).unwrap_or(&Value::Null))
    }

    pub fn bank_sort_mode(&self) -> BankSortMode {
        parse_bank_sort_mode(self.get(keys::BANK_SORT_MODE).unwrap_or(&Value::Null))
    }

    pub fn preset_sort_mode(&self) -> PresetSortMode {
        parse_preset_sort_mode(self.get(keys::PRESET_SORT_MODE).unwrap_or(&Value::Null))
    }

    /// Stored presets, normalized, in stored order
    pub fn presets(&self) -> Vec<PlayerPreset> {
        let Some(Value::Array(items)) = self.get(keys::PLAYER_PRESETS) else {
            return Vec::new();
        };
        let now = (self.clock)();
        let mut seen = HashSet::new();
        items
            .iter()
            .filter_map(|item| normalize_preset(item, now))
            .filter(|p| seen.insert(p.id.clone()))
            .collect()
    }

    pub fn sorted_presets(&self) -> Vec<PlayerPreset> {
        sort_presets(&self.presets(), self.preset_sort_mode())
    }

    // ---- writes ----

    /// Remember the setup used for the last round
    pub fn save_round_config(&mut self, config: &RoundConfig) {
        let mut partial = Map::new();
        partial.insert(keys::LAST_PLAYER_COUNT.to_string(), json!(config.player_count));
        partial.insert(
            keys::LAST_IMPOSTOR_COUNT.to_string(),
            json!(config.impostor_count),
        );
        partial.insert(keys::SAVED_PLAYERS.to_string(), json!(config.player_names));
        self.save(partial);
    }

    pub fn set_selection(&mut self, categories: &[String], custom_ids: &[BankId]) {
        let mut partial = Map::new();
        partial.insert(keys::LAST_SELECTED_CATEGORIES.to_string(), json!(categories));
        partial.insert(keys::SELECTED_CUSTOM_BANK_IDS.to_string(), json!(custom_ids));
        self.save(partial);
    }

    pub fn set_enabled_custom_bank_ids(&mut self, ids: &[BankId]) {
        self.save_one(keys::ENABLED_CUSTOM_BANK_IDS, json!(ids));
    }

    pub fn set_timer_minutes(&mut self, minutes: u32) -> u32 {
        let clamped = clamp_timer_minutes(&json!(minutes));
        self.save_one(keys::TIMER_MINUTES, json!(clamped));
        clamped
    }

    pub fn set_all_impostor_cooldown(&mut self, cooldown: u32) {
        let clamped = clamp_cooldown(&json!(cooldown));
        self.save_one(keys::ALL_IMPOSTOR_COOLDOWN, json!(clamped));
    }

    pub fn set_bank_sort_mode(&mut self, mode: BankSortMode) {
        self.save_one(keys::BANK_SORT_MODE, json!(mode));
    }

    pub fn set_preset_sort_mode(&mut self, mode: PresetSortMode) {
        self.save_one(keys::PRESET_SORT_MODE, json!(mode));
    }

    fn write_presets(&mut self, presets: &[PlayerPreset]) {
        match serde_json::to_value(presets) {
            Ok(value) => self.save_one(keys::PLAYER_PRESETS, value),
            Err(e) => tracing::warn!("Failed to serialize player presets: {}", e),
        }
    }

    /// Save `config` under `name`, overwriting a preset with the same name
    pub fn save_preset(&mut self, name: &str, config: &RoundConfig) -> PlayerPreset {
        let now = (self.clock)();
        let mut presets = self.presets();

        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            let used: Vec<String> = presets.iter().map(|p| name_key(&p.name)).collect();
            let mut index = 1;
            while used.contains(&format!("preset {index}")) {
                index += 1;
            }
            format!("Preset {index}")
        } else {
            trimmed.to_string()
        };

        let player_count = clamp_player_count(&json!(config.player_count));
        let mut player_names = config.player_names.clone();
        player_names.resize(player_count, String::new());
        let impostor_count = clamp_impostor_count(&json!(config.impostor_count), player_count);

        let key = name_key(&name);
        let saved = match presets.iter().position(|p| name_key(&p.name) == key) {
            Some(idx) => {
                let existing = &mut presets[idx];
                existing.name = name;
                existing.player_count = player_count;
                existing.impostor_count = impostor_count;
                existing.player_names = player_names;
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let preset = PlayerPreset {
                    id: self.ids.next_id(),
                    name,
                    player_count,
                    impostor_count,
                    player_names,
                    created_at: now,
                    updated_at: now,
                    last_used_at: None,
                };
                presets.push(preset.clone());
                preset
            }
        };

        let presets = enforce_preset_cap(presets, self.preset_sort_mode(), &saved.id);
        self.write_presets(&presets);
        tracing::info!("Saved player preset {} ({})", saved.id, saved.name);
        saved
    }

    pub fn delete_preset(&mut self, id: &str) {
        let presets: Vec<PlayerPreset> = self.presets().into_iter().filter(|p| p.id != id).collect();
        self.write_presets(&presets);
    }

    /// Stamp a preset as just used and return it
    pub fn touch_preset(&mut self, id: &str) -> Option<PlayerPreset> {
        let now = (self.clock)();
        let mut presets = self.presets();
        let preset = presets.iter_mut().find(|p| p.id == id)?;
        preset.last_used_at = Some(now);
        let touched = preset.clone();
        self.write_presets(&presets);
        Some(touched)
    }
}
