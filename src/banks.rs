//! Custom word bank store
//!
//! User-created categories are persisted as a single JSON list. Loading is
//! tolerant: every record is normalized on its own and records that cannot
//! be repaired (no id) are dropped instead of failing the whole load.
//! Mutations are pure functions over a slice that return the next list; the
//! caller decides when to [`CustomBankStore::save`].

use crate::prefs::json_timestamp;
use crate::storage::SharedStore;
use crate::types::*;
use crate::words::Template;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

pub const CUSTOM_WORD_BANKS_KEY: &str = "impostor_custom_word_banks_v1";

/// Name given to stored records whose name is missing or blank
const FALLBACK_BANK_NAME: &str = "Custom";

/// Source of fresh, unique bank and preset ids
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// ULID-backed ids
#[derive(Debug, Default, Clone, Copy)]
pub struct UlidGenerator;

impl IdGenerator for UlidGenerator {
    fn next_id(&self) -> String {
        ulid::Ulid::new().to_string()
    }
}

/// Case-insensitive, trimmed comparison key for words and names
pub fn name_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Parse free-form words into a trimmed, de-duplicated list
///
/// Lists are joined with commas first so that a list item containing a comma
/// is split the same way as typed text. The first spelling of a word wins.
pub fn parse_words_input(input: &WordsInput) -> Vec<String> {
    let raw = match input {
        WordsInput::Text(text) => text.clone(),
        WordsInput::List(items) => items.join(","),
    };

    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for piece in raw.split(',') {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(name_key(trimmed)) {
            words.push(trimmed.to_string());
        }
    }
    words
}

/// Repair one stored record, or `None` when it has no usable id
pub fn normalize_bank(raw: &Value, now: Timestamp) -> Option<WordBank> {
    let obj = raw.as_object()?;

    let id = match obj.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if id.trim().is_empty() {
        return None;
    }

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_BANK_NAME)
        .to_string();

    let words = match obj.get("words") {
        Some(Value::Array(items)) => parse_words_input(&WordsInput::List(
            items
                .iter()
                .filter_map(|w| match w {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
        )),
        _ => Vec::new(),
    };

    let created_at = json_timestamp(obj.get("createdAt")).unwrap_or(now);
    let updated_at = json_timestamp(obj.get("updatedAt")).unwrap_or(created_at);
    let last_played_at = json_timestamp(obj.get("lastPlayedAt"));

    Some(WordBank {
        id,
        name,
        words,
        created_at,
        updated_at,
        last_played_at,
    })
}

/// Lowest unused "Custom N", compared case-insensitively
pub fn next_default_name(banks: &[WordBank]) -> String {
    let used: HashSet<String> = banks.iter().map(|b| name_key(&b.name)).collect();
    let mut index = 1;
    while used.contains(&format!("custom {index}")) {
        index += 1;
    }
    format!("Custom {index}")
}

/// Sorted copy of `banks`; the input is left untouched
pub fn sort_banks(banks: &[WordBank], mode: BankSortMode) -> Vec<WordBank> {
    let mut sorted = banks.to_vec();
    // `sort_by` is stable, so equal keys keep their stored order
    match mode {
        BankSortMode::OrderOfSaving => sorted.sort_by_key(|b| b.created_at),
        BankSortMode::RecentlyPlayed => sorted.sort_by(|a, b| {
            match (a.last_played_at, b.last_played_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then(a.created_at.cmp(&b.created_at))
        }),
    }
    sorted
}

/// Durable list of custom banks
#[derive(Clone)]
pub struct CustomBankStore {
    storage: SharedStore,
    ids: Arc<dyn IdGenerator>,
    clock: Clock,
}

impl CustomBankStore {
    pub fn new(storage: SharedStore) -> Self {
        Self {
            storage,
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

    pub fn now(&self) -> Timestamp {
        (self.clock)()
    }

    /// Read and normalize the stored list; never fails
    pub fn load(&self) -> Vec<WordBank> {
        let raw = match self.storage.get(CUSTOM_WORD_BANKS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read custom word banks: {}", e);
                return Vec::new();
            }
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Stored custom word banks are not valid JSON: {}", e);
                return Vec::new();
            }
        };

        let Value::Array(entries) = parsed else {
            tracing::warn!("Stored custom word banks are not a list, ignoring");
            return Vec::new();
        };

        let now = self.now();
        let total = entries.len();
        let banks: Vec<WordBank> = entries
            .iter()
            .filter_map(|entry| normalize_bank(entry, now))
            .collect();

        if banks.len() < total {
            tracing::debug!(
                "Dropped {} malformed custom word bank record(s)",
                total - banks.len()
            );
        }
        banks
    }

    /// Persist the full list; failures are logged and swallowed
    pub fn save(&self, banks: &[WordBank]) {
        let json = match serde_json::to_string(banks) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize custom word banks: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(CUSTOM_WORD_BANKS_KEY, &json) {
            tracing::warn!("Failed to save custom word banks: {}", e);
        }
    }

    /// Append a new bank built from form input
    pub fn create(&self, banks: &[WordBank], input: &BankInput) -> Vec<WordBank> {
        let now = self.now();
        let trimmed = input.name.trim();
        let name = if trimmed.is_empty() {
            next_default_name(banks)
        } else {
            trimmed.to_string()
        };

        let bank = WordBank {
            id: self.ids.next_id(),
            name,
            words: parse_words_input(&input.words),
            created_at: now,
            updated_at: now,
            last_played_at: None,
        };
        tracing::info!("Created custom word bank {} ({})", bank.id, bank.name);

        let mut next = banks.to_vec();
        next.push(bank);
        next
    }

    /// Replace name (when non-blank) and words of the matching bank
    pub fn update(&self, banks: &[WordBank], id: &str, input: &BankInput) -> Vec<WordBank> {
        let now = self.now();
        banks
            .iter()
            .map(|bank| {
                if bank.id != id {
                    return bank.clone();
                }
                let trimmed = input.name.trim();
                WordBank {
                    name: if trimmed.is_empty() {
                        bank.name.clone()
                    } else {
                        trimmed.to_string()
                    },
                    words: parse_words_input(&input.words),
                    updated_at: now,
                    ..bank.clone()
                }
            })
            .collect()
    }

    pub fn delete(&self, banks: &[WordBank], id: &str) -> Vec<WordBank> {
        banks.iter().filter(|b| b.id != id).cloned().collect()
    }

    /// Drop every bank
    pub fn clear(&self) -> Vec<WordBank> {
        tracing::info!("Cleared all custom word banks");
        Vec::new()
    }

    /// Stamp `lastPlayedAt` on the given banks
    pub fn mark_played(&self, banks: &[WordBank], ids: &[BankId], now: Timestamp) -> Vec<WordBank> {
        banks
            .iter()
            .map(|bank| {
                if ids.contains(&bank.id) {
                    WordBank {
                        last_played_at: Some(now),
                        ..bank.clone()
                    }
                } else {
                    bank.clone()
                }
            })
            .collect()
    }

    /// Copy a predefined template into the custom banks
    ///
    /// A template whose name is already taken returns the existing bank's id
    /// and leaves the list as it was.
    pub fn save_predefined(&self, banks: &[WordBank], template: &Template) -> (Vec<WordBank>, BankId) {
        let key = name_key(template.name);
        if let Some(existing) = banks.iter().find(|b| name_key(&b.name) == key) {
            return (banks.to_vec(), existing.id.clone());
        }

        let next = self.create(
            banks,
            &BankInput::new(template.name, WordsInput::from(template.words)),
        );
        let id = next
            .last()
            .map(|b| b.id.clone())
            .unwrap_or_default();
        (next, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStorage};
    use serde_json::json;
    use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

    struct SequentialIds(AtomicU32);

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            format!("bank-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn ticking_clock(start: i64) -> Clock {
        let counter = Arc::new(AtomicI64::new(start));
        Arc::new(move || counter.fetch_add(10, Ordering::SeqCst))
    }

    fn test_store() -> (Arc<MemoryStorage>, CustomBankStore) {
        let storage = MemoryStorage::shared();
        let store = CustomBankStore::new(storage.clone())
            .with_clock(ticking_clock(1_000))
            .with_id_generator(Arc::new(SequentialIds(AtomicU32::new(0))));
        (storage, store)
    }

    fn bank(id: &str, created_at: i64, last_played_at: Option<i64>) -> WordBank {
        WordBank {
            id: id.to_string(),
            name: id.to_uppercase(),
            words: vec!["x".to_string()],
            created_at,
            updated_at: created_at,
            last_played_at,
        }
    }

    #[test]
    fn test_parse_words_input_dedupes_case_insensitively() {
        let words = parse_words_input(&"Cat, cat, DOG, dog ".into());
        assert_eq!(words, vec!["Cat", "DOG"]);
    }

    #[test]
    fn test_parse_words_input_list_and_empties() {
        let input = WordsInput::List(vec![
            " Apple ".to_string(),
            "".to_string(),
            "pear, APPLE".to_string(),
        ]);
        assert_eq!(parse_words_input(&input), vec!["Apple", "pear"]);
        assert!(parse_words_input(&" , ,  ".into()).is_empty());
    }

    #[test]
    fn test_create_save_load_roundtrip() {
        let (_, store) = test_store();
        let banks = store.create(&[], &BankInput::new("  Fruit ", "Apple, apple, Pear"));
        store.save(&banks);

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, banks[0].id);
        assert_eq!(loaded[0].name, "Fruit");
        assert_eq!(loaded[0].words, vec!["Apple", "Pear"]);
        assert_eq!(loaded[0].created_at, loaded[0].updated_at);
    }

    #[test]
    fn test_create_defaults_blank_name() {
        let (_, store) = test_store();
        let banks = store.create(&[], &BankInput::new("   ", "a"));
        let banks = store.create(&banks, &BankInput::new("", "b"));
        assert_eq!(banks[0].name, "Custom 1");
        assert_eq!(banks[1].name, "Custom 2");
        assert_ne!(banks[0].id, banks[1].id);
    }

    #[test]
    fn test_next_default_name_fills_gaps() {
        let mut a = bank("a", 1, None);
        a.name = "custom 1".to_string();
        let mut b = bank("b", 2, None);
        b.name = "Custom 3".to_string();
        assert_eq!(next_default_name(&[a, b]), "Custom 2");
        assert_eq!(next_default_name(&[]), "Custom 1");
    }

    #[test]
    fn test_update_keeps_identity_and_bumps_updated_at() {
        let (_, store) = test_store();
        let banks = store.create(&[], &BankInput::new("Fruit", "Apple"));
        let before = banks[0].clone();

        let updated = store.update(&banks, &before.id, &BankInput::new(" ", "Kiwi, kiwi"));
        assert_eq!(updated[0].id, before.id);
        assert_eq!(updated[0].name, "Fruit");
        assert_eq!(updated[0].words, vec!["Kiwi"]);
        assert_eq!(updated[0].created_at, before.created_at);
        assert!(updated[0].updated_at > before.updated_at);

        let unchanged = store.update(&banks, "missing", &BankInput::new("X", "y"));
        assert_eq!(unchanged, banks);
    }

    #[test]
    fn test_delete_and_clear() {
        let (_, store) = test_store();
        let banks = store.create(&[], &BankInput::new("A", "a"));
        let banks = store.create(&banks, &BankInput::new("B", "b"));

        let after = store.delete(&banks, &banks[0].id);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].name, "B");
        assert_eq!(store.delete(&after, "missing"), after);
        assert!(store.clear().is_empty());
    }

    #[test]
    fn test_load_tolerates_garbage() {
        let (storage, store) = test_store();
        assert!(store.load().is_empty());

        storage.set(CUSTOM_WORD_BANKS_KEY, "{not json").unwrap();
        assert!(store.load().is_empty());

        storage.set(CUSTOM_WORD_BANKS_KEY, "{\"id\":\"x\"}").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_normalizes_legacy_records() {
        let (storage, store) = test_store();
        let raw = json!([
            {"id": "keep", "name": " Old ", "words": ["A", "a", " B "], "createdAt": 50},
            {"name": "no id", "words": ["x"]},
            {"id": "", "name": "blank id"},
            "not an object",
            {"id": 42, "name": "", "words": "not a list", "createdAt": "soon"}
        ]);
        storage.set(CUSTOM_WORD_BANKS_KEY, &raw.to_string()).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);

        assert_eq!(loaded[0].id, "keep");
        assert_eq!(loaded[0].name, "Old");
        assert_eq!(loaded[0].words, vec!["A", "B"]);
        assert_eq!(loaded[0].created_at, 50);
        assert_eq!(loaded[0].updated_at, 50);
        assert_eq!(loaded[0].last_played_at, None);

        assert_eq!(loaded[1].id, "42");
        assert_eq!(loaded[1].name, "Custom");
        assert!(loaded[1].words.is_empty());
    }

    #[test]
    fn test_save_swallows_write_failures() {
        let (storage, store) = test_store();
        storage.set_fail_writes(true);
        let banks = store.create(&[], &BankInput::new("A", "a"));
        store.save(&banks);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_sort_order_of_saving_is_stable() {
        let banks = vec![
            bank("c", 30, None),
            bank("a1", 10, None),
            bank("b", 20, Some(5)),
            bank("a2", 10, None),
        ];
        let sorted = sort_banks(&banks, BankSortMode::OrderOfSaving);
        let ids: Vec<&str> = sorted.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b", "c"]);
        assert!(sorted.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        // input untouched
        assert_eq!(banks[0].id, "c");
    }

    #[test]
    fn test_sort_recently_played_puts_unplayed_last() {
        let banks = vec![
            bank("never-new", 40, None),
            bank("old-play", 10, Some(100)),
            bank("never-old", 5, None),
            bank("new-play", 20, Some(300)),
            bank("tie", 15, Some(100)),
        ];
        let sorted = sort_banks(&banks, BankSortMode::RecentlyPlayed);
        let ids: Vec<&str> = sorted.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["new-play", "old-play", "tie", "never-old", "never-new"]);
    }

    #[test]
    fn test_mark_played_only_touches_given_ids() {
        let banks = vec![bank("a", 1, None), bank("b", 2, None)];
        let (_, store) = test_store();
        let marked = store.mark_played(&banks, &["b".to_string()], 999);
        assert_eq!(marked[0].last_played_at, None);
        assert_eq!(marked[1].last_played_at, Some(999));
    }

    #[test]
    fn test_save_predefined_is_idempotent_by_name() {
        let (_, store) = test_store();
        let template = crate::words::template("Disney").unwrap();

        let (banks, id) = store.save_predefined(&[], template);
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].id, id);
        assert_eq!(banks[0].name, "Disney");
        assert_eq!(banks[0].words.len(), template.words.len());

        let (again, same_id) = store.save_predefined(&banks, template);
        assert_eq!(again.len(), 1);
        assert_eq!(same_id, id);
    }
}
