mod categories;
mod flow;
mod round;
mod setup;

use crate::banks::{CustomBankStore, IdGenerator, UlidGenerator};
use crate::config::GameConfig;
use crate::prefs::PreferenceStore;
use crate::reveal::RevealSequencer;
use crate::round::AllImpostorPolicy;
use crate::storage::SharedStore;
use crate::timer::CountdownTimer;
use crate::transfer::ImportSession;
use crate::types::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Everything one device needs to run the game
pub struct GameController {
    prefs: PreferenceStore,
    bank_store: CustomBankStore,
    banks: Vec<WordBank>,
    config: RoundConfig,
    selected_categories: Vec<String>,
    enabled_bank_ids: Vec<BankId>,
    selected_bank_ids: Vec<BankId>,
    bank_sort_mode: BankSortMode,
    all_impostor_cooldown: u32,
    timer_minutes: u32,
    screen: Screen,
    /// Where "back" from the custom banks screen leads
    custom_banks_origin: Screen,
    reveal: Option<RevealSequencer>,
    timer: Option<CountdownTimer>,
    import: Option<ImportSession>,
    policy: AllImpostorPolicy,
    min_view: Duration,
}

impl GameController {
    /// Load persisted state with the system clock and ULID ids
    pub fn load(storage: SharedStore, config: &GameConfig) -> Self {
        Self::load_with(storage, config, system_clock(), Arc::new(UlidGenerator))
    }

    pub fn load_with(
        storage: SharedStore,
        config: &GameConfig,
        clock: Clock,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let prefs = PreferenceStore::open(storage.clone())
            .with_clock(clock.clone())
            .with_id_generator(ids.clone());
        let bank_store = CustomBankStore::new(storage)
            .with_clock(clock)
            .with_id_generator(ids);
        let banks = bank_store.load();

        let player_count = prefs.player_count();
        let mut player_names = prefs.saved_players();
        player_names.resize(player_count, String::new());
        let round_config = RoundConfig {
            player_count,
            impostor_count: prefs.impostor_count(player_count),
            player_names,
        };

        // Stores written before banks could be hidden enable every bank
        let enabled_bank_ids = prefs
            .enabled_custom_bank_ids()
            .unwrap_or_else(|| banks.iter().map(|b| b.id.clone()).collect());

        let mut controller = Self {
            selected_categories: prefs.selected_categories(),
            selected_bank_ids: prefs.selected_custom_bank_ids(),
            enabled_bank_ids,
            bank_sort_mode: prefs.bank_sort_mode(),
            all_impostor_cooldown: prefs.all_impostor_cooldown(),
            timer_minutes: prefs.timer_minutes(),
            config: round_config,
            prefs,
            bank_store,
            banks,
            screen: Screen::Home,
            custom_banks_origin: Screen::Categories,
            reveal: None,
            timer: None,
            import: None,
            policy: config.all_impostor,
            min_view: config.reveal_delay,
        };
        controller.reconcile_selection();

        tracing::info!(
            banks = controller.banks.len(),
            players = controller.config.player_count,
            impostors = controller.config.impostor_count,
            "Game state loaded"
        );
        controller
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn round_config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn banks(&self) -> &[WordBank] {
        &self.banks
    }

    pub fn selected_categories(&self) -> &[String] {
        &self.selected_categories
    }

    pub fn enabled_bank_ids(&self) -> &[BankId] {
        &self.enabled_bank_ids
    }

    pub fn selected_bank_ids(&self) -> &[BankId] {
        &self.selected_bank_ids
    }

    pub fn bank_sort_mode(&self) -> BankSortMode {
        self.bank_sort_mode
    }

    pub fn all_impostor_cooldown(&self) -> u32 {
        self.all_impostor_cooldown
    }

    pub fn timer_minutes(&self) -> u32 {
        self.timer_minutes
    }

    /// "Play again" from home needs players from an earlier session
    pub fn has_saved_players(&self) -> bool {
        !self.prefs.saved_players().is_empty()
    }

    /// Drop enabled ids that no longer exist and selected ids that are not enabled
    ///
    /// Returns true when anything was removed.
    fn reconcile_selection(&mut self) -> bool {
        let known: HashSet<&str> = self.banks.iter().map(|b| b.id.as_str()).collect();
        let enabled_before = self.enabled_bank_ids.len();
        let selected_before = self.selected_bank_ids.len();

        let mut seen = HashSet::new();
        self.enabled_bank_ids
            .retain(|id| known.contains(id.as_str()) && seen.insert(id.clone()));
        let enabled: HashSet<&str> = self.enabled_bank_ids.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        self.selected_bank_ids
            .retain(|id| enabled.contains(id.as_str()) && seen.insert(id.clone()));

        enabled_before != self.enabled_bank_ids.len()
            || selected_before != self.selected_bank_ids.len()
    }

    fn persist_selection(&mut self) {
        self.prefs
            .set_selection(&self.selected_categories, &self.selected_bank_ids);
    }

    fn persist_enabled(&mut self) {
        self.prefs.set_enabled_custom_bank_ids(&self.enabled_bank_ids);
    }
}
