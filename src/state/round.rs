use super::GameController;
use crate::reveal::{RevealPhase, RevealSequencer};
use crate::round::{assign_round, build_word_pool};
use crate::timer::CountdownTimer;
use crate::types::*;
use crate::words;
use rand::Rng;
use std::time::Instant;

impl GameController {
    /// Words from every selected built-in category and custom bank
    pub fn word_pool(&self) -> Vec<String> {
        let builtin = self
            .selected_categories
            .iter()
            .filter_map(|name| words::category(name))
            .flat_map(|c| c.words.iter().map(|w| w.to_string()));
        let custom = self
            .banks
            .iter()
            .filter(|b| self.selected_bank_ids.contains(&b.id))
            .flat_map(|b| b.words.iter().cloned());
        build_word_pool(builtin.chain(custom))
    }

    pub fn can_start_round(&self) -> bool {
        let n = self.config.player_count;
        (MIN_PLAYERS..=MAX_PLAYERS).contains(&n)
            && self.config.impostor_count >= 1
            && self.config.impostor_count < n
            && !self.word_pool().is_empty()
    }

    /// Assign roles and hand the device to the first player
    ///
    /// Persists the setup, the selection, the all-impostor cooldown and
    /// `lastPlayedAt` on the selected custom banks that supplied words.
    pub fn start_round<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: Timestamp,
    ) -> Result<&RoundResult, String> {
        if self.screen != Screen::Categories {
            return Err("Rounds start from the categories screen".to_string());
        }

        let players = self.config.players();
        let pool = self.word_pool();
        let assignment = assign_round(
            rng,
            &players,
            self.config.impostor_count,
            &pool,
            self.all_impostor_cooldown,
            &self.policy,
        )
        .map_err(|e| e.to_string())?;

        self.prefs.save_round_config(&self.config);
        self.persist_selection();
        self.all_impostor_cooldown = assignment.next_cooldown;
        self.prefs.set_all_impostor_cooldown(self.all_impostor_cooldown);

        let contributed: Vec<BankId> = self
            .banks
            .iter()
            .filter(|b| !b.words.is_empty() && self.selected_bank_ids.contains(&b.id))
            .map(|b| b.id.clone())
            .collect();
        if !contributed.is_empty() {
            let banks = self.bank_store.mark_played(&self.banks, &contributed, now);
            self.banks = banks;
            self.bank_store.save(&self.banks);
        }

        tracing::info!(
            players = players.len(),
            impostors = assignment.result.impostor_ids.len(),
            all_impostors = assignment.result.all_impostors,
            pool = pool.len(),
            "Round started"
        );

        self.timer = None;
        self.reveal = Some(RevealSequencer::new(
            players,
            assignment.result,
            self.min_view,
        ));
        self.go_to(Screen::RevealLoop)?;
        self.round_result()
            .ok_or_else(|| "Round was not started".to_string())
    }

    pub fn round_result(&self) -> Option<&RoundResult> {
        self.reveal.as_ref().map(|seq| seq.result())
    }

    pub fn reveal(&self) -> Option<&RevealSequencer> {
        self.reveal.as_ref()
    }

    pub fn reveal_complete(&self) -> bool {
        self.reveal.as_ref().is_some_and(|seq| seq.is_complete())
    }

    fn sequencer_mut(&mut self) -> Result<&mut RevealSequencer, String> {
        if self.screen != Screen::RevealLoop {
            return Err("No reveal in progress".to_string());
        }
        self.reveal
            .as_mut()
            .ok_or_else(|| "No reveal in progress".to_string())
    }

    /// Current holder confirms they have the device
    pub fn ready(&mut self) -> Result<(), String> {
        self.sequencer_mut()?.ready().map_err(|e| e.to_string())
    }

    pub fn commit_reveal(&mut self, now: Instant) -> Result<(), String> {
        self.sequencer_mut()?
            .commit_reveal(now)
            .map_err(|e| e.to_string())
    }

    /// Hide the card and move on to the next player
    pub fn next(&mut self, now: Instant) -> Result<RevealPhase, String> {
        self.sequencer_mut()?.next(now).map_err(|e| e.to_string())
    }

    /// The card the current holder may see right now
    pub fn current_card(&self) -> Option<RoleCard> {
        self.reveal.as_ref().and_then(|seq| seq.visible_card())
    }

    /// Start the discussion; returns the player who opens it
    pub fn start_discussion(&mut self) -> Result<Player, String> {
        self.go_to(Screen::Discussion)?;
        self.timer = Some(CountdownTimer::new(self.timer_minutes));

        self.reveal
            .as_ref()
            .and_then(|seq| seq.starting_player())
            .cloned()
            .ok_or_else(|| "Starting player not found".to_string())
    }

    pub fn timer(&self) -> Option<&CountdownTimer> {
        self.timer.as_ref()
    }

    pub fn timer_mut(&mut self) -> Option<&mut CountdownTimer> {
        self.timer.as_mut()
    }

    /// Shift the discussion length by `delta` minutes
    ///
    /// Ignored once the countdown has started; returns the length in effect.
    pub fn set_timer_minutes(&mut self, delta: i32) -> u32 {
        if self.timer.as_ref().is_some_and(|t| t.has_started()) {
            return self.timer_minutes;
        }

        let target = (self.timer_minutes as i64 + delta as i64)
            .clamp(MIN_TIMER_MINUTES as i64, MAX_TIMER_MINUTES as i64) as u32;
        self.timer_minutes = self.prefs.set_timer_minutes(target);
        if let Some(timer) = self.timer.as_mut() {
            let _ = timer.set_minutes(self.timer_minutes);
        }
        self.timer_minutes
    }

    /// Finish the discussion
    pub fn end_game(&mut self) -> Result<(), String> {
        self.go_to(Screen::PostGame)?;
        self.timer = None;
        Ok(())
    }

    /// Whether the last round was an all-impostors round
    pub fn everyone_was_impostor(&self) -> bool {
        self.round_result().is_some_and(|r| r.all_impostors)
    }
}
