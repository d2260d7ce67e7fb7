use super::GameController;
use crate::types::*;

impl GameController {
    /// Check if a screen transition is valid
    pub fn is_valid_screen_transition(from: &Screen, to: &Screen) -> bool {
        use Screen::*;

        match (from, to) {
            // Setup flow
            (Home, Players) => true,
            (Home, Categories) => true, // Play again with saved players
            (Players, Categories) => true,
            (Players, Home) => true,
            (Categories, Players) => true,
            (Categories, Home) => true,

            // Custom banks open from home or categories and return there
            (Home, CustomBanks) => true,
            (Categories, CustomBanks) => true,
            (CustomBanks, Home) => true,
            (CustomBanks, Categories) => true,

            // Round flow
            (Categories, RevealLoop) => true,
            (RevealLoop, Discussion) => true,
            (Discussion, PostGame) => true,

            // After a round
            (PostGame, Categories) => true,
            (PostGame, Players) => true,
            (PostGame, Home) => true,

            // Abandoning a round goes home
            (RevealLoop, Home) => true,
            (Discussion, Home) => true,

            _ => false,
        }
    }

    /// Validate preconditions for entering a screen
    fn validate_screen_preconditions(&self, to: &Screen) -> Result<(), String> {
        match to {
            Screen::Categories if self.screen == Screen::Home && !self.has_saved_players() => {
                Err("Play again requires players from an earlier game".to_string())
            }
            Screen::RevealLoop => match &self.reveal {
                Some(seq) if !seq.is_complete() => Ok(()),
                _ => Err("The reveal loop starts with start_round".to_string()),
            },
            Screen::Discussion => match &self.reveal {
                Some(seq) if seq.is_complete() => Ok(()),
                Some(_) => Err("Every player must see their card first".to_string()),
                None => Err("Discussion requires an active round".to_string()),
            },
            Screen::PostGame if self.timer.is_none() => {
                Err("Post-game requires a discussion".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Move to another screen
    pub fn go_to(&mut self, to: Screen) -> Result<(), String> {
        let from = self.screen;
        if !Self::is_valid_screen_transition(&from, &to) {
            return Err(format!(
                "Invalid screen transition from {:?} to {:?}",
                from, to
            ));
        }
        self.validate_screen_preconditions(&to)?;

        if to == Screen::CustomBanks {
            self.custom_banks_origin = from;
        }
        match to {
            Screen::Home | Screen::Players | Screen::Categories => {
                self.reveal = None;
                self.timer = None;
            }
            _ => {}
        }

        tracing::debug!("Screen {:?} -> {:?}", from, to);
        self.screen = to;
        Ok(())
    }

    /// Leave the custom banks screen for wherever it was opened from
    pub fn back_from_custom_banks(&mut self) -> Result<(), String> {
        if self.screen != Screen::CustomBanks {
            return Err("Not on the custom banks screen".to_string());
        }
        self.go_to(self.custom_banks_origin)
    }

    /// Custom banks can be picked for play only when opened from categories
    pub fn custom_banks_selectable(&self) -> bool {
        self.screen == Screen::CustomBanks && self.custom_banks_origin == Screen::Categories
    }
}
