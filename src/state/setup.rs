use super::GameController;
use crate::types::*;

impl GameController {
    /// Set the number of players, keeping names and impostors consistent
    pub fn set_player_count(&mut self, count: usize) -> usize {
        let count = count.clamp(MIN_PLAYERS, MAX_PLAYERS);
        self.config.player_count = count;
        self.config.player_names.resize(count, String::new());
        self.config.impostor_count = self.config.impostor_count.clamp(1, count - 1);
        count
    }

    /// Set the number of impostors; at least one player must know the word
    pub fn set_impostor_count(&mut self, count: usize) -> usize {
        let max = self.config.player_count.saturating_sub(1).max(1);
        self.config.impostor_count = count.clamp(1, max);
        self.config.impostor_count
    }

    pub fn set_player_name(&mut self, index: PlayerIdx, name: &str) -> Result<(), String> {
        let slot = self
            .config
            .player_names
            .get_mut(index)
            .ok_or_else(|| format!("No player at seat {}", index + 1))?;
        *slot = name.to_string();
        Ok(())
    }

    /// Fill in blank names, remember the setup and continue to categories
    pub fn finalize_players(&mut self) -> Result<Vec<Player>, String> {
        if self.screen != Screen::Players {
            return Err("Players can only be confirmed from the players screen".to_string());
        }

        let players = self.config.players();
        self.config.player_names = players.iter().map(|p| p.name.clone()).collect();
        self.prefs.save_round_config(&self.config);
        self.go_to(Screen::Categories)?;

        tracing::info!(
            "Players set: {} players, {} impostor(s)",
            self.config.player_count,
            self.config.impostor_count
        );
        Ok(players)
    }

    /// Saved presets in the chosen order
    pub fn presets(&self) -> Vec<PlayerPreset> {
        self.prefs.sorted_presets()
    }

    pub fn preset_sort_mode(&self) -> PresetSortMode {
        self.prefs.preset_sort_mode()
    }

    pub fn set_preset_sort_mode(&mut self, mode: PresetSortMode) {
        self.prefs.set_preset_sort_mode(mode);
    }

    /// Save the current setup as a named preset
    pub fn save_preset(&mut self, name: &str) -> PlayerPreset {
        self.prefs.save_preset(name, &self.config)
    }

    pub fn delete_preset(&mut self, id: &str) {
        self.prefs.delete_preset(id);
    }

    /// Load a preset into the current setup
    pub fn apply_preset(&mut self, id: &str) -> Result<RoundConfig, String> {
        let preset = self
            .prefs
            .touch_preset(id)
            .ok_or_else(|| "Preset not found".to_string())?;

        let config = preset.config();
        self.config.player_names = config.player_names;
        self.set_player_count(config.player_count);
        self.set_impostor_count(config.impostor_count);
        Ok(self.config.clone())
    }
}
