use super::GameController;
use crate::banks::sort_banks;
use crate::transfer::{format_for_export, parse_import, ConflictDecision, ImportSession, ImportSummary};
use crate::types::*;
use crate::words;

impl GameController {
    /// Toggle a built-in category; returns whether it is now selected
    pub fn toggle_builtin_category(&mut self, name: &str) -> Result<bool, String> {
        if !words::is_builtin_category(name) {
            return Err(format!("Unknown category: {}", name));
        }

        let selected = match self.selected_categories.iter().position(|c| c == name) {
            Some(idx) => {
                self.selected_categories.remove(idx);
                false
            }
            None => {
                self.selected_categories.push(name.to_string());
                true
            }
        };
        self.persist_selection();
        Ok(selected)
    }

    fn find_bank(&self, id: &str) -> Result<&WordBank, String> {
        self.banks
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| "Word bank not found".to_string())
    }

    /// Show or hide a custom bank on the categories screen
    pub fn set_bank_enabled(&mut self, id: &str, enabled: bool) -> Result<(), String> {
        self.find_bank(id)?;

        let present = self.enabled_bank_ids.iter().any(|e| e == id);
        if enabled && !present {
            self.enabled_bank_ids.push(id.to_string());
        } else if !enabled {
            self.enabled_bank_ids.retain(|e| e != id);
        }

        self.persist_enabled();
        if self.reconcile_selection() {
            self.persist_selection();
        }
        Ok(())
    }

    /// Toggle a custom bank for play; only enabled banks can be selected
    pub fn toggle_custom_bank_selection(&mut self, id: &str) -> Result<bool, String> {
        self.find_bank(id)?;
        if !self.enabled_bank_ids.iter().any(|e| e == id) {
            return Err("Enable the word bank before selecting it".to_string());
        }

        let selected = match self.selected_bank_ids.iter().position(|s| s == id) {
            Some(idx) => {
                self.selected_bank_ids.remove(idx);
                false
            }
            None => {
                self.selected_bank_ids.push(id.to_string());
                true
            }
        };
        self.persist_selection();
        Ok(selected)
    }

    fn commit_banks(&mut self, banks: Vec<WordBank>) {
        self.banks = banks;
        self.bank_store.save(&self.banks);
        if self.reconcile_selection() {
            self.persist_enabled();
            self.persist_selection();
        }
    }

    /// Create a bank; new banks start enabled
    pub fn create_bank(&mut self, input: BankInput) -> BankId {
        let banks = self.bank_store.create(&self.banks, &input);
        let id = banks.last().map(|b| b.id.clone()).unwrap_or_default();
        self.commit_banks(banks);

        self.enabled_bank_ids.push(id.clone());
        self.persist_enabled();
        id
    }

    pub fn update_bank(&mut self, id: &str, input: BankInput) -> Result<(), String> {
        self.find_bank(id)?;
        let banks = self.bank_store.update(&self.banks, id, &input);
        self.commit_banks(banks);
        tracing::info!("Updated custom word bank {}", id);
        Ok(())
    }

    pub fn delete_bank(&mut self, id: &str) -> Result<(), String> {
        self.find_bank(id)?;
        let banks = self.bank_store.delete(&self.banks, id);
        self.commit_banks(banks);
        tracing::info!("Deleted custom word bank {}", id);
        Ok(())
    }

    /// Remove every custom bank
    pub fn clear_banks(&mut self) {
        let banks = self.bank_store.clear();
        self.commit_banks(banks);
    }

    /// Copy a predefined template into the custom banks and enable it
    pub fn save_predefined(&mut self, template_name: &str) -> Result<BankId, String> {
        let template = words::template(template_name)
            .ok_or_else(|| format!("Unknown template: {}", template_name))?;

        let (banks, id) = self.bank_store.save_predefined(&self.banks, template);
        if banks.len() != self.banks.len() {
            self.commit_banks(banks);
        }
        if !self.enabled_bank_ids.contains(&id) {
            self.enabled_bank_ids.push(id.clone());
            self.persist_enabled();
        }
        Ok(id)
    }

    /// Banks in the chosen display order
    pub fn sorted_banks(&self) -> Vec<WordBank> {
        sort_banks(&self.banks, self.bank_sort_mode)
    }

    pub fn set_bank_sort_mode(&mut self, mode: BankSortMode) {
        self.bank_sort_mode = mode;
        self.prefs.set_bank_sort_mode(mode);
    }

    /// Every custom bank in import format
    pub fn export_banks(&self) -> String {
        format_for_export(&self.banks)
    }

    /// Parse an import text and start resolving conflicts
    ///
    /// Returns the number of name conflicts that need a decision.
    pub fn begin_import(&mut self, text: &str) -> Result<usize, String> {
        let entries = parse_import(text).map_err(|e| e.to_string())?;
        let session = ImportSession::begin(&self.banks, entries);
        let conflicts = session.conflicts().len();
        tracing::info!(
            "Import started: {} categories, {} conflict(s)",
            session.entries().len(),
            conflicts
        );
        self.import = Some(session);
        Ok(conflicts)
    }

    pub fn import_session(&self) -> Option<&ImportSession> {
        self.import.as_ref()
    }

    pub fn resolve_import_conflict(&mut self, decision: ConflictDecision) -> Result<(), String> {
        let session = self
            .import
            .as_mut()
            .ok_or_else(|| "No import in progress".to_string())?;
        session.resolve(decision).map_err(|e| e.to_string())
    }

    pub fn cancel_import(&mut self) {
        if let Some(mut session) = self.import.take() {
            session.cancel();
        }
    }

    /// Apply the import once every conflict is decided
    pub fn finish_import(&mut self) -> Result<ImportSummary, String> {
        let session = self
            .import
            .as_ref()
            .ok_or_else(|| "No import in progress".to_string())?;
        let summary = session
            .apply(&self.banks, &self.bank_store)
            .map_err(|e| e.to_string())?;
        self.import = None;

        let new_ids: Vec<BankId> = summary
            .banks
            .iter()
            .filter(|b| !self.banks.iter().any(|old| old.id == b.id))
            .map(|b| b.id.clone())
            .collect();
        self.commit_banks(summary.banks.clone());
        self.enabled_bank_ids.extend(new_ids);
        self.persist_enabled();
        Ok(summary)
    }
}
