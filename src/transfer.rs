//! Category import/export
//!
//! Text format: `[name:Category, words:a,b,c]` blocks joined by `|`.
//!
//! Importing is two-step. [`parse_import`] validates the whole text up front
//! and fails on the first bad block. [`ImportSession`] then walks the names
//! that collide with existing banks one at a time so the caller can ask
//! "overwrite or skip?" for each; nothing is written until
//! [`ImportSession::apply`] runs with every conflict decided.

use crate::banks::{name_key, CustomBankStore};
use crate::types::*;
use std::collections::HashMap;

pub const FORMAT_EXAMPLE: &str =
    "[name:Category name, words:word1,word2,word3]|[name:Another, words:wordA,wordB]";

/// One parsed block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub name: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("No categories found. Format: {example}", example = FORMAT_EXAMPLE)]
    Empty,

    #[error("Block {0} is empty. Format: {example}", example = FORMAT_EXAMPLE)]
    EmptyBlock(usize),

    #[error("Block {0} must start with \"[\" and end with \"]\". Format: {example}", example = FORMAT_EXAMPLE)]
    MissingBrackets(usize),

    #[error("Block {0}: missing \"name:\" section. Format: {example}", example = FORMAT_EXAMPLE)]
    MissingName(usize),

    #[error("Block {0}: missing \"words:\" section. Format: {example}", example = FORMAT_EXAMPLE)]
    MissingWords(usize),

    #[error("Block {0}: category name is empty")]
    EmptyName(usize),

    #[error("Block {0}: category name cannot include \"|\" or \"]\"")]
    ForbiddenCharsInName(usize),

    #[error("Block {0}: no words found, add at least one word after \"words:\"")]
    NoWords(usize),

    #[error("Block {0}: words cannot include \"|\" or \"]\"")]
    ForbiddenCharsInWords(usize),
}

impl ImportError {
    /// 1-based block the error refers to, if any
    pub fn block(&self) -> Option<usize> {
        match self {
            ImportError::Empty => None,
            ImportError::EmptyBlock(b)
            | ImportError::MissingBrackets(b)
            | ImportError::MissingName(b)
            | ImportError::MissingWords(b)
            | ImportError::EmptyName(b)
            | ImportError::ForbiddenCharsInName(b)
            | ImportError::NoWords(b)
            | ImportError::ForbiddenCharsInWords(b) => Some(*b),
        }
    }
}

fn has_forbidden_chars(value: &str) -> bool {
    value.contains('|') || value.contains(']')
}

/// Strip a case-insensitive `label\s*:` prefix
fn strip_label<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let head = text.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    text[label.len()..].trim_start().strip_prefix(':')
}

/// Split `name, words: ...` at the first `,\s*words\s*:` divider
fn split_words_section(rest: &str) -> Option<(&str, &str)> {
    rest.match_indices(',').find_map(|(pos, _)| {
        let after = rest[pos + 1..].trim_start();
        strip_label(after, "words").map(|words| (&rest[..pos], words))
    })
}

fn parse_block(block: &str, number: usize) -> Result<ImportEntry, ImportError> {
    let block = block.trim();
    if block.is_empty() {
        return Err(ImportError::EmptyBlock(number));
    }
    if block.len() < 2 || !block.starts_with('[') || !block.ends_with(']') {
        return Err(ImportError::MissingBrackets(number));
    }

    let body = block[1..block.len() - 1].trim();
    let rest = strip_label(body, "name").ok_or(ImportError::MissingName(number))?;
    let (name, words_raw) = split_words_section(rest).ok_or(ImportError::MissingWords(number))?;
    let name = name.trim();
    let words_raw = words_raw.trim();

    if name.is_empty() {
        return Err(ImportError::EmptyName(number));
    }
    if has_forbidden_chars(name) {
        return Err(ImportError::ForbiddenCharsInName(number));
    }
    if words_raw.is_empty() {
        return Err(ImportError::NoWords(number));
    }
    if has_forbidden_chars(words_raw) {
        return Err(ImportError::ForbiddenCharsInWords(number));
    }

    let words: Vec<String> = words_raw
        .split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    if words.is_empty() {
        return Err(ImportError::NoWords(number));
    }

    Ok(ImportEntry {
        name: name.to_string(),
        words,
    })
}

/// Parse an import text; any bad block rejects the whole batch
pub fn parse_import(input: &str) -> Result<Vec<ImportEntry>, ImportError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ImportError::Empty);
    }

    input
        .split('|')
        .enumerate()
        .map(|(index, block)| parse_block(block, index + 1))
        .collect()
}

/// Format banks as import text
pub fn format_for_export(banks: &[WordBank]) -> String {
    banks
        .iter()
        .map(|bank| {
            let words = bank
                .words
                .iter()
                .map(|w| w.trim())
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
                .join(",");
            format!("[name:{}, words:{}]", bank.name.trim(), words)
        })
        .collect::<Vec<_>>()
        .join("|")
}

// ========== Conflict resolution ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    Overwrite,
    Skip,
}

/// An incoming category whose name matches an existing bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConflict {
    pub existing_id: BankId,
    pub existing_name: String,
    pub incoming: ImportEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportSessionError {
    #[error("No conflict is waiting for a decision")]
    NoPendingConflict,

    #[error("{0} conflict(s) still need a decision")]
    Unresolved(usize),

    #[error("Import was cancelled")]
    Cancelled,
}

/// Outcome of a finished import
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub banks: Vec<WordBank>,
    pub created: usize,
    pub overwritten: usize,
    pub skipped: usize,
}

/// Resumable, one-conflict-at-a-time import
#[derive(Debug, Clone)]
pub struct ImportSession {
    entries: Vec<ImportEntry>,
    conflicts: Vec<ImportConflict>,
    decisions: Vec<ConflictDecision>,
    cancelled: bool,
}

impl ImportSession {
    /// Fold duplicate names (last one wins) and list conflicts with `existing`
    pub fn begin(existing: &[WordBank], incoming: Vec<ImportEntry>) -> Self {
        let mut entries: Vec<ImportEntry> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for entry in incoming {
            let key = name_key(&entry.name);
            match positions.get(&key) {
                Some(&pos) => entries[pos] = entry,
                None => {
                    positions.insert(key, entries.len());
                    entries.push(entry);
                }
            }
        }

        let conflicts = entries
            .iter()
            .filter_map(|entry| {
                let key = name_key(&entry.name);
                existing
                    .iter()
                    .find(|bank| name_key(&bank.name) == key)
                    .map(|bank| ImportConflict {
                        existing_id: bank.id.clone(),
                        existing_name: bank.name.clone(),
                        incoming: entry.clone(),
                    })
            })
            .collect();

        Self {
            entries,
            conflicts,
            decisions: Vec::new(),
            cancelled: false,
        }
    }

    pub fn entries(&self) -> &[ImportEntry] {
        &self.entries
    }

    pub fn conflicts(&self) -> &[ImportConflict] {
        &self.conflicts
    }

    /// Index of the conflict awaiting a decision
    pub fn current_index(&self) -> usize {
        self.decisions.len()
    }

    pub fn current_conflict(&self) -> Option<&ImportConflict> {
        if self.cancelled {
            return None;
        }
        self.conflicts.get(self.decisions.len())
    }

    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.decisions.len() == self.conflicts.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Record the decision for the current conflict and move to the next
    pub fn resolve(&mut self, decision: ConflictDecision) -> Result<(), ImportSessionError> {
        if self.cancelled {
            return Err(ImportSessionError::Cancelled);
        }
        if self.current_conflict().is_none() {
            return Err(ImportSessionError::NoPendingConflict);
        }
        self.decisions.push(decision);
        Ok(())
    }

    /// Abandon the import; nothing is applied
    pub fn cancel(&mut self) {
        tracing::info!(
            "Import cancelled after {} of {} conflict decision(s)",
            self.decisions.len(),
            self.conflicts.len()
        );
        self.cancelled = true;
    }

    /// Apply every entry to `banks`, once all conflicts are decided
    pub fn apply(
        &self,
        banks: &[WordBank],
        store: &CustomBankStore,
    ) -> Result<ImportSummary, ImportSessionError> {
        if self.cancelled {
            return Err(ImportSessionError::Cancelled);
        }
        if !self.is_complete() {
            return Err(ImportSessionError::Unresolved(
                self.conflicts.len() - self.decisions.len(),
            ));
        }

        let decisions: HashMap<String, (&ImportConflict, ConflictDecision)> = self
            .conflicts
            .iter()
            .zip(self.decisions.iter().copied())
            .map(|(c, d)| (name_key(&c.incoming.name), (c, d)))
            .collect();

        let mut next = banks.to_vec();
        let (mut created, mut overwritten, mut skipped) = (0, 0, 0);
        for entry in &self.entries {
            let input = BankInput::new(entry.name.clone(), entry.words.clone());
            match decisions.get(&name_key(&entry.name)) {
                Some((conflict, ConflictDecision::Overwrite)) => {
                    next = store.update(&next, &conflict.existing_id, &input);
                    overwritten += 1;
                }
                Some((_, ConflictDecision::Skip)) => skipped += 1,
                None => {
                    next = store.create(&next, &input);
                    created += 1;
                }
            }
        }

        tracing::info!(
            "Imported categories: {} created, {} overwritten, {} skipped",
            created,
            overwritten,
            skipped
        );
        Ok(ImportSummary {
            banks: next,
            created,
            overwritten,
            skipped,
        })
    }
}
