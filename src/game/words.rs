//! Per-word learning state and the vocabulary-browser view over it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::Error;
use crate::ids::UnitId;
use crate::vocabulary::{Vocabulary, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    #[default]
    New,
    Learning,
    Mastered,
}

impl FromStr for WordStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(WordStatus::New),
            "learning" => Ok(WordStatus::Learning),
            "mastered" => Ok(WordStatus::Mastered),
            other => Err(Error::InvalidInput(format!("unknown word status {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordState {
    pub status: WordStatus,
    #[serde(alias = "errors")]
    pub error_count: u32,
    #[serde(alias = "lastReviewed")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// Set on the first move away from NEW.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_at: Option<DateTime<Utc>>,
    /// Set on the first arrival at MASTERED.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastered_at: Option<DateTime<Utc>>,
}

/// First-arrival events produced by a status change. Each is reported at most
/// once in a word's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusTransition {
    pub first_learned: bool,
    pub first_mastered: bool,
}

/// Word id -> state. Entries are created lazily on the first answer or error.
pub type WordStates = BTreeMap<String, WordState>;

impl WordState {
    /// Apply a status requested by a play flow.
    ///
    /// Any transition is accepted. `learned_at` and `mastered_at` are stamped
    /// only on the first arrival, which is what makes the lifetime counters
    /// first-transition counters.
    pub fn set_status(&mut self, status: WordStatus, now: DateTime<Utc>) -> StatusTransition {
        // Records written before `learned_at` existed count as learned once
        // they are past NEW.
        let learned_before = self.learned_at.is_some()
            || self.mastered_at.is_some()
            || self.status != WordStatus::New;
        let transition = StatusTransition {
            first_learned: !learned_before && status != WordStatus::New,
            first_mastered: status == WordStatus::Mastered && self.mastered_at.is_none(),
        };
        self.status = status;
        self.last_reviewed_at = Some(now);
        if status != WordStatus::New && self.learned_at.is_none() {
            self.learned_at = Some(now);
        }
        if transition.first_mastered {
            self.mastered_at = Some(now);
        }
        transition
    }

    pub fn record_error(&mut self, now: DateTime<Utc>) {
        self.error_count = self.error_count.saturating_add(1);
        self.last_reviewed_at = Some(now);
    }
}

// ── Vocabulary browser ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordFilter {
    #[default]
    All,
    New,
    Learning,
    Mastered,
    /// Words answered wrongly at least once.
    Errors,
}

impl FromStr for WordFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "" | "all" => Ok(WordFilter::All),
            "new" => Ok(WordFilter::New),
            "learning" => Ok(WordFilter::Learning),
            "mastered" => Ok(WordFilter::Mastered),
            "error" | "errors" => Ok(WordFilter::Errors),
            other => Err(Error::InvalidInput(format!("unknown word filter {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WordQuery {
    pub unit: Option<UnitId>,
    pub filter: WordFilter,
    pub search: String,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub new: usize,
    pub learning: usize,
    pub mastered: usize,
    pub with_errors: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry<'a> {
    #[serde(flatten)]
    pub word: &'a Word,
    pub status: WordStatus,
    pub error_count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordOverview<'a> {
    pub counts: StatusCounts,
    /// Number of words matching the query before truncation.
    pub total: usize,
    pub words: Vec<WordEntry<'a>>,
}

/// Status counts over the query's unit scope, plus the filtered word list.
pub fn overview<'a>(vocab: &'a Vocabulary, states: &WordStates, query: &WordQuery) -> WordOverview<'a> {
    let scope: Vec<&Word> = match query.unit {
        Some(unit) => vocab.unit_words(unit).iter().collect(),
        None => vocab.all_words().collect(),
    };

    let mut counts = StatusCounts::default();
    let term = query.search.trim().to_lowercase();
    let mut matching = Vec::new();
    for word in scope {
        let state = states.get(&word.id);
        let status = state.map(|s| s.status).unwrap_or_default();
        let error_count = state.map(|s| s.error_count).unwrap_or(0);
        match status {
            WordStatus::New => counts.new += 1,
            WordStatus::Learning => counts.learning += 1,
            WordStatus::Mastered => counts.mastered += 1,
        }
        if error_count > 0 {
            counts.with_errors += 1;
        }

        let keep = match query.filter {
            WordFilter::All => true,
            WordFilter::New => status == WordStatus::New,
            WordFilter::Learning => status == WordStatus::Learning,
            WordFilter::Mastered => status == WordStatus::Mastered,
            WordFilter::Errors => error_count > 0,
        };
        let found = term.is_empty()
            || word.word.to_lowercase().contains(&term)
            || word.meaning.to_lowercase().contains(&term);
        if keep && found {
            matching.push(WordEntry {
                word,
                status,
                error_count,
            });
        }
    }

    let total = matching.len();
    let limit = if query.limit == 0 { 50 } else { query.limit };
    matching.truncate(limit);
    WordOverview {
        counts,
        total,
        words: matching,
    }
}
