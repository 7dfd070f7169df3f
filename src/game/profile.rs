//! The player's profile: hit points, lifetime counters and achievements.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "currentHP")]
    pub current_hp: u32,
    #[serde(rename = "maxHP")]
    pub max_hp: u32,
    #[serde(alias = "lastLoginDate")]
    pub last_login_timestamp: DateTime<Utc>,
    /// Words that have ever left NEW. Never decreases.
    pub total_words_learned: u32,
    /// Words that have ever reached MASTERED. Never decreases.
    pub total_words_mastered: u32,
    pub achievements: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total_score: u64,
}

/// What a login-refresh did to the hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Regeneration {
    /// First login on a new local calendar day: back to full.
    NewDay,
    /// Same day: one point per elapsed interval.
    Intervals { intervals: i64 },
    None,
}

impl UserProfile {
    pub fn new(max_hp: u32, now: DateTime<Utc>) -> Self {
        Self {
            current_hp: max_hp,
            max_hp,
            last_login_timestamp: now,
            total_words_learned: 0,
            total_words_mastered: 0,
            achievements: BTreeSet::new(),
            created_at: now,
            total_score: 0,
        }
    }

    /// Pull a stored record back inside its invariants.
    pub fn normalize(&mut self) {
        self.current_hp = self.current_hp.min(self.max_hp);
    }

    /// Clamp `current_hp + delta` into `0..=max_hp`. Returns the new value.
    pub fn adjust_hp(&mut self, delta: i32) -> u32 {
        let next = (i64::from(self.current_hp) + i64::from(delta)).clamp(0, i64::from(self.max_hp));
        self.current_hp = next as u32;
        self.current_hp
    }

    pub fn is_out_of_hp(&self) -> bool {
        self.current_hp == 0
    }

    /// Regenerate hit points from the stored last-login instant.
    ///
    /// `last_date` / `today` are the local calendar dates of the last login and
    /// of `now`. The last-login instant is moved to `now` in every case.
    pub fn refresh_login(
        &mut self,
        now: DateTime<Utc>,
        last_date: NaiveDate,
        today: NaiveDate,
        interval_secs: i64,
    ) -> Regeneration {
        let regen = if last_date != today {
            self.current_hp = self.max_hp;
            Regeneration::NewDay
        } else {
            let elapsed = (now - self.last_login_timestamp).num_seconds();
            let intervals = elapsed.div_euclid(interval_secs.max(1));
            if intervals > 0 {
                let gained = intervals.min(i64::from(self.max_hp)) as u32;
                self.current_hp = self.current_hp.saturating_add(gained).min(self.max_hp);
                Regeneration::Intervals { intervals }
            } else {
                Regeneration::None
            }
        };
        self.last_login_timestamp = now;
        regen
    }

    /// Set semantics: returns `true` only when the id was not already present.
    pub fn add_achievement(&mut self, id: &str) -> bool {
        self.achievements.insert(id.to_string())
    }
}
