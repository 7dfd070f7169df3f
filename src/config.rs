//! Engine tunables.
//!
//! Every field has a default, so the host may pass a partial JSON document
//! (or nothing at all) to `configure()`.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hit points of a fresh profile.
    pub max_hp: u32,
    /// One hit point is regenerated per this many hours on the same calendar day.
    pub hp_regen_hours: u32,
    /// Words drawn for one quiz level.
    pub quiz_word_count: usize,
    /// Words drawn for one boss fight.
    pub boss_word_count: usize,
    /// Upper bound on boss health.
    pub boss_max_health: u32,
    /// Wrong options shown next to the correct meaning.
    pub distractor_count: usize,
    pub points_per_correct: u32,
    /// Victory bonus per remaining hit point.
    pub hp_bonus_points: u32,
    /// Prefix prepended to every localStorage key.
    pub storage_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_hp: 3,
            hp_regen_hours: 6,
            quiz_word_count: 20,
            boss_word_count: 30,
            boss_max_health: 10,
            distractor_count: 3,
            points_per_correct: 100,
            hp_bonus_points: 50,
            storage_prefix: "wordContra_".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config. An empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Regeneration interval in seconds, never zero.
    pub fn regen_interval_secs(&self) -> i64 {
        i64::from(self.hp_regen_hours.max(1)) * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let cfg = EngineConfig::from_json("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.max_hp, 3);
        assert_eq!(cfg.regen_interval_secs(), 6 * 3600);
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let cfg = EngineConfig::from_json(r#"{"max_hp":5,"storage_prefix":"t_"}"#).unwrap();
        assert_eq!(cfg.max_hp, 5);
        assert_eq!(cfg.storage_prefix, "t_");
        assert_eq!(cfg.quiz_word_count, 20);
    }

    #[test]
    fn zero_regen_hours_does_not_divide_by_zero() {
        let cfg = EngineConfig {
            hp_regen_hours: 0,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.regen_interval_secs(), 3600);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EngineConfig::from_json("{max_hp:").is_err());
    }
}
