//! Unlock / completion state and the level -> boss -> next-unit progression.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ids::{BossId, LEVELS_PER_UNIT, LevelId, NextStage, UnitId};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_list_id: Option<UnitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_level_id: Option<LevelId>,
    /// Always contains the first level. Sets only grow.
    pub unlocked_levels: BTreeSet<LevelId>,
    pub unlocked_bosses: BTreeSet<BossId>,
    pub completed_levels: BTreeSet<LevelId>,
    pub completed_bosses: BTreeSet<BossId>,
    /// Levels won without a single wrong answer.
    #[serde(default)]
    pub perfect_levels: BTreeSet<LevelId>,
    /// Longest run of consecutive correct quiz answers.
    #[serde(default)]
    pub max_streak: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_list_id: None,
            current_level_id: None,
            unlocked_levels: BTreeSet::from([LevelId::first()]),
            unlocked_bosses: BTreeSet::new(),
            completed_levels: BTreeSet::new(),
            completed_bosses: BTreeSet::new(),
            perfect_levels: BTreeSet::new(),
            max_streak: 0,
        }
    }
}

/// What a completion changed, for logging and for the host's victory screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Unlocks {
    pub levels: Vec<LevelId>,
    pub bosses: Vec<BossId>,
}

impl GameState {
    /// Pull a stored record back inside its invariants.
    pub fn normalize(&mut self) {
        self.unlocked_levels.insert(LevelId::first());
        // A completed stage was necessarily unlocked at some point.
        self.unlocked_levels.extend(self.completed_levels.iter().copied());
        self.unlocked_bosses.extend(self.completed_bosses.iter().copied());
    }

    pub fn unlock_level(&mut self, level: LevelId) -> bool {
        self.unlocked_levels.insert(level)
    }

    pub fn unlock_boss(&mut self, boss: BossId) -> bool {
        self.unlocked_bosses.insert(boss)
    }

    pub fn is_level_unlocked(&self, level: LevelId) -> bool {
        self.unlocked_levels.contains(&level)
    }

    pub fn is_boss_unlocked(&self, boss: BossId) -> bool {
        self.unlocked_bosses.contains(&boss)
    }

    /// Mark a level completed and unlock what follows it: the next level of
    /// the unit, or the unit's boss after the last level.
    pub fn complete_level(&mut self, level: LevelId) -> Unlocks {
        let mut unlocks = Unlocks::default();
        self.unlocked_levels.insert(level);
        self.completed_levels.insert(level);
        match level.next() {
            NextStage::Level(next) => {
                if self.unlock_level(next) {
                    unlocks.levels.push(next);
                }
            }
            NextStage::Boss(boss) => {
                if self.unlock_boss(boss) {
                    unlocks.bosses.push(boss);
                }
            }
        }
        unlocks
    }

    /// Mark a boss defeated and unlock the first level of the next unit.
    pub fn complete_boss(&mut self, boss: BossId) -> Unlocks {
        let mut unlocks = Unlocks::default();
        self.unlocked_bosses.insert(boss);
        self.completed_bosses.insert(boss);
        let next = boss.next_unit_first_level();
        if self.unlock_level(next) {
            unlocks.levels.push(next);
        }
        unlocks
    }

    pub fn set_current(&mut self, unit: UnitId, level: Option<LevelId>) {
        self.current_list_id = Some(unit);
        self.current_level_id = level;
    }
}

// ── Stage map view ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageView {
    pub id: String,
    pub unlocked: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    pub id: UnitId,
    pub name: String,
    pub word_count: usize,
    /// A unit is open once its first level is.
    pub unlocked: bool,
    /// Completed stages out of `LEVELS_PER_UNIT + 1`.
    pub completed_stages: usize,
    pub levels: Vec<StageView>,
    pub boss: StageView,
}

/// Levels and boss of every unit the vocabulary knows, with their flags.
pub fn stage_map(game: &GameState, vocab: &Vocabulary) -> Vec<UnitView> {
    vocab
        .lists
        .iter()
        .map(|list| {
            let levels: Vec<StageView> = (1..=LEVELS_PER_UNIT)
                .filter_map(|n| LevelId::new(list.id, n).ok())
                .map(|level| StageView {
                    id: level.to_string(),
                    unlocked: game.is_level_unlocked(level),
                    completed: game.completed_levels.contains(&level),
                })
                .collect();
            let boss_id = list.id.boss();
            let boss = StageView {
                id: boss_id.to_string(),
                unlocked: game.is_boss_unlocked(boss_id),
                completed: game.completed_bosses.contains(&boss_id),
            };
            let completed_stages =
                levels.iter().filter(|l| l.completed).count() + usize::from(boss.completed);
            UnitView {
                id: list.id,
                name: list.name.clone(),
                word_count: list.words.len(),
                unlocked: levels.first().is_some_and(|l| l.unlocked),
                completed_stages,
                levels,
                boss,
            }
        })
        .collect()
}
