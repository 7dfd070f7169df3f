//! Compiled-in achievement catalog and the stats it is judged against.

use serde::Serialize;

use super::progress::GameState;
use super::profile::UserProfile;
use super::words::{WordStates, WordStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    WordsMastered,
    LevelsCompleted,
    BossesDefeated,
    PerfectLevels,
    Streak,
    TotalScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub kind: RequirementKind,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub requirement: Requirement,
    pub points: u32,
    pub rarity: Rarity,
}

const fn def(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    kind: RequirementKind,
    value: u64,
    points: u32,
    rarity: Rarity,
) -> AchievementDef {
    AchievementDef {
        id,
        name,
        description,
        requirement: Requirement { kind, value },
        points,
        rarity,
    }
}

use Rarity::*;
use RequirementKind::*;

pub static CATALOG: &[AchievementDef] = &[
    def("word_novice", "Novice", "Master 10 words", WordsMastered, 10, 10, Common),
    def("word_student", "Good Student", "Master 50 words", WordsMastered, 50, 25, Common),
    def("word_scholar", "Scholar", "Master 100 words", WordsMastered, 100, 50, Rare),
    def("word_expert", "Vocabulary Expert", "Master 200 words", WordsMastered, 200, 100, Epic),
    def("word_master", "Vocabulary Master", "Master 500 words", WordsMastered, 500, 200, Legendary),
    def("level_starter", "Recruit", "Complete your first level", LevelsCompleted, 1, 10, Common),
    def("level_soldier", "Soldier", "Complete 5 levels", LevelsCompleted, 5, 25, Common),
    def("level_veteran", "Veteran", "Complete 10 levels", LevelsCompleted, 10, 50, Rare),
    def("level_hero", "Hero", "Complete 20 levels", LevelsCompleted, 20, 100, Epic),
    def("boss_slayer_1", "Dragon Slayer", "Defeat your first boss", BossesDefeated, 1, 20, Common),
    def("boss_slayer_3", "Brave One", "Defeat 3 bosses", BossesDefeated, 3, 50, Rare),
    def("boss_slayer_7", "Legendary Hero", "Defeat 7 bosses", BossesDefeated, 7, 100, Epic),
    def("perfect_1", "Perfectionist", "Finish a level without a mistake", PerfectLevels, 1, 30, Rare),
    def("perfect_3", "Sharpshooter", "Finish 3 levels without a mistake", PerfectLevels, 3, 75, Epic),
    def("streak_5", "Warming Up", "Answer 5 in a row correctly", Streak, 5, 15, Common),
    def("streak_10", "Full Firepower", "Answer 10 in a row correctly", Streak, 10, 30, Rare),
    def("streak_20", "Unstoppable", "Answer 20 in a row correctly", Streak, 20, 60, Epic),
    def("score_1000", "Scorer", "Earn 1000 points in total", TotalScore, 1000, 10, Common),
    def("score_5000", "High Scorer", "Earn 5000 points in total", TotalScore, 5000, 25, Rare),
    def("score_10000", "Score King", "Earn 10000 points in total", TotalScore, 10000, 50, Epic),
    def("score_50000", "Legend", "Earn 50000 points in total", TotalScore, 50000, 150, Legendary),
];

pub fn find(id: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|a| a.id == id)
}

/// Aggregate numbers the requirements are measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    /// Words whose *current* status is MASTERED.
    pub words_mastered: u64,
    pub levels_completed: u64,
    pub bosses_defeated: u64,
    pub perfect_levels: u64,
    pub max_streak: u64,
    pub total_score: u64,
}

impl PlayerStats {
    pub fn collect(profile: &UserProfile, words: &WordStates, game: &GameState) -> Self {
        Self {
            words_mastered: words
                .values()
                .filter(|w| w.status == WordStatus::Mastered)
                .count() as u64,
            levels_completed: game.completed_levels.len() as u64,
            bosses_defeated: game.completed_bosses.len() as u64,
            perfect_levels: game.perfect_levels.len() as u64,
            max_streak: u64::from(game.max_streak),
            total_score: profile.total_score,
        }
    }

    fn get(&self, kind: RequirementKind) -> u64 {
        match kind {
            WordsMastered => self.words_mastered,
            LevelsCompleted => self.levels_completed,
            BossesDefeated => self.bosses_defeated,
            PerfectLevels => self.perfect_levels,
            Streak => self.max_streak,
            TotalScore => self.total_score,
        }
    }
}

/// Fraction of the requirement met, in `0.0..=1.0`.
pub fn progress(def: &AchievementDef, stats: &PlayerStats) -> f64 {
    let value = def.requirement.value;
    if value == 0 {
        return 1.0;
    }
    (stats.get(def.requirement.kind) as f64 / value as f64).min(1.0)
}

pub fn is_earned(def: &AchievementDef, stats: &PlayerStats) -> bool {
    stats.get(def.requirement.kind) >= def.requirement.value
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementView {
    #[serde(flatten)]
    pub def: &'static AchievementDef,
    pub progress: f64,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementBoard {
    pub stats: PlayerStats,
    pub total_points: u32,
    pub unlocked_count: usize,
    pub achievements: Vec<AchievementView>,
}

/// Catalog listing for the achievements screen. "Unlocked" means granted on
/// the profile; ids granted by the host outside the catalog are not listed.
pub fn board(profile: &UserProfile, stats: PlayerStats) -> AchievementBoard {
    let achievements: Vec<AchievementView> = CATALOG
        .iter()
        .map(|def| AchievementView {
            def,
            progress: progress(def, &stats),
            unlocked: profile.achievements.contains(def.id),
        })
        .collect();
    let unlocked: Vec<&AchievementView> = achievements.iter().filter(|a| a.unlocked).collect();
    AchievementBoard {
        stats,
        total_points: unlocked.iter().map(|a| a.def.points).sum(),
        unlocked_count: unlocked.len(),
        achievements,
    }
}
