//! Running an attempt: entering a stage, asking, scoring, finishing.
//!
//! These are the scoring rules of the quiz and the boss fight, expressed on
//! top of the engine's primitive operations. Every step leaves the engine's
//! aggregates and the mirrored session record in a consistent state.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::engine::Engine;
use super::progress::Unlocks;
use super::session::{Session, SpellingStep};
use super::words::WordStatus;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::ids::{BossId, LevelId};
use crate::storage::{KeyValueStore, RecordKind};
use crate::vocabulary::Word;

/// A quiz question: the word and its shuffled meaning options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub word_id: String,
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub options: Vec<String>,
    pub index: usize,
    pub total: usize,
}

/// The boss fight's prompt: spell the word for this meaning.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellingPrompt {
    pub word_id: String,
    pub meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    pub length: usize,
    /// Present after the first miss on this word.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub index: usize,
    pub total: usize,
    pub boss_health: u32,
    pub boss_max_health: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub stage: String,
    pub kind: &'static str,
    pub victory: bool,
    pub correct: u32,
    pub wrong: u32,
    pub score: u32,
    pub best_streak: u32,
    /// Quiz: words answered wrongly. Boss: unused.
    pub mistakes: Vec<String>,
    /// Boss: words spelled right on the first try. Quiz: unused.
    pub mastered: Vec<String>,
    pub unlocked: Unlocks,
    pub achievements: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "next", rename_all = "snake_case")]
pub enum Next {
    Continue,
    Retry { hint: String },
    Victory { summary: AttemptSummary },
    Defeat { summary: AttemptSummary },
}

/// What one answer did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub correct: bool,
    /// The right answer: the meaning for a quiz, the spelling for a boss.
    pub expected: String,
    pub hp: u32,
    #[serde(flatten)]
    pub next: Next,
}

/// First and last letters with underscores between, space separated.
/// `"apple"` gives `"a _ _ _ e"`.
pub fn spelling_hint(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let last = chars.len().saturating_sub(1);
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i == 0 || i == last { *c } else { '_' })
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

impl<S: KeyValueStore, C: Clock> Engine<S, C> {
    fn check_can_enter(&self) -> Result<()> {
        if let Some(active) = self.session() {
            return Err(Error::Conflict { active: active.kind() });
        }
        if self.profile.is_out_of_hp() {
            return Err(Error::OutOfHitPoints);
        }
        Ok(())
    }

    /// Start a quiz on an unlocked level with a random draw of the unit's words.
    pub fn enter_level<R: Rng + ?Sized>(&mut self, level: LevelId, rng: &mut R) -> Result<&Session> {
        if !self.game.is_level_unlocked(level) {
            return Err(Error::Locked(level.to_string()));
        }
        self.check_can_enter()?;
        let words = self
            .vocabulary
            .sample_unit(level.unit, self.config.quiz_word_count, rng);
        if words.is_empty() {
            return Err(Error::NotFound(format!("no words for {}", level.unit)));
        }
        self.start_quiz(level, words)?;
        self.set_current(level.unit, Some(level));
        self.session().ok_or(Error::NoActiveSession)
    }

    /// Start a boss fight. The boss has one health point per drawn word, up to
    /// the configured cap.
    pub fn enter_boss<R: Rng + ?Sized>(&mut self, boss: BossId, rng: &mut R) -> Result<&Session> {
        if !self.game.is_boss_unlocked(boss) {
            return Err(Error::Locked(boss.to_string()));
        }
        self.check_can_enter()?;
        let words = self
            .vocabulary
            .sample_unit(boss.unit, self.config.boss_word_count, rng);
        if words.is_empty() {
            return Err(Error::NotFound(format!("no words for {}", boss.unit)));
        }
        let health = self.config.boss_max_health.min(words.len() as u32);
        self.start_spelling(boss, words, health)?;
        // Keep the level pointer only while it points into the boss's unit.
        let level = self.game.current_level_id.filter(|l| l.unit == boss.unit);
        self.set_current(boss.unit, level);
        self.session().ok_or(Error::NoActiveSession)
    }

    /// Leave the active attempt without scoring it.
    pub fn abandon_session(&mut self) -> Option<Session> {
        let abandoned = self.end_session();
        if abandoned.is_some() {
            tracing::info!("attempt abandoned");
        }
        abandoned
    }

    fn current_word(&self, kind: &'static str) -> Result<&Word> {
        let session = self.session().ok_or(Error::NoActiveSession)?;
        if session.kind() != kind {
            return Err(Error::WrongSessionKind(kind));
        }
        let id = session.current_word().ok_or(Error::NoActiveSession)?;
        self.vocabulary
            .word(id)
            .ok_or_else(|| Error::NotFound(format!("word {}", id)))
    }

    pub fn current_question<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Question> {
        let word = self.current_word("quiz")?;
        let mut options = self
            .vocabulary
            .distractors(word, self.config.distractor_count, rng);
        options.push(word.meaning.clone());
        options.shuffle(rng);
        let session = self.session().ok_or(Error::NoActiveSession)?;
        Ok(Question {
            word_id: word.id.clone(),
            word: word.word.clone(),
            phonetic: word.phonetic.clone(),
            example: word.example.clone(),
            options,
            index: session.index(),
            total: session.words().len(),
        })
    }

    pub fn current_challenge(&self) -> Result<SpellingPrompt> {
        let word = self.current_word("spelling")?;
        let Some(Session::Spelling(boss)) = self.session() else {
            return Err(Error::WrongSessionKind("spelling"));
        };
        Ok(SpellingPrompt {
            word_id: word.id.clone(),
            meaning: word.meaning.clone(),
            phonetic: word.phonetic.clone(),
            length: word.word.chars().count(),
            hint: (boss.attempts_on_word > 0).then(|| spelling_hint(&word.word)),
            index: boss.current_word_index,
            total: boss.words_in_session.len(),
            boss_health: boss.boss_health,
            boss_max_health: boss.boss_max_health,
        })
    }

    /// Promote to LEARNING, never demoting a mastered word.
    fn mark_learning(&mut self, word_id: &str) {
        if self.word_status(word_id) != WordStatus::Mastered {
            self.set_word_status(word_id, WordStatus::Learning);
        }
    }

    /// Answer the current quiz question with the chosen meaning.
    pub fn answer_quiz(&mut self, choice: &str) -> Result<Outcome> {
        let word = self.current_word("quiz")?;
        let word_id = word.id.clone();
        let expected = word.meaning.clone();
        let correct = choice.trim() == expected;

        self.sessions
            .record_quiz_answer(correct, self.config.points_per_correct)?;
        if correct {
            self.mark_learning(&word_id);
        } else {
            self.adjust_hp(-1);
            self.record_error(&word_id);
        }

        let next = if !correct && self.profile.is_out_of_hp() {
            Next::Defeat {
                summary: self.finish(false)?,
            }
        } else if self.sessions.advance()? {
            self.commit(RecordKind::CurrentSession);
            Next::Continue
        } else {
            Next::Victory {
                summary: self.finish(true)?,
            }
        };
        Ok(Outcome {
            correct,
            expected,
            hp: self.profile.current_hp,
            next,
        })
    }

    /// Submit a spelling for the current boss word. Case and surrounding
    /// whitespace are ignored.
    pub fn submit_spelling(&mut self, input: &str) -> Result<Outcome> {
        let word = self.current_word("spelling")?;
        let word_id = word.id.clone();
        let expected = word.word.clone();
        let correct = input.trim().to_lowercase() == expected.to_lowercase();

        let step = self.sessions.record_spelling_attempt(correct)?;
        match step {
            SpellingStep::FirstTry => {
                self.set_word_status(&word_id, WordStatus::Mastered);
            }
            SpellingStep::AfterMiss => self.mark_learning(&word_id),
            SpellingStep::Miss => {
                self.record_error(&word_id);
            }
            SpellingStep::GaveUp => {
                self.record_error(&word_id);
                self.adjust_hp(-1);
            }
        }

        let next = match step {
            SpellingStep::Miss => {
                self.commit(RecordKind::CurrentSession);
                Next::Retry {
                    hint: spelling_hint(&expected),
                }
            }
            SpellingStep::GaveUp if self.profile.is_out_of_hp() => Next::Defeat {
                summary: self.finish(false)?,
            },
            _ if self.boss_defeated() => Next::Victory {
                summary: self.finish(true)?,
            },
            _ => {
                if self.sessions.advance()? {
                    self.commit(RecordKind::CurrentSession);
                    Next::Continue
                } else {
                    Next::Victory {
                        summary: self.finish(true)?,
                    }
                }
            }
        };
        Ok(Outcome {
            correct,
            expected,
            hp: self.profile.current_hp,
            next,
        })
    }

    fn boss_defeated(&self) -> bool {
        matches!(self.session(), Some(Session::Spelling(s)) if s.boss_health == 0)
    }

    /// Close the active attempt: apply its rewards on victory, fold its
    /// streak, grant earned achievements, and end the session.
    fn finish(&mut self, victory: bool) -> Result<AttemptSummary> {
        if victory {
            if let Some(Session::Quiz(_)) = self.session() {
                let bonus = self.profile.current_hp * self.config.hp_bonus_points;
                self.sessions.add_quiz_bonus(bonus)?;
            }
        }
        let session = self.end_session().ok_or(Error::NoActiveSession)?;

        let mut unlocked = Unlocks::default();
        let summary = match session {
            Session::Quiz(q) => {
                if victory {
                    unlocked = self.complete_level(q.level_id);
                    if q.wrong_answers == 0 {
                        self.game.perfect_levels.insert(q.level_id);
                    }
                    self.profile.total_score += u64::from(q.score);
                    self.commit(RecordKind::UserProfile);
                }
                self.game.max_streak = self.game.max_streak.max(q.best_streak);
                self.commit(RecordKind::GameState);
                AttemptSummary {
                    stage: q.level_id.to_string(),
                    kind: "quiz",
                    victory,
                    correct: q.correct_answers,
                    wrong: q.wrong_answers,
                    score: q.score,
                    best_streak: q.best_streak,
                    mistakes: q.mistakes,
                    mastered: Vec::new(),
                    unlocked: Unlocks::default(),
                    achievements: Vec::new(),
                }
            }
            Session::Spelling(s) => {
                if victory {
                    unlocked = self.complete_boss(s.boss_id);
                }
                AttemptSummary {
                    stage: s.boss_id.to_string(),
                    kind: "spelling",
                    victory,
                    correct: s.correct_spellings,
                    wrong: s.wrong_attempts,
                    score: 0,
                    best_streak: 0,
                    mistakes: Vec::new(),
                    mastered: s.mastered_words,
                    unlocked: Unlocks::default(),
                    achievements: Vec::new(),
                }
            }
        };
        let achievements = self.unlock_earned_achievements();
        tracing::info!(stage = %summary.stage, victory, score = summary.score, "attempt finished");
        Ok(AttemptSummary {
            unlocked,
            achievements,
            ..summary
        })
    }
}
