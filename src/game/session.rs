//! In-progress attempts: quiz levels and boss spelling fights.
//!
//! At most one session exists at a time. The controller here only keeps the
//! counters straight; scoring policy lives in `play.rs` and persistence in the
//! engine, which mirrors the session to storage after every change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{BossId, LevelId, StageId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    pub level_id: LevelId,
    /// Fixed when the session starts.
    pub words_in_session: Vec<String>,
    pub current_word_index: usize,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    /// Word ids answered wrongly, in answer order.
    pub mistakes: Vec<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellingSession {
    pub boss_id: BossId,
    pub words_in_session: Vec<String>,
    pub current_word_index: usize,
    pub correct_spellings: u32,
    /// Words given up on after the second miss.
    pub wrong_attempts: u32,
    /// Misses on the current word so far.
    pub attempts_on_word: u32,
    pub boss_health: u32,
    pub boss_max_health: u32,
    /// Word ids spelled right on the first try.
    pub mastered_words: Vec<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Session {
    Quiz(QuizSession),
    Spelling(SpellingSession),
}

impl Session {
    pub fn kind(&self) -> &'static str {
        match self {
            Session::Quiz(_) => "quiz",
            Session::Spelling(_) => "spelling",
        }
    }

    pub fn stage(&self) -> StageId {
        match self {
            Session::Quiz(q) => StageId::Level(q.level_id),
            Session::Spelling(s) => StageId::Boss(s.boss_id),
        }
    }

    pub fn words(&self) -> &[String] {
        match self {
            Session::Quiz(q) => &q.words_in_session,
            Session::Spelling(s) => &s.words_in_session,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Session::Quiz(q) => q.current_word_index,
            Session::Spelling(s) => s.current_word_index,
        }
    }

    /// Word currently being asked, `None` once the list is exhausted.
    pub fn current_word(&self) -> Option<&str> {
        self.words().get(self.index()).map(String::as_str)
    }
}

/// Result of one spelling submission, from the counters' point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellingStep {
    /// Right on the first try.
    FirstTry,
    /// Right after a miss.
    AfterMiss,
    /// Wrong, the player may try again.
    Miss,
    /// Wrong for the second time; the word is given up on.
    GaveUp,
}

#[derive(Debug, Default)]
pub struct SessionController {
    active: Option<Session>,
}

impl SessionController {
    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn guard_absent(&self) -> Result<()> {
        match &self.active {
            Some(session) => Err(Error::Conflict {
                active: session.kind(),
            }),
            None => Ok(()),
        }
    }

    pub fn start_quiz(&mut self, level: LevelId, words: Vec<String>, now: DateTime<Utc>) -> Result<&Session> {
        self.guard_absent()?;
        let session = Session::Quiz(QuizSession {
            level_id: level,
            words_in_session: words,
            current_word_index: 0,
            correct_answers: 0,
            wrong_answers: 0,
            score: 0,
            streak: 0,
            best_streak: 0,
            mistakes: Vec::new(),
            start_time: now,
            end_time: None,
        });
        Ok(&*self.active.insert(session))
    }

    pub fn start_spelling(
        &mut self,
        boss: BossId,
        words: Vec<String>,
        boss_health: u32,
        now: DateTime<Utc>,
    ) -> Result<&Session> {
        self.guard_absent()?;
        let session = Session::Spelling(SpellingSession {
            boss_id: boss,
            words_in_session: words,
            current_word_index: 0,
            correct_spellings: 0,
            wrong_attempts: 0,
            attempts_on_word: 0,
            boss_health,
            boss_max_health: boss_health,
            mastered_words: Vec::new(),
            start_time: now,
            end_time: None,
        });
        Ok(&*self.active.insert(session))
    }

    fn quiz_mut(&mut self) -> Result<&mut QuizSession> {
        match self.active.as_mut() {
            Some(Session::Quiz(q)) => Ok(q),
            Some(Session::Spelling(_)) => Err(Error::WrongSessionKind("quiz")),
            None => Err(Error::NoActiveSession),
        }
    }

    fn spelling_mut(&mut self) -> Result<&mut SpellingSession> {
        match self.active.as_mut() {
            Some(Session::Spelling(s)) => Ok(s),
            Some(Session::Quiz(_)) => Err(Error::WrongSessionKind("spelling")),
            None => Err(Error::NoActiveSession),
        }
    }

    /// Count one quiz answer on the current word.
    pub fn record_quiz_answer(&mut self, correct: bool, points: u32) -> Result<&QuizSession> {
        let quiz = self.quiz_mut()?;
        if correct {
            quiz.correct_answers += 1;
            quiz.score = quiz.score.saturating_add(points);
            quiz.streak += 1;
            quiz.best_streak = quiz.best_streak.max(quiz.streak);
        } else {
            quiz.wrong_answers += 1;
            quiz.streak = 0;
            if let Some(word) = quiz.words_in_session.get(quiz.current_word_index).cloned() {
                quiz.mistakes.push(word);
            }
        }
        Ok(&*quiz)
    }

    pub fn add_quiz_bonus(&mut self, points: u32) -> Result<u32> {
        let quiz = self.quiz_mut()?;
        quiz.score = quiz.score.saturating_add(points);
        Ok(quiz.score)
    }

    /// Count one spelling submission on the current word.
    pub fn record_spelling_attempt(&mut self, correct: bool) -> Result<SpellingStep> {
        let boss = self.spelling_mut()?;
        let step = if correct {
            boss.correct_spellings += 1;
            boss.boss_health = boss.boss_health.saturating_sub(1);
            if boss.attempts_on_word == 0 {
                if let Some(word) = boss.words_in_session.get(boss.current_word_index).cloned() {
                    boss.mastered_words.push(word);
                }
                SpellingStep::FirstTry
            } else {
                SpellingStep::AfterMiss
            }
        } else {
            boss.attempts_on_word += 1;
            if boss.attempts_on_word >= 2 {
                boss.wrong_attempts += 1;
                SpellingStep::GaveUp
            } else {
                SpellingStep::Miss
            }
        };
        Ok(step)
    }

    /// Move to the next word. Returns `false` once the word list is exhausted.
    pub fn advance(&mut self) -> Result<bool> {
        let session = self.active.as_mut().ok_or(Error::NoActiveSession)?;
        let (index, len) = match session {
            Session::Quiz(q) => {
                q.current_word_index += 1;
                (q.current_word_index, q.words_in_session.len())
            }
            Session::Spelling(s) => {
                s.current_word_index += 1;
                s.attempts_on_word = 0;
                (s.current_word_index, s.words_in_session.len())
            }
        };
        Ok(index < len)
    }

    /// Stamp the end time and return to Absent. The only way out of Active.
    pub fn end(&mut self, now: DateTime<Utc>) -> Option<Session> {
        let mut session = self.active.take()?;
        match &mut session {
            Session::Quiz(q) => q.end_time = Some(now),
            Session::Spelling(s) => s.end_time = Some(now),
        }
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-04-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn words(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("w{:03}", i)).collect()
    }

    #[test]
    fn second_start_conflicts_and_keeps_counters() {
        let mut c = SessionController::default();
        c.start_quiz(LevelId::first(), words(3), now()).unwrap();
        c.record_quiz_answer(true, 100).unwrap();
        let err = c
            .start_spelling("list_1_boss".parse().unwrap(), words(5), 5, now())
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { active: "quiz" }));
        let err = c.start_quiz(LevelId::first(), words(1), now()).unwrap_err();
        assert_eq!(err.kind(), "conflict");
        match c.active() {
            Some(Session::Quiz(q)) => {
                assert_eq!(q.correct_answers, 1);
                assert_eq!(q.score, 100);
                assert_eq!(q.words_in_session, words(3));
            }
            other => panic!("unexpected session {:?}", other),
        }
    }

    #[test]
    fn quiz_counters_and_streaks() {
        let mut c = SessionController::default();
        c.start_quiz(LevelId::first(), words(5), now()).unwrap();
        c.record_quiz_answer(true, 100).unwrap();
        c.advance().unwrap();
        c.record_quiz_answer(true, 100).unwrap();
        c.advance().unwrap();
        let q = c.record_quiz_answer(false, 100).unwrap();
        assert_eq!(q.best_streak, 2);
        assert_eq!(q.streak, 0);
        assert_eq!(q.mistakes, vec!["w003".to_string()]);
        assert_eq!(q.score, 200);
    }

    #[test]
    fn advance_reports_exhaustion() {
        let mut c = SessionController::default();
        c.start_quiz(LevelId::first(), words(2), now()).unwrap();
        assert!(c.advance().unwrap());
        assert!(!c.advance().unwrap());
        assert_eq!(c.active().unwrap().current_word(), None);
    }

    #[test]
    fn spelling_steps() {
        let mut c = SessionController::default();
        c.start_spelling("list_1_boss".parse().unwrap(), words(3), 3, now())
            .unwrap();
        assert_eq!(c.record_spelling_attempt(true).unwrap(), SpellingStep::FirstTry);
        c.advance().unwrap();
        assert_eq!(c.record_spelling_attempt(false).unwrap(), SpellingStep::Miss);
        assert_eq!(c.record_spelling_attempt(true).unwrap(), SpellingStep::AfterMiss);
        c.advance().unwrap();
        assert_eq!(c.record_spelling_attempt(false).unwrap(), SpellingStep::Miss);
        assert_eq!(c.record_spelling_attempt(false).unwrap(), SpellingStep::GaveUp);
        match c.active() {
            Some(Session::Spelling(s)) => {
                assert_eq!(s.boss_health, 1);
                assert_eq!(s.correct_spellings, 2);
                assert_eq!(s.wrong_attempts, 1);
                assert_eq!(s.mastered_words, vec!["w001".to_string()]);
            }
            other => panic!("unexpected session {:?}", other),
        }
    }

    #[test]
    fn wrong_kind_and_absent_errors() {
        let mut c = SessionController::default();
        assert!(matches!(c.record_quiz_answer(true, 1), Err(Error::NoActiveSession)));
        assert!(matches!(c.advance(), Err(Error::NoActiveSession)));
        c.start_quiz(LevelId::first(), words(1), now()).unwrap();
        assert!(matches!(
            c.record_spelling_attempt(true),
            Err(Error::WrongSessionKind("spelling"))
        ));
    }

    #[test]
    fn end_stamps_and_clears() {
        let mut c = SessionController::default();
        assert!(c.end(now()).is_none());
        c.start_quiz(LevelId::first(), words(1), now()).unwrap();
        let ended = c.end(now()).unwrap();
        assert!(!c.is_active());
        match ended {
            Session::Quiz(q) => assert_eq!(q.end_time, Some(now())),
            other => panic!("unexpected session {:?}", other),
        }
    }

    #[test]
    fn session_json_carries_discriminant() {
        let mut c = SessionController::default();
        c.start_spelling("list_2_boss".parse().unwrap(), words(2), 2, now())
            .unwrap();
        let json = serde_json::to_value(c.active().unwrap()).unwrap();
        assert_eq!(json["kind"], "spelling");
        assert_eq!(json["bossId"], "list_2_boss");
        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back.stage().to_string(), "list_2_boss");
    }
}
