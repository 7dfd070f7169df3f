//! The progression engine: owner of every aggregate and the only way to change
//! one.
//!
//! Every mutation is write-through. The new aggregate is computed in memory,
//! then the affected record is written before the call returns. A failed write
//! is logged by the storage layer and the in-memory state stays authoritative
//! for the rest of the process.

use serde::Serialize;

use super::achievements::{self, AchievementBoard, PlayerStats};
use super::profile::{Regeneration, UserProfile};
use super::progress::{self, GameState, UnitView, Unlocks};
use super::session::{Session, SessionController};
use super::settings::{Settings, SettingsPatch};
use super::snapshot::{self, SNAPSHOT_VERSION, Snapshot};
use super::words::{self, WordOverview, WordQuery, WordState, WordStates, WordStatus};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::ids::{BossId, LevelId, UnitId};
use crate::storage::{KeyValueStore, RecordKind, Storage};
use crate::vocabulary::Vocabulary;

pub struct Engine<S: KeyValueStore, C: Clock = SystemClock> {
    pub(super) config: EngineConfig,
    pub(super) storage: Storage<S>,
    pub(super) clock: C,
    pub(super) vocabulary: Vocabulary,
    pub(super) profile: UserProfile,
    pub(super) words: WordStates,
    pub(super) game: GameState,
    pub(super) settings: Settings,
    pub(super) sessions: SessionController,
}

/// Read-only view of the hydrated state, as handed to the host.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView<'a> {
    pub user_profile: &'a UserProfile,
    pub game_state: &'a GameState,
    pub settings: &'a Settings,
    pub current_session: Option<&'a Session>,
}

impl<S: KeyValueStore, C: Clock> Engine<S, C> {
    /// An engine holding default aggregates. Nothing is read until
    /// [`initialize`](Self::initialize).
    pub fn new(store: S, clock: C, config: EngineConfig) -> Self {
        let now = clock.now();
        Self {
            storage: Storage::new(store, config.storage_prefix.clone()),
            profile: UserProfile::new(config.max_hp, now),
            words: WordStates::new(),
            game: GameState::default(),
            settings: Settings::default(),
            sessions: SessionController::default(),
            vocabulary: Vocabulary::default(),
            clock,
            config,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut Storage<S> {
        &mut self.storage
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn word_states(&self) -> &WordStates {
        &self.words
    }

    pub fn game_state(&self) -> &GameState {
        &self.game
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> Option<&Session> {
        self.sessions.active()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn view(&self) -> StateView<'_> {
        StateView {
            user_profile: &self.profile,
            game_state: &self.game,
            settings: &self.settings,
            current_session: self.sessions.active(),
        }
    }

    // ── Persistence ────────────────────────────────────────────────

    /// Write one aggregate through to storage. Failures were already logged.
    pub(super) fn commit(&mut self, kind: RecordKind) {
        let written = match kind {
            RecordKind::UserProfile => self.storage.save(kind, &self.profile),
            RecordKind::WordStates => self.storage.save(kind, &self.words),
            RecordKind::GameState => self.storage.save(kind, &self.game),
            RecordKind::Settings => self.storage.save(kind, &self.settings),
            RecordKind::CurrentSession => match self.sessions.active() {
                Some(session) => self.storage.save(kind, session),
                None => {
                    self.storage.remove(kind);
                    Ok(())
                }
            },
        };
        if written.is_err() {
            tracing::warn!(record = kind.key(), "continuing with unsaved in-memory state");
        }
    }

    fn load_or_default<T, F>(&mut self, kind: RecordKind, default: F) -> T
    where
        T: serde::de::DeserializeOwned + Serialize,
        F: FnOnce() -> T,
    {
        match self.storage.load(kind) {
            Some(value) => value,
            None => {
                let value = default();
                // First run (or unreadable record): persist the default right away.
                let _ = self.storage.save(kind, &value);
                value
            }
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Load every aggregate (defaults for absent ones) and run login-refresh.
    ///
    /// A session record left behind by an earlier run is treated as abandoned
    /// and removed. Safe to call repeatedly.
    pub fn initialize(&mut self) -> Regeneration {
        let now = self.clock.now();
        let max_hp = self.config.max_hp;

        let mut profile = self.load_or_default(RecordKind::UserProfile, || UserProfile::new(max_hp, now));
        profile.normalize();
        self.profile = profile;

        self.words = self.load_or_default(RecordKind::WordStates, WordStates::new);

        let mut game: GameState = self.load_or_default(RecordKind::GameState, GameState::default);
        game.normalize();
        self.game = game;

        let mut settings: Settings = self.load_or_default(RecordKind::Settings, Settings::default);
        settings.normalize();
        self.settings = settings;

        if !self.sessions.is_active() {
            if let Some(stale) = self.storage.load::<Session>(RecordKind::CurrentSession) {
                tracing::warn!(stage = %stale.stage(), kind = stale.kind(), "discarding abandoned session");
            }
            self.storage.remove(RecordKind::CurrentSession);
        }

        self.refresh_login()
    }

    /// Hit-point regeneration from the stored last-login instant.
    pub fn refresh_login(&mut self) -> Regeneration {
        let now = self.clock.now();
        let last_date = self.clock.local_date(self.profile.last_login_timestamp);
        let today = self.clock.local_date(now);
        let before = self.profile.current_hp;
        let regen = self
            .profile
            .refresh_login(now, last_date, today, self.config.regen_interval_secs());
        if self.profile.current_hp != before {
            tracing::info!(from = before, to = self.profile.current_hp, ?regen, "hit points regenerated");
        }
        self.commit(RecordKind::UserProfile);
        regen
    }

    /// Wipe every record and the active session. Irreversible.
    pub fn reset_all(&mut self) {
        let now = self.clock.now();
        self.storage.clear();
        self.sessions.end(now);
        self.profile = UserProfile::new(self.config.max_hp, now);
        self.words = WordStates::new();
        self.game = GameState::default();
        self.settings = Settings::default();
        tracing::info!("all progress reset");
    }

    pub fn load_vocabulary(&mut self, vocabulary: Vocabulary) {
        tracing::info!(units = vocabulary.lists.len(), words = vocabulary.len(), "vocabulary loaded");
        self.vocabulary = vocabulary;
    }

    // ── Profile ────────────────────────────────────────────────────

    pub fn adjust_hp(&mut self, delta: i32) -> u32 {
        let hp = self.profile.adjust_hp(delta);
        self.commit(RecordKind::UserProfile);
        hp
    }

    pub fn unlock_achievement(&mut self, id: &str) -> bool {
        let added = self.profile.add_achievement(id);
        if added {
            tracing::info!(achievement = id, "achievement unlocked");
            self.commit(RecordKind::UserProfile);
        }
        added
    }

    pub fn stats(&self) -> PlayerStats {
        PlayerStats::collect(&self.profile, &self.words, &self.game)
    }

    /// Grant every catalog achievement whose requirement is met. Returns the
    /// ids granted by this call.
    pub fn unlock_earned_achievements(&mut self) -> Vec<&'static str> {
        let stats = self.stats();
        let earned: Vec<&'static str> = achievements::CATALOG
            .iter()
            .filter(|def| achievements::is_earned(def, &stats))
            .map(|def| def.id)
            .collect();
        earned
            .into_iter()
            .filter(|id| self.unlock_achievement(id))
            .collect()
    }

    pub fn achievement_board(&self) -> AchievementBoard {
        achievements::board(&self.profile, self.stats())
    }

    // ── Words ──────────────────────────────────────────────────────

    pub fn word_status(&self, word_id: &str) -> WordStatus {
        self.words.get(word_id).map(|w| w.status).unwrap_or_default()
    }

    /// Set a word's status as requested. The lifetime counters move only on
    /// the first departure from NEW and the first arrival at MASTERED.
    pub fn set_word_status(&mut self, word_id: &str, status: WordStatus) -> WordState {
        let now = self.clock.now();
        let state = self.words.entry(word_id.to_string()).or_default();
        let transition = state.set_status(status, now);
        let snapshot = state.clone();
        self.commit(RecordKind::WordStates);

        if transition.first_learned || transition.first_mastered {
            if transition.first_learned {
                self.profile.total_words_learned += 1;
            }
            if transition.first_mastered {
                self.profile.total_words_mastered += 1;
            }
            self.commit(RecordKind::UserProfile);
        }
        snapshot
    }

    pub fn record_error(&mut self, word_id: &str) -> WordState {
        let now = self.clock.now();
        let state = self.words.entry(word_id.to_string()).or_default();
        state.record_error(now);
        let snapshot = state.clone();
        self.commit(RecordKind::WordStates);
        snapshot
    }

    pub fn word_overview(&self, query: &WordQuery) -> WordOverview<'_> {
        words::overview(&self.vocabulary, &self.words, query)
    }

    // ── Progression ────────────────────────────────────────────────

    pub fn unlock_level(&mut self, level: LevelId) -> bool {
        let added = self.game.unlock_level(level);
        if added {
            tracing::info!(%level, "level unlocked");
            self.commit(RecordKind::GameState);
        }
        added
    }

    pub fn unlock_boss(&mut self, boss: BossId) -> bool {
        let added = self.game.unlock_boss(boss);
        if added {
            tracing::info!(%boss, "boss unlocked");
            self.commit(RecordKind::GameState);
        }
        added
    }

    pub fn complete_level(&mut self, level: LevelId) -> Unlocks {
        let unlocks = self.game.complete_level(level);
        tracing::info!(%level, ?unlocks, "level completed");
        self.commit(RecordKind::GameState);
        unlocks
    }

    pub fn complete_boss(&mut self, boss: BossId) -> Unlocks {
        let unlocks = self.game.complete_boss(boss);
        tracing::info!(%boss, ?unlocks, "boss defeated");
        self.commit(RecordKind::GameState);
        unlocks
    }

    pub fn set_current(&mut self, unit: UnitId, level: Option<LevelId>) {
        self.game.set_current(unit, level);
        self.commit(RecordKind::GameState);
    }

    pub fn stage_map(&self) -> Vec<UnitView> {
        progress::stage_map(&self.game, &self.vocabulary)
    }

    // ── Settings ───────────────────────────────────────────────────

    pub fn update_settings(&mut self, patch: &SettingsPatch) -> &Settings {
        self.settings.apply(patch);
        self.commit(RecordKind::Settings);
        &self.settings
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.settings.sound_on = !self.settings.sound_on;
        self.commit(RecordKind::Settings);
        self.settings.sound_on
    }

    pub fn toggle_music(&mut self) -> bool {
        self.settings.music_on = !self.settings.music_on;
        self.commit(RecordKind::Settings);
        self.settings.music_on
    }

    // ── Sessions (raw controller access, mirrored to storage) ──────

    pub fn start_quiz(&mut self, level: LevelId, words: Vec<String>) -> Result<&Session> {
        let now = self.clock.now();
        self.sessions.start_quiz(level, words, now)?;
        tracing::info!(%level, "quiz session started");
        self.commit(RecordKind::CurrentSession);
        self.sessions.active().ok_or(Error::NoActiveSession)
    }

    pub fn start_spelling(&mut self, boss: BossId, words: Vec<String>, boss_health: u32) -> Result<&Session> {
        let now = self.clock.now();
        self.sessions.start_spelling(boss, words, boss_health, now)?;
        tracing::info!(%boss, "spelling session started");
        self.commit(RecordKind::CurrentSession);
        self.sessions.active().ok_or(Error::NoActiveSession)
    }

    /// End the active attempt, if any, and drop its persisted mirror.
    pub fn end_session(&mut self) -> Option<Session> {
        let ended = self.sessions.end(self.clock.now());
        if let Some(session) = &ended {
            tracing::info!(stage = %session.stage(), kind = session.kind(), "session ended");
        }
        self.storage.remove(RecordKind::CurrentSession);
        ended
    }

    // ── Backup ─────────────────────────────────────────────────────

    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            export_timestamp: self.clock.now(),
            user_profile: self.profile.clone(),
            word_states: self.words.clone(),
            game_state: self.game.clone(),
            settings: self.settings.clone(),
            current_session: self.sessions.active().cloned(),
        }
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_snapshot())?)
    }

    /// Replace all four aggregates from a backup.
    ///
    /// The document is fully validated before anything changes. Records are
    /// then written one by one; if a write fails, the records already written
    /// are restored from their previous contents and nothing in memory
    /// changes. A successful import ends any active attempt.
    pub fn import_snapshot(&mut self, json: &str) -> Result<()> {
        let snap = snapshot::parse(json, self.clock.now())?;

        let staged: [(RecordKind, String); 4] = [
            (RecordKind::UserProfile, serde_json::to_string(&snap.user_profile)?),
            (RecordKind::WordStates, serde_json::to_string(&snap.word_states)?),
            (RecordKind::GameState, serde_json::to_string(&snap.game_state)?),
            (RecordKind::Settings, serde_json::to_string(&snap.settings)?),
        ];
        let previous: Vec<(RecordKind, Option<String>)> = staged
            .iter()
            .map(|(kind, _)| (*kind, self.storage.load_raw(*kind)))
            .collect();

        for (i, (kind, json)) in staged.iter().enumerate() {
            if let Err(err) = self.storage.save_raw(*kind, json) {
                tracing::warn!(record = kind.key(), "import failed, rolling back");
                for (kind, old) in &previous[..i] {
                    match old {
                        Some(raw) => {
                            let _ = self.storage.save_raw(*kind, raw);
                        }
                        None => self.storage.remove(*kind),
                    }
                }
                return Err(err);
            }
        }

        self.end_session();
        self.profile = snap.user_profile;
        self.words = snap.word_states;
        self.game = snap.game_state;
        self.settings = snap.settings;
        tracing::info!(version = %snap.version, "snapshot imported");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::{DateTime, Duration, FixedOffset, Utc};

    pub(crate) type TestEngine = Engine<MemoryStore, FixedClock>;

    pub(crate) fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-10T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    pub(crate) fn engine() -> TestEngine {
        let mut e = Engine::new(MemoryStore::new(), FixedClock::utc(start()), EngineConfig::default());
        e.initialize();
        e
    }

    fn level(s: &str) -> LevelId {
        s.parse().unwrap()
    }

    /// Re-open the same store as a fresh process would.
    fn reopen(e: &TestEngine) -> TestEngine {
        let store = e.storage().store().clone();
        let clock = FixedClock::utc(e.clock().now());
        let mut fresh = Engine::new(store, clock, EngineConfig::default());
        fresh.initialize();
        fresh
    }

    #[test]
    fn first_run_writes_defaults() {
        let e = engine();
        assert_eq!(e.profile().current_hp, 3);
        assert_eq!(e.profile().max_hp, 3);
        for key in ["userProfile", "wordStates", "gameState", "settings"] {
            assert!(
                e.storage().store().get(&format!("wordContra_{}", key)).is_some(),
                "{key} not written"
            );
        }
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut e = engine();
        e.adjust_hp(-1);
        e.set_word_status("w001", WordStatus::Learning);
        let before = (e.profile().clone(), e.word_states().clone(), e.game_state().clone());
        e.initialize();
        e.initialize();
        assert_eq!(before, (e.profile().clone(), e.word_states().clone(), e.game_state().clone()));
    }

    #[test]
    fn hp_stays_in_bounds_and_persists() {
        let mut e = engine();
        for delta in [-1, -1, -1, -1, 2, 7, -10, 1] {
            let hp = e.adjust_hp(delta);
            assert!(hp <= e.profile().max_hp);
        }
        assert_eq!(e.profile().current_hp, 1);
        assert_eq!(reopen(&e).profile().current_hp, 1);
    }

    #[test]
    fn regeneration_accrues_while_closed() {
        let mut e = engine();
        e.adjust_hp(-2);
        let later = FixedClock::utc(start() + Duration::hours(13));
        let mut next = Engine::new(e.storage().store().clone(), later, EngineConfig::default());
        let regen = next.initialize();
        assert_eq!(regen, Regeneration::Intervals { intervals: 2 });
        assert_eq!(next.profile().current_hp, 3);
    }

    #[test]
    fn new_local_day_restores_full_hp() {
        let mut e = engine();
        e.adjust_hp(-3);
        // 08:00Z is 17:00 in UTC+9; eight hours later is past local midnight.
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let clock = FixedClock::new(start() + Duration::hours(8), tokyo);
        let mut next = Engine::new(e.storage().store().clone(), clock, EngineConfig::default());
        assert_eq!(next.initialize(), Regeneration::NewDay);
        assert_eq!(next.profile().current_hp, 3);
    }

    #[test]
    fn counters_count_first_transitions_only() {
        let mut e = engine();
        e.set_word_status("w001", WordStatus::Learning);
        e.set_word_status("w001", WordStatus::Mastered);
        for _ in 0..4 {
            e.set_word_status("w001", WordStatus::Mastered);
        }
        e.set_word_status("w001", WordStatus::Learning);
        assert_eq!(e.profile().total_words_learned, 1);
        assert_eq!(e.profile().total_words_mastered, 1);
        assert!(e.word_states()["w001"].mastered_at.is_some());
    }

    #[test]
    fn record_error_creates_state_lazily() {
        let mut e = engine();
        assert_eq!(e.word_status("w009"), WordStatus::New);
        let s = e.record_error("w009");
        assert_eq!(s.error_count, 1);
        assert_eq!(s.status, WordStatus::New);
        assert_eq!(e.profile().total_words_learned, 0);
    }

    #[test]
    fn completion_rules_through_the_engine() {
        let mut e = engine();
        e.complete_level(level("list_2_level_3"));
        assert!(e.game_state().unlocked_levels.contains(&level("list_2_level_4")));
        assert!(e.game_state().unlocked_bosses.is_empty());
        e.complete_level(level("list_2_level_5"));
        assert!(e.game_state().is_boss_unlocked("list_2_boss".parse().unwrap()));
        e.complete_boss("list_2_boss".parse().unwrap());
        assert!(e.game_state().is_level_unlocked(level("list_3_level_1")));
        let reopened = reopen(&e);
        assert_eq!(reopened.game_state(), e.game_state());
    }

    #[test]
    fn unlocks_and_achievements_are_idempotent() {
        let mut e = engine();
        assert!(e.unlock_level(level("list_1_level_2")));
        assert!(!e.unlock_level(level("list_1_level_2")));
        assert!(e.unlock_boss("list_1_boss".parse().unwrap()));
        assert!(!e.unlock_boss("list_1_boss".parse().unwrap()));
        assert!(e.unlock_achievement("first_blood"));
        assert!(!e.unlock_achievement("first_blood"));
    }

    #[test]
    fn earned_achievements_are_granted_once() {
        let mut e = engine();
        e.complete_level(LevelId::first());
        assert_eq!(e.unlock_earned_achievements(), vec!["level_starter"]);
        assert!(e.unlock_earned_achievements().is_empty());
        assert_eq!(e.achievement_board().total_points, 10);
    }

    #[test]
    fn settings_updates_persist() {
        let mut e = engine();
        assert!(!e.toggle_sound());
        assert!(!e.toggle_music());
        e.update_settings(&SettingsPatch {
            sound_volume: Some(101),
            ..SettingsPatch::default()
        });
        let reopened = reopen(&e);
        assert!(!reopened.settings().sound_on);
        assert_eq!(reopened.settings().sound_volume, 100);
    }

    #[test]
    fn reset_then_initialize_gives_defaults() {
        let mut e = engine();
        e.adjust_hp(-2);
        e.set_word_status("w001", WordStatus::Mastered);
        e.complete_level(LevelId::first());
        e.start_quiz(level("list_1_level_2"), vec!["w001".into()]).unwrap();
        e.reset_all();
        assert!(e.storage().store().is_empty());
        e.initialize();
        assert_eq!(e.profile().current_hp, 3);
        assert_eq!(e.profile().max_hp, 3);
        assert_eq!(e.profile().total_words_mastered, 0);
        assert!(e.word_states().is_empty());
        assert_eq!(e.game_state(), &GameState::default());
        assert!(e.session().is_none());
    }

    #[test]
    fn session_is_mirrored_and_removed() {
        let mut e = engine();
        e.start_quiz(LevelId::first(), vec!["w001".into(), "w002".into()]).unwrap();
        assert!(e.storage().store().get("wordContra_currentSession").is_some());
        let err = e.start_spelling("list_1_boss".parse().unwrap(), vec![], 0).unwrap_err();
        assert_eq!(err.kind(), "conflict");
        assert!(e.end_session().is_some());
        assert!(e.storage().store().get("wordContra_currentSession").is_none());
    }

    #[test]
    fn leftover_session_is_discarded_on_startup() {
        let mut e = engine();
        e.start_quiz(LevelId::first(), vec!["w001".into()]).unwrap();
        let reopened = reopen(&e);
        assert!(reopened.session().is_none());
        assert!(reopened.storage().store().get("wordContra_currentSession").is_none());
    }

    #[test]
    fn corrupted_record_falls_back_to_default() {
        let mut e = engine();
        e.complete_level(LevelId::first());
        e.storage_mut()
            .store_mut()
            .set("wordContra_gameState", "{\"unlockedLevels\":")
            .unwrap();
        let reopened = reopen(&e);
        assert_eq!(reopened.game_state(), &GameState::default());
    }

    #[test]
    fn failed_writes_keep_memory_state() {
        let mut e = engine();
        e.storage_mut().store_mut().fail_writes = true;
        assert_eq!(e.adjust_hp(-1), 2);
        assert_eq!(e.profile().current_hp, 2);
    }

    #[test]
    fn export_import_round_trip() {
        let mut e = engine();
        e.adjust_hp(-1);
        e.set_word_status("w001", WordStatus::Mastered);
        e.record_error("w002");
        e.complete_level(LevelId::first());
        e.unlock_achievement("level_starter");
        e.toggle_music();
        let json = e.export_json().unwrap();

        let mut fresh = Engine::new(MemoryStore::new(), FixedClock::utc(start()), EngineConfig::default());
        fresh.initialize();
        fresh.import_snapshot(&json).unwrap();
        assert_eq!(fresh.profile(), e.profile());
        assert_eq!(fresh.word_states(), e.word_states());
        assert_eq!(fresh.game_state(), e.game_state());
        assert_eq!(fresh.settings(), e.settings());
        assert_eq!(reopen(&fresh).word_states(), e.word_states());
    }

    #[test]
    fn invalid_import_changes_nothing() {
        let mut e = engine();
        e.adjust_hp(-1);
        let before = e.storage().store().clone();
        let err = e
            .import_snapshot(r#"{"version":"1","userProfile":null,"wordStates":{}}"#)
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(e.profile().current_hp, 2);
        assert_eq!(
            e.storage().store().get("wordContra_userProfile"),
            before.get("wordContra_userProfile")
        );
    }

    #[test]
    fn import_ends_active_session() {
        let mut e = engine();
        let json = e.export_json().unwrap();
        e.start_quiz(LevelId::first(), vec!["w001".into()]).unwrap();
        e.import_snapshot(&json).unwrap();
        assert!(e.session().is_none());
    }

    /// A store that refuses writes to one key.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        refuse: Option<String>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
            if self.refuse.as_deref() == Some(key) {
                return Err("quota exceeded".into());
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) {
            self.inner.remove(key)
        }
    }

    #[test]
    fn import_rolls_back_on_partial_write() {
        let mut source = engine();
        source.adjust_hp(-2);
        source.set_word_status("w001", WordStatus::Learning);
        source.toggle_sound();
        let json = source.export_json().unwrap();

        let mut e = Engine::new(FlakyStore::default(), FixedClock::utc(start()), EngineConfig::default());
        e.initialize();
        let profile_before = e.storage().load_raw(RecordKind::UserProfile);
        let words_before = e.storage().load_raw(RecordKind::WordStates);
        e.storage_mut().store_mut().refuse = Some("wordContra_gameState".to_string());

        let err = e.import_snapshot(&json).unwrap_err();
        assert_eq!(err.kind(), "storage");
        assert_eq!(e.profile().current_hp, 3);
        assert!(e.settings().sound_on);
        assert!(e.word_states().is_empty());
        assert_eq!(e.storage().load_raw(RecordKind::UserProfile), profile_before);
        assert_eq!(e.storage().load_raw(RecordKind::WordStates), words_before);
    }
}
