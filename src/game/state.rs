//! Process-wide engine container.
//!
//! Uses `thread_local!` + `RefCell` for mutable access in single-threaded
//! WASM. The page keeps the module alive, so the engine persists across
//! `handle_request` calls. It is built and initialized on first use.

use std::cell::RefCell;

use super::engine::Engine;
use crate::clock::SystemClock;
use crate::config::EngineConfig;
use crate::storage::PlatformStore;

pub type HostEngine = Engine<PlatformStore, SystemClock>;

fn build(config: EngineConfig) -> HostEngine {
    let mut engine = Engine::new(PlatformStore::default(), SystemClock, config);
    engine.initialize();
    engine
}

thread_local! {
    static ENGINE: RefCell<HostEngine> = RefCell::new(build(EngineConfig::default()));
}

/// Execute a closure with read access to the engine.
pub fn with_engine<F, R>(f: F) -> R
where
    F: FnOnce(&HostEngine) -> R,
{
    ENGINE.with(|e| f(&e.borrow()))
}

/// Execute a closure with mutable access to the engine.
pub fn with_engine_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut HostEngine) -> R,
{
    ENGINE.with(|e| f(&mut e.borrow_mut()))
}

/// Replace the engine. The vocabulary of the old engine is carried over.
pub fn replace_engine(mut engine: HostEngine) {
    ENGINE.with(|e| {
        let mut current = e.borrow_mut();
        if engine.vocabulary().is_empty() {
            engine.load_vocabulary(current.vocabulary().clone());
        }
        *current = engine;
    });
}

/// Rebuild the engine with new configuration and re-run startup.
pub fn configure(config: EngineConfig) {
    tracing::info!(?config, "engine reconfigured");
    replace_engine(build(config));
}

/// Fresh engine over an empty store. Native builds only (tests, tools).
#[cfg(not(target_arch = "wasm32"))]
pub fn reset_engine() {
    ENGINE.with(|e| *e.borrow_mut() = build(EngineConfig::default()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::words::WordStatus;
    use crate::storage::KeyValueStore;
    use crate::vocabulary::test_vocabulary;

    #[test]
    fn engine_is_initialized_on_first_use() {
        reset_engine();
        with_engine(|e| {
            assert_eq!(e.profile().current_hp, 3);
            assert!(e.storage().store().get("wordContra_userProfile").is_some());
        });
    }

    #[test]
    fn mutations_persist_across_calls() {
        reset_engine();
        with_engine_mut(|e| e.set_word_status("w001", WordStatus::Learning));
        assert_eq!(with_engine(|e| e.word_status("w001")), WordStatus::Learning);
        reset_engine();
    }

    #[test]
    fn configure_keeps_vocabulary() {
        reset_engine();
        with_engine_mut(|e| e.load_vocabulary(test_vocabulary(1, 3)));
        configure(EngineConfig {
            max_hp: 5,
            ..EngineConfig::default()
        });
        with_engine(|e| {
            assert_eq!(e.profile().max_hp, 5);
            assert_eq!(e.vocabulary().len(), 3);
        });
        reset_engine();
    }
}
