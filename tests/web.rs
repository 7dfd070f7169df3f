//! Browser tests against the real `localStorage`. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;
use word_contra_core::clock::SystemClock;
use word_contra_core::config::EngineConfig;
use word_contra_core::game::engine::Engine;
use word_contra_core::game::words::WordStatus;
use word_contra_core::handle_request;
use word_contra_core::storage::{KeyValueStore, LocalStorage};

wasm_bindgen_test_configure!(run_in_browser);

fn config() -> EngineConfig {
    EngineConfig {
        storage_prefix: "wordContraTest_".to_string(),
        ..EngineConfig::default()
    }
}

#[wasm_bindgen_test]
fn records_survive_a_new_engine() {
    let mut first = Engine::new(LocalStorage, SystemClock, config());
    first.reset_all();
    first.initialize();
    first.set_word_status("w042", WordStatus::Mastered);

    let mut second = Engine::new(LocalStorage, SystemClock, config());
    second.initialize();
    assert_eq!(second.word_status("w042"), WordStatus::Mastered);
    assert_eq!(second.profile().total_words_mastered, 1);
    second.reset_all();
    assert!(LocalStorage.get("wordContraTest_wordStates").is_none());
}

#[wasm_bindgen_test]
fn bridge_answers_json() {
    let out = handle_request("GET", "/api/state", "", "");
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(v["userProfile"]["currentHP"].is_number());
}

#[wasm_bindgen_test]
fn boot_can_run_twice() {
    word_contra_core::boot();
    word_contra_core::boot();
    tracing::warn!("console logging reaches the browser");
}
