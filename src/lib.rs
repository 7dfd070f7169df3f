//! Word Contra in-browser game engine.
//!
//! The page calls `handle_request(method, path, query, body)`; paths are
//! resolved with a `matchit` radix router. Every route answers with JSON and
//! failures use the envelope `{"error":{"kind":..,"message":..}}`.
//!
//! The engine itself (`game::engine::Engine`) is an ordinary value generic
//! over its key-value store and clock, so it can be driven directly from
//! native code and tests.

use wasm_bindgen::prelude::*;

pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod ids;
pub mod logging;
pub mod routes;
pub mod storage;
pub mod vocabulary;

pub use error::{Error, Result};

/// Install the panic hook and the console log subscriber. Call once when
/// the module is loaded; later calls change nothing.
#[wasm_bindgen]
pub fn boot() {
    console_error_panic_hook::set_once();
    if logging::init(tracing_subscriber::filter::LevelFilter::INFO) {
        tracing::info!("console logging installed");
    }
}

/// Rebuild the engine from a JSON config (any subset of `EngineConfig`
/// fields). Returns the JSON error envelope on a malformed config, an empty
/// string otherwise.
#[wasm_bindgen]
pub fn configure(config_json: &str) -> String {
    match config::EngineConfig::from_json(config_json) {
        Ok(config) => {
            game::state::configure(config);
            String::new()
        }
        Err(err) => routes::util::json_error(&err),
    }
}

/// Process an HTTP-like request and return a JSON string.
///
/// # Arguments
/// * `method` - HTTP method ("GET" or "POST")
/// * `path`   - URL path (e.g., "/api/session/answer")
/// * `query`  - Query string (e.g., "?unit=2&filter=errors")
/// * `body`   - Request body: form data or JSON depending on the route.
///   Empty string for GET requests.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    let mut router = matchit::Router::new();

    router.insert("/api/state", "state").ok();
    router.insert("/api/init", "init").ok();

    router.insert("/api/profile", "profile").ok();
    router.insert("/api/profile/hp", "profile_hp").ok();
    router.insert("/api/profile/refresh", "profile_refresh").ok();
    router.insert("/api/achievements", "achievements").ok();
    router.insert("/api/achievements/unlock", "achievements_unlock").ok();

    router.insert("/api/words", "words").ok();
    router.insert("/api/words/status", "words_status").ok();
    router.insert("/api/words/error", "words_error").ok();

    router.insert("/api/progress", "progress").ok();
    router.insert("/api/progress/unlock", "progress_unlock").ok();
    router.insert("/api/progress/complete", "progress_complete").ok();
    router.insert("/api/progress/current", "progress_current").ok();

    router.insert("/api/session", "session").ok();
    router.insert("/api/session/start", "session_start").ok();
    router.insert("/api/session/question", "session_question").ok();
    router.insert("/api/session/answer", "session_answer").ok();
    router.insert("/api/session/end", "session_end").ok();

    router.insert("/api/settings", "settings").ok();
    router.insert("/api/settings/toggle", "settings_toggle").ok();

    router.insert("/api/data/export", "data_export").ok();
    router.insert("/api/data/import", "data_import").ok();
    router.insert("/api/data/reset", "data_reset").ok();

    router.insert("/api/vocabulary", "vocabulary").ok();

    tracing::trace!(method, path, "request");

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("state", "GET") => routes::profile::handle_state_get(query),
            ("init", "POST") => routes::profile::handle_init_post(body),

            ("profile", "GET") => routes::profile::handle_profile_get(query),
            ("profile_hp", "POST") => routes::profile::handle_hp_post(body),
            ("profile_refresh", "POST") => routes::profile::handle_refresh_post(body),
            ("achievements", "GET") => routes::profile::handle_achievements_get(query),
            ("achievements_unlock", "POST") => routes::profile::handle_achievement_unlock_post(body),

            ("words", "GET") => routes::words::handle_words_get(query),
            ("words_status", "POST") => routes::words::handle_status_post(body),
            ("words_error", "POST") => routes::words::handle_error_post(body),

            ("progress", "GET") => routes::progress::handle_progress_get(query),
            ("progress_unlock", "POST") => routes::progress::handle_unlock_post(body),
            ("progress_complete", "POST") => routes::progress::handle_complete_post(body),
            ("progress_current", "POST") => routes::progress::handle_current_post(body),

            ("session", "GET") => routes::session::handle_session_get(query),
            ("session_start", "POST") => routes::session::handle_start_post(body),
            ("session_question", "GET") => routes::session::handle_question_get(query),
            ("session_answer", "POST") => routes::session::handle_answer_post(body),
            ("session_end", "POST") => routes::session::handle_end_post(body),

            ("settings", "GET") => routes::settings::handle_settings_get(query),
            ("settings", "POST") => routes::settings::handle_settings_post(body),
            ("settings_toggle", "POST") => routes::settings::handle_toggle_post(body),

            ("data_export", "GET") => routes::data::handle_export_get(query),
            ("data_import", "POST") => routes::data::handle_import_post(body),
            ("data_reset", "POST") => routes::data::handle_reset_post(body),

            ("vocabulary", "GET") => routes::vocabulary::handle_vocabulary_get(query),
            ("vocabulary", "POST") => routes::vocabulary::handle_vocabulary_post(body),

            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

fn not_found() -> String {
    routes::util::error_body("not_found", "404 route not found")
}

fn method_not_allowed() -> String {
    routes::util::error_body("method_not_allowed", "405 method not allowed")
}
