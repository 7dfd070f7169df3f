//! `/api/data/*` routes: backup export, restore and full reset.

use serde_json::json;

use crate::game::state::{with_engine, with_engine_mut};
use crate::routes::util::{json_ok, respond};

// ── GET /api/data/export ───────────────────────────────────────────

/// The full backup document. The host offers it as a file download.
pub fn handle_export_get(_query: &str) -> String {
    with_engine(|e| json_ok(&e.export_snapshot()))
}

// ── POST /api/data/import ──────────────────────────────────────────

/// Body: a backup document as produced by export. All-or-nothing: on any
/// error the current progress is left untouched.
pub fn handle_import_post(body: &str) -> String {
    with_engine_mut(|e| {
        respond(e.import_snapshot(body).map(|()| json!({ "imported": true, "state": e.view() })))
    })
}

// ── POST /api/data/reset ───────────────────────────────────────────

/// Wipe every record, then start over from defaults.
pub fn handle_reset_post(_body: &str) -> String {
    with_engine_mut(|e| {
        e.reset_all();
        e.initialize();
        json_ok(&json!({ "reset": true, "state": e.view() }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::reset_engine;
    use crate::game::words::WordStatus;

    fn parse(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn export_then_import_restores_progress() {
        reset_engine();
        with_engine_mut(|e| {
            e.set_word_status("w003", WordStatus::Mastered);
            e.adjust_hp(-1);
        });
        let backup = handle_export_get("");
        assert_eq!(parse(&backup)["version"], "1.0.0");

        handle_reset_post("");
        with_engine(|e| assert!(e.word_states().is_empty()));

        let v = parse(&handle_import_post(&backup));
        assert_eq!(v["imported"], true);
        assert_eq!(v["state"]["userProfile"]["currentHP"], 2);
        with_engine(|e| assert_eq!(e.word_status("w003"), WordStatus::Mastered));
    }

    #[test]
    fn incomplete_backup_is_rejected() {
        reset_engine();
        let v = parse(&handle_import_post(r#"{"version":"1.0.0","userProfile":{}}"#));
        assert_eq!(v["error"]["kind"], "validation");
        let v = parse(&handle_import_post("not json"));
        assert_eq!(v["error"]["kind"], "validation");
    }

    #[test]
    fn reset_restores_defaults() {
        reset_engine();
        with_engine_mut(|e| {
            e.adjust_hp(-3);
            e.complete_level("list_1_level_1".parse().unwrap());
        });
        let v = parse(&handle_reset_post(""));
        assert_eq!(v["state"]["userProfile"]["currentHP"], 3);
        assert_eq!(v["state"]["gameState"]["completedLevels"], json!([]));
    }
}
