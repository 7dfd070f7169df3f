//! `/api/settings/*` routes.

use serde_json::json;

use crate::error::Error;
use crate::game::settings::SettingsPatch;
use crate::game::state::{with_engine, with_engine_mut};
use crate::routes::util::{json_body, json_ok, parse_form_body, required, respond};

// ── GET /api/settings ──────────────────────────────────────────────

pub fn handle_settings_get(_query: &str) -> String {
    with_engine(|e| json_ok(e.settings()))
}

// ── POST /api/settings ─────────────────────────────────────────────

/// Body: a JSON object with any subset of the settings fields. Volumes are
/// clamped to 0..=100.
pub fn handle_settings_post(body: &str) -> String {
    respond(json_body::<SettingsPatch>(body).map(|patch| with_engine_mut(|e| e.update_settings(&patch).clone())))
}

// ── POST /api/settings/toggle ──────────────────────────────────────

/// Body: `target=sound|music`.
pub fn handle_toggle_post(body: &str) -> String {
    let params = parse_form_body(body);
    respond(required(&params, "target").and_then(|target| match target {
        "sound" => Ok(with_engine_mut(|e| json!({ "soundOn": e.toggle_sound() }))),
        "music" => Ok(with_engine_mut(|e| json!({ "musicOn": e.toggle_music() }))),
        other => Err(Error::InvalidInput(format!("unknown toggle target {}", other))),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::reset_engine;

    fn parse(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn patch_updates_only_given_fields() {
        reset_engine();
        let v = parse(&handle_settings_post(r#"{"musicVolume":140,"showExample":false}"#));
        assert_eq!(v["musicVolume"], 100);
        assert_eq!(v["showExample"], false);
        assert_eq!(v["soundVolume"], 70);
        assert_eq!(parse(&handle_settings_get(""))["musicVolume"], 100);
    }

    #[test]
    fn invalid_patch_is_rejected() {
        reset_engine();
        let v = parse(&handle_settings_post("soundOn=false"));
        assert_eq!(v["error"]["kind"], "invalid_input");
    }

    #[test]
    fn toggles_flip() {
        reset_engine();
        assert_eq!(parse(&handle_toggle_post("target=sound"))["soundOn"], false);
        assert_eq!(parse(&handle_toggle_post("target=sound"))["soundOn"], true);
        assert_eq!(parse(&handle_toggle_post("target=music"))["musicOn"], false);
        let v = parse(&handle_toggle_post("target=lights"));
        assert_eq!(v["error"]["kind"], "invalid_input");
    }
}
