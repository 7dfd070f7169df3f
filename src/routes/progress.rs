//! `/api/progress/*` routes: unlocks, completions and the stage map.

use serde_json::json;

use crate::error::Result;
use crate::game::state::{with_engine, with_engine_mut};
use crate::ids::{LevelId, StageId, UnitId};
use crate::routes::util::{get_param, json_ok, parse_form_body, required, respond};

fn stage_param(params: &[(String, String)]) -> Result<StageId> {
    required(params, "stage")?.parse()
}

// ── GET /api/progress ──────────────────────────────────────────────

/// Unit-by-unit stage map plus the raw game state.
pub fn handle_progress_get(_query: &str) -> String {
    with_engine(|e| json_ok(&json!({ "units": e.stage_map(), "gameState": e.game_state() })))
}

// ── POST /api/progress/unlock ──────────────────────────────────────

/// Body: `stage={level or boss id}`.
pub fn handle_unlock_post(body: &str) -> String {
    let params = parse_form_body(body);
    respond(stage_param(&params).map(|stage| {
        with_engine_mut(|e| {
            let added = match stage {
                StageId::Level(level) => e.unlock_level(level),
                StageId::Boss(boss) => e.unlock_boss(boss),
            };
            json!({ "stage": stage.to_string(), "added": added })
        })
    }))
}

// ── POST /api/progress/complete ────────────────────────────────────

/// Body: `stage={level or boss id}`. Returns what the completion unlocked.
pub fn handle_complete_post(body: &str) -> String {
    let params = parse_form_body(body);
    respond(stage_param(&params).map(|stage| {
        with_engine_mut(|e| {
            let unlocked = match stage {
                StageId::Level(level) => e.complete_level(level),
                StageId::Boss(boss) => e.complete_boss(boss),
            };
            let achievements = e.unlock_earned_achievements();
            json!({ "stage": stage.to_string(), "unlocked": unlocked, "achievements": achievements })
        })
    }))
}

// ── POST /api/progress/current ─────────────────────────────────────

/// Body: `unit={unit id}` and optionally `level={level id}`.
pub fn handle_current_post(body: &str) -> String {
    respond(set_current(&parse_form_body(body)))
}

fn set_current(params: &[(String, String)]) -> Result<serde_json::Value> {
    let unit: UnitId = required(params, "unit")?.parse()?;
    let level = match get_param(params, "level").filter(|l| !l.is_empty()) {
        Some(raw) => Some(raw.parse::<LevelId>()?),
        None => None,
    };
    Ok(with_engine_mut(|e| {
        e.set_current(unit, level);
        json!({ "currentListId": unit, "currentLevelId": level })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::reset_engine;
    use crate::vocabulary::test_vocabulary;

    fn parse(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn completing_the_last_level_unlocks_the_boss() {
        reset_engine();
        let v = parse(&handle_complete_post("stage=list_1_level_5"));
        assert_eq!(v["unlocked"]["bosses"][0], "list_1_boss");
        let v = parse(&handle_complete_post("stage=list_1_boss"));
        assert_eq!(v["unlocked"]["levels"][0], "list_2_level_1");
        assert!(v["achievements"].as_array().unwrap().iter().any(|a| a == "boss_slayer_1"));
    }

    #[test]
    fn unlock_reports_whether_new() {
        reset_engine();
        assert_eq!(parse(&handle_unlock_post("stage=list_1_level_1"))["added"], false);
        assert_eq!(parse(&handle_unlock_post("stage=list_4_boss"))["added"], true);
    }

    #[test]
    fn malformed_stage_is_rejected() {
        reset_engine();
        let v = parse(&handle_complete_post("stage=list_1_level_6"));
        assert_eq!(v["error"]["kind"], "invalid_id");
        let v = parse(&handle_unlock_post(""));
        assert_eq!(v["error"]["kind"], "invalid_input");
    }

    #[test]
    fn stage_map_follows_vocabulary() {
        reset_engine();
        with_engine_mut(|e| e.load_vocabulary(test_vocabulary(2, 5)));
        handle_complete_post("stage=list_1_level_1");
        let v = parse(&handle_progress_get(""));
        let units = v["units"].as_array().unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0]["levels"][1]["unlocked"], true);
        assert_eq!(units[0]["levels"][0]["completed"], true);
        assert_eq!(units[1]["unlocked"], false);
    }

    #[test]
    fn current_pointers_are_stored() {
        reset_engine();
        let v = parse(&handle_current_post("unit=list_2&level=list_2_level_3"));
        assert_eq!(v["currentLevelId"], "list_2_level_3");
        with_engine(|e| assert_eq!(e.game_state().current_list_id, "list_2".parse::<UnitId>().ok()));
        let v = parse(&handle_current_post("unit=list_3"));
        assert!(v["currentLevelId"].is_null());
    }
}
