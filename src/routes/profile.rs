//! `/api/state`, `/api/init`, `/api/profile/*` and `/api/achievements/*`.

use serde_json::json;

use crate::error::Error;
use crate::game::state::{with_engine, with_engine_mut};
use crate::routes::util::{json_ok, parse_form_body, required, respond};

// ── GET /api/state ─────────────────────────────────────────────────

/// Everything the host needs to draw its screens after a reload.
pub fn handle_state_get(_query: &str) -> String {
    with_engine(|e| json_ok(&e.view()))
}

// ── POST /api/init ─────────────────────────────────────────────────

/// Re-run startup: load records, drop a stale session, regenerate HP.
pub fn handle_init_post(_body: &str) -> String {
    with_engine_mut(|e| {
        let regeneration = e.initialize();
        json_ok(&json!({ "regeneration": regeneration, "state": e.view() }))
    })
}

// ── GET /api/profile ───────────────────────────────────────────────

pub fn handle_profile_get(_query: &str) -> String {
    with_engine(|e| json_ok(e.profile()))
}

// ── POST /api/profile/hp ───────────────────────────────────────────

/// Body: `delta={signed integer}`. The result is clamped to `0..=maxHP`.
pub fn handle_hp_post(body: &str) -> String {
    let params = parse_form_body(body);
    respond(required(&params, "delta").and_then(|raw| {
        let delta: i32 = raw
            .parse()
            .map_err(|_| Error::InvalidInput(format!("delta must be an integer, got {:?}", raw)))?;
        Ok(with_engine_mut(|e| {
            let hp = e.adjust_hp(delta);
            json!({ "currentHP": hp, "maxHP": e.profile().max_hp })
        }))
    }))
}

// ── POST /api/profile/refresh ──────────────────────────────────────

pub fn handle_refresh_post(_body: &str) -> String {
    with_engine_mut(|e| {
        let regeneration = e.refresh_login();
        json_ok(&json!({ "regeneration": regeneration, "profile": e.profile() }))
    })
}

// ── GET /api/achievements ──────────────────────────────────────────

pub fn handle_achievements_get(_query: &str) -> String {
    with_engine(|e| json_ok(&e.achievement_board()))
}

// ── POST /api/achievements/unlock ──────────────────────────────────

/// Body: `id={achievement id}`. Any id is accepted; granting twice is a no-op.
pub fn handle_achievement_unlock_post(body: &str) -> String {
    let params = parse_form_body(body);
    respond(required(&params, "id").map(|id| {
        with_engine_mut(|e| {
            let added = e.unlock_achievement(id);
            json!({ "id": id, "added": added })
        })
    }))
}
