//! `/api/session/*` routes: playing a quiz level or a boss fight.

use serde_json::json;

use crate::error::{Error, Result};
use crate::game::session::Session;
use crate::game::state::{with_engine, with_engine_mut};
use crate::ids::StageId;
use crate::routes::util::{get_param, json_ok, parse_form_body, required, respond};

// ── GET /api/session ───────────────────────────────────────────────

/// The active attempt, or `null`.
pub fn handle_session_get(_query: &str) -> String {
    with_engine(|e| json_ok(&e.session()))
}

// ── POST /api/session/start ────────────────────────────────────────

/// Body: `stage={level or boss id}`. Levels start a quiz, bosses a spelling fight.
pub fn handle_start_post(body: &str) -> String {
    respond(start(&parse_form_body(body)))
}

fn start(params: &[(String, String)]) -> Result<Session> {
    let stage: StageId = required(params, "stage")?.parse()?;
    let mut rng = rand::thread_rng();
    with_engine_mut(|e| -> Result<Session> {
        let session = match stage {
            StageId::Level(level) => e.enter_level(level, &mut rng)?,
            StageId::Boss(boss) => e.enter_boss(boss, &mut rng)?,
        };
        Ok(session.clone())
    })
}

// ── GET /api/session/question ──────────────────────────────────────

/// The current quiz question or spelling challenge, depending on the session.
pub fn handle_question_get(_query: &str) -> String {
    let mut rng = rand::thread_rng();
    with_engine(|e| match e.session().map(Session::kind) {
        Some("quiz") => respond(e.current_question(&mut rng)),
        Some(_) => respond(e.current_challenge()),
        None => respond::<()>(Err(Error::NoActiveSession)),
    })
}

// ── POST /api/session/answer ───────────────────────────────────────

/// Body: `answer={chosen meaning or typed spelling}`.
pub fn handle_answer_post(body: &str) -> String {
    let params = parse_form_body(body);
    let Some(answer) = get_param(&params, "answer") else {
        return respond::<()>(Err(Error::InvalidInput("missing answer parameter".to_string())));
    };
    with_engine_mut(|e| match e.session().map(Session::kind) {
        Some("quiz") => respond(e.answer_quiz(answer)),
        Some(_) => respond(e.submit_spelling(answer)),
        None => respond::<()>(Err(Error::NoActiveSession)),
    })
}

// ── POST /api/session/end ──────────────────────────────────────────

/// Leave the attempt without scoring it.
pub fn handle_end_post(_body: &str) -> String {
    with_engine_mut(|e| {
        let ended = e.abandon_session();
        json_ok(&json!({ "ended": ended.is_some(), "session": ended }))
    })
}
