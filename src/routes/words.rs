//! `/api/words/*` routes: per-word learning state.

use serde_json::json;

use crate::error::{Error, Result};
use crate::game::state::{with_engine, with_engine_mut};
use crate::game::words::{WordFilter, WordQuery, WordStatus};
use crate::ids::UnitId;
use crate::routes::util::{get_param, json_ok, parse_form_body, parse_query, required, respond};

/// `list_3` or a bare `3`.
fn parse_unit(raw: &str) -> Result<UnitId> {
    match raw.parse::<u32>() {
        Ok(n) => UnitId::new(n),
        Err(_) => raw.parse(),
    }
}

fn parse_word_query(query: &str) -> Result<WordQuery> {
    let params = parse_query(query);
    let unit = match get_param(&params, "unit").filter(|u| !u.is_empty()) {
        Some(raw) => Some(parse_unit(raw)?),
        None => None,
    };
    let filter: WordFilter = get_param(&params, "filter").unwrap_or("").parse()?;
    let limit = match get_param(&params, "limit").filter(|l| !l.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::InvalidInput(format!("limit must be a number, got {:?}", raw)))?,
        None => 0,
    };
    Ok(WordQuery {
        unit,
        filter,
        search: get_param(&params, "search").unwrap_or("").to_string(),
        limit,
    })
}

// ── GET /api/words ─────────────────────────────────────────────────

/// Handle GET /api/words?unit=&filter=&search=&limit=
/// Counts by status plus the filtered list, joined with vocabulary content.
pub fn handle_words_get(query: &str) -> String {
    match parse_word_query(query) {
        Ok(q) => with_engine(|e| json_ok(&e.word_overview(&q))),
        Err(err) => respond::<()>(Err(err)),
    }
}

// ── POST /api/words/status ─────────────────────────────────────────

/// Body: `word={id}&status=new|learning|mastered`.
pub fn handle_status_post(body: &str) -> String {
    respond(set_status(&parse_form_body(body)))
}

fn set_status(params: &[(String, String)]) -> Result<serde_json::Value> {
    let word = required(params, "word")?;
    let status: WordStatus = required(params, "status")?.parse()?;
    Ok(with_engine_mut(|e| {
        let state = e.set_word_status(word, status);
        json!({ "word": word, "state": state, "profile": e.profile() })
    }))
}

// ── POST /api/words/error ──────────────────────────────────────────

/// Body: `word={id}`.
pub fn handle_error_post(body: &str) -> String {
    let params = parse_form_body(body);
    respond(required(&params, "word").map(|word| {
        with_engine_mut(|e| {
            let state = e.record_error(word);
            json!({ "word": word, "state": state })
        })
    }))
}
