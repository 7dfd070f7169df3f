//! `/api/vocabulary` route: the host hands over its word tables.

use serde::{Deserialize, Serialize};

use crate::game::state::{with_engine, with_engine_mut};
use crate::ids::UnitId;
use crate::routes::util::{json_body, json_ok, respond};
use crate::vocabulary::{Vocabulary, Word};

const DEFAULT_WORDS_PER_UNIT: usize = 100;

fn default_per_unit() -> usize {
    DEFAULT_WORDS_PER_UNIT
}

/// Either ready-made unit lists or a flat table to be cut into units.
#[derive(Deserialize)]
#[serde(untagged)]
enum Upload {
    Lists(Vocabulary),
    #[serde(rename_all = "camelCase")]
    Flat {
        words: Vec<Word>,
        #[serde(default = "default_per_unit")]
        per_unit: usize,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnitSummary<'a> {
    id: UnitId,
    name: &'a str,
    description: &'a str,
    word_count: usize,
}

fn summaries(vocab: &Vocabulary) -> Vec<UnitSummary<'_>> {
    vocab
        .lists
        .iter()
        .map(|l| UnitSummary {
            id: l.id,
            name: &l.name,
            description: &l.description,
            word_count: l.words.len(),
        })
        .collect()
}

// ── GET /api/vocabulary ────────────────────────────────────────────

pub fn handle_vocabulary_get(_query: &str) -> String {
    with_engine(|e| json_ok(&summaries(e.vocabulary())))
}

// ── POST /api/vocabulary ───────────────────────────────────────────

/// Body: `{"lists":[...]}` or `{"words":[...],"perUnit":100}`.
pub fn handle_vocabulary_post(body: &str) -> String {
    respond(json_body::<Upload>(body).map(|upload| {
        let vocab = match upload {
            Upload::Lists(vocab) => vocab,
            Upload::Flat { words, per_unit } => Vocabulary::chunked(words, per_unit),
        };
        with_engine_mut(|e| {
            e.load_vocabulary(vocab);
            serde_json::to_value(summaries(e.vocabulary())).unwrap_or_default()
        })
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
    fn flat_table_is_cut_into_units() {
        reset_engine();
        let words: Vec<Word> = test_vocabulary(1, 7).lists.remove(0).words;
        let body = serde_json::json!({ "words": words, "perUnit": 3 }).to_string();
        let v = parse(&handle_vocabulary_post(&body));
        let units = v.as_array().unwrap();
        assert_eq!(units.len(), 3);
        assert_eq!(units[0]["id"], "list_1");
        assert_eq!(units[2]["wordCount"], 1);
    }

    #[test]
    fn unit_lists_are_taken_as_is() {
        reset_engine();
        let body = serde_json::to_string(&test_vocabulary(2, 4)).unwrap();
        handle_vocabulary_post(&body);
        let v = parse(&handle_vocabulary_get(""));
        assert_eq!(v.as_array().unwrap().len(), 2);
        assert_eq!(v[1]["wordCount"], 4);
    }

    #[test]
    fn garbage_is_rejected() {
        reset_engine();
        let v = parse(&handle_vocabulary_post(r#"{"lists":"nope"}"#));
        assert_eq!(v["error"]["kind"], "invalid_input");
        with_engine(|e| assert!(e.vocabulary().is_empty()));
    }
}
