//! Backup bundles: every persisted aggregate in one JSON document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::UserProfile;
use super::progress::GameState;
use super::session::Session;
use super::settings::Settings;
use super::words::WordStates;
use crate::error::{Error, Result};

pub const SNAPSHOT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub export_timestamp: DateTime<Utc>,
    pub user_profile: UserProfile,
    pub word_states: WordStates,
    pub game_state: GameState,
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_session: Option<Session>,
}

/// Import-side shape: every field optional so that absence can be reported
/// by name instead of as a generic parse error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    version: Option<String>,
    #[serde(default, alias = "exportedAt")]
    export_timestamp: Option<DateTime<Utc>>,
    user_profile: Option<UserProfile>,
    word_states: Option<WordStates>,
    game_state: Option<GameState>,
    settings: Option<Settings>,
}

/// Parse and validate a snapshot. Nothing is applied here; a returned
/// snapshot is complete and normalized, ready to replace the current state.
///
/// Any session carried in the document is dropped.
pub fn parse(json: &str, now: DateTime<Utc>) -> Result<Snapshot> {
    let raw: RawSnapshot =
        serde_json::from_str(json).map_err(|e| Error::Validation(e.to_string()))?;

    let version = raw.version.ok_or_else(|| missing("version"))?;
    if version.trim().is_empty() {
        return Err(Error::Validation("empty version".to_string()));
    }
    let mut user_profile = raw.user_profile.ok_or_else(|| missing("userProfile"))?;
    if user_profile.max_hp == 0 {
        return Err(Error::Validation("maxHP must be at least 1".to_string()));
    }
    let word_states = raw.word_states.ok_or_else(|| missing("wordStates"))?;
    let mut game_state = raw.game_state.ok_or_else(|| missing("gameState"))?;
    let mut settings = raw.settings.ok_or_else(|| missing("settings"))?;

    user_profile.normalize();
    game_state.normalize();
    settings.normalize();

    Ok(Snapshot {
        version,
        export_timestamp: raw.export_timestamp.unwrap_or(now),
        user_profile,
        word_states,
        game_state,
        settings,
        current_session: None,
    })
}

fn missing(field: &str) -> Error {
    Error::Validation(format!("missing {}", field))
}
