//! Player preferences. The engine only stores them; audio and display live in
//! the host.

use serde::{Deserialize, Serialize};

pub const MAX_VOLUME: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub sound_on: bool,
    pub music_on: bool,
    /// 0..=100
    pub sound_volume: u8,
    /// 0..=100
    pub music_volume: u8,
    pub vibration: bool,
    pub show_phonetic: bool,
    pub show_example: bool,
    pub auto_play_sound: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_on: true,
            music_on: true,
            sound_volume: 70,
            music_volume: 50,
            vibration: false,
            show_phonetic: true,
            show_example: true,
            auto_play_sound: false,
        }
    }
}

/// Partial update. Volumes arrive as plain integers and are clamped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub sound_on: Option<bool>,
    pub music_on: Option<bool>,
    pub sound_volume: Option<i64>,
    pub music_volume: Option<i64>,
    pub vibration: Option<bool>,
    pub show_phonetic: Option<bool>,
    pub show_example: Option<bool>,
    pub auto_play_sound: Option<bool>,
}

fn clamp_volume(v: i64) -> u8 {
    v.clamp(0, i64::from(MAX_VOLUME)) as u8
}

impl Settings {
    pub fn normalize(&mut self) {
        self.sound_volume = self.sound_volume.min(MAX_VOLUME);
        self.music_volume = self.music_volume.min(MAX_VOLUME);
    }

    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.sound_on {
            self.sound_on = v;
        }
        if let Some(v) = patch.music_on {
            self.music_on = v;
        }
        if let Some(v) = patch.sound_volume {
            self.sound_volume = clamp_volume(v);
        }
        if let Some(v) = patch.music_volume {
            self.music_volume = clamp_volume(v);
        }
        if let Some(v) = patch.vibration {
            self.vibration = v;
        }
        if let Some(v) = patch.show_phonetic {
            self.show_phonetic = v;
        }
        if let Some(v) = patch.show_example {
            self.show_example = v;
        }
        if let Some(v) = patch.auto_play_sound {
            self.auto_play_sound = v;
        }
    }
}
