//! Static vocabulary tables, supplied by the host.
//!
//! The engine never owns word content; it receives the unit lists as JSON and
//! only reads them to sample words for an attempt and to build quiz options.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::UnitId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// `w<zero-padded number>`, e.g. `w001`.
    pub id: String,
    pub word: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Difficulty tier, 1 (easiest) to 5.
    pub difficulty: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordList {
    pub id: UnitId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub lists: Vec<WordList>,
}

impl Vocabulary {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Split a flat word table into consecutive units of `per_unit` words,
    /// named `list_1`, `list_2`, ...
    pub fn chunked(words: Vec<Word>, per_unit: usize) -> Self {
        let per_unit = per_unit.max(1);
        let lists = words
            .chunks(per_unit)
            .enumerate()
            .map(|(i, chunk)| {
                let start = i * per_unit;
                WordList {
                    id: UnitId::new(i as u32 + 1).unwrap_or_else(|_| UnitId::first()),
                    name: format!("Unit {}", i + 1),
                    description: format!("Words {}-{}", start + 1, start + chunk.len()),
                    words: chunk.to_vec(),
                }
            })
            .collect();
        Self { lists }
    }

    pub fn list(&self, unit: UnitId) -> Option<&WordList> {
        self.lists.iter().find(|l| l.id == unit)
    }

    /// Words of a unit; empty for units the vocabulary does not have.
    pub fn unit_words(&self, unit: UnitId) -> &[Word] {
        self.list(unit).map(|l| l.words.as_slice()).unwrap_or(&[])
    }

    pub fn all_words(&self) -> impl Iterator<Item = &Word> {
        self.lists.iter().flat_map(|l| l.words.iter())
    }

    pub fn word(&self, id: &str) -> Option<&Word> {
        self.all_words().find(|w| w.id == id)
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(|l| l.words.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draw `min(count, available)` distinct word ids from a unit, in random order.
    pub fn sample_unit<R: Rng + ?Sized>(&self, unit: UnitId, count: usize, rng: &mut R) -> Vec<String> {
        self.unit_words(unit)
            .choose_multiple(rng, count)
            .map(|w| w.id.clone())
            .collect()
    }

    /// Meanings of up to `count` other words to serve as wrong options.
    ///
    /// Words within one difficulty tier of the target are preferred; if there
    /// are fewer than `count` of those, any other word may be used.
    pub fn distractors<R: Rng + ?Sized>(&self, target: &Word, count: usize, rng: &mut R) -> Vec<String> {
        let candidates: Vec<&Word> = self
            .all_words()
            .filter(|w| w.id != target.id && w.meaning != target.meaning)
            .collect();
        let similar: Vec<&Word> = candidates
            .iter()
            .copied()
            .filter(|w| w.difficulty.abs_diff(target.difficulty) <= 1)
            .collect();
        let pool = if similar.len() >= count {
            similar
        } else {
            candidates
        };
        pool.choose_multiple(rng, count)
            .map(|w| w.meaning.clone())
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn test_vocabulary(units: u32, words_per_unit: u32) -> Vocabulary {
    let mut words = Vec::new();
    for i in 1..=units * words_per_unit {
        words.push(Word {
            id: format!("w{:03}", i),
            word: format!("word{}", i),
            meaning: format!("meaning {}", i),
            phonetic: None,
            example: None,
            difficulty: ((i - 1) % 5 + 1) as u8,
        });
    }
    Vocabulary::chunked(words, words_per_unit as usize)
}
