//! Structured unit / level / boss identifiers.
//!
//! On the wire and in storage the ids keep their string grammar:
//!
//! ```text
//! unit   list_<N>            N >= 1
//! level  list_<N>_level_<M>  M in 1..=5
//! boss   list_<N>_boss
//! ```
//!
//! They are parsed exactly once, where they enter the crate (route parameters,
//! deserialized records), and rendered back with `Display`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Quiz levels per unit; completing the last one unlocks the unit's boss.
pub const LEVELS_PER_UNIT: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitId(u32);

impl UnitId {
    pub fn new(n: u32) -> Result<Self, Error> {
        if n == 0 {
            return Err(Error::InvalidId("unit numbers start at 1".to_string()));
        }
        Ok(Self(n))
    }

    pub fn first() -> Self {
        Self(1)
    }

    pub fn number(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn level(self, number: u8) -> Result<LevelId, Error> {
        LevelId::new(self, number)
    }

    pub fn boss(self) -> BossId {
        BossId { unit: self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LevelId {
    pub unit: UnitId,
    number: u8,
}

/// What completing a level opens up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStage {
    Level(LevelId),
    Boss(BossId),
}

impl LevelId {
    pub fn new(unit: UnitId, number: u8) -> Result<Self, Error> {
        if !(1..=LEVELS_PER_UNIT).contains(&number) {
            return Err(Error::InvalidId(format!(
                "level number {} outside 1..={}",
                number, LEVELS_PER_UNIT
            )));
        }
        Ok(Self { unit, number })
    }

    /// `list_1_level_1`, unlocked on every fresh profile.
    pub fn first() -> Self {
        Self {
            unit: UnitId::first(),
            number: 1,
        }
    }

    pub fn number(self) -> u8 {
        self.number
    }

    pub fn next(self) -> NextStage {
        if self.number < LEVELS_PER_UNIT {
            NextStage::Level(Self {
                unit: self.unit,
                number: self.number + 1,
            })
        } else {
            NextStage::Boss(self.unit.boss())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BossId {
    pub unit: UnitId,
}

impl BossId {
    /// First level of the following unit. The unit may not exist in the
    /// vocabulary; the id is recorded anyway and simply never shows up.
    pub fn next_unit_first_level(self) -> LevelId {
        LevelId {
            unit: self.unit.next(),
            number: 1,
        }
    }
}

/// Either kind of playable stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    Level(LevelId),
    Boss(BossId),
}

impl StageId {
    pub fn unit(self) -> UnitId {
        match self {
            StageId::Level(l) => l.unit,
            StageId::Boss(b) => b.unit,
        }
    }
}

// ── Parsing ────────────────────────────────────────────────────────

fn parse_unit_prefix(s: &str) -> Result<(UnitId, &str), Error> {
    let invalid = || Error::InvalidId(s.to_string());
    let rest = s.strip_prefix("list_").ok_or_else(invalid)?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return Err(invalid());
    }
    let n: u32 = rest[..digits_end].parse().map_err(|_| invalid())?;
    let unit = UnitId::new(n).map_err(|_| invalid())?;
    Ok((unit, &rest[digits_end..]))
}

impl FromStr for UnitId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match parse_unit_prefix(s)? {
            (unit, "") => Ok(unit),
            _ => Err(Error::InvalidId(s.to_string())),
        }
    }
}

impl FromStr for StageId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let (unit, rest) = parse_unit_prefix(s)?;
        if rest == "_boss" {
            return Ok(StageId::Boss(unit.boss()));
        }
        let number = rest
            .strip_prefix("_level_")
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|n| n.parse::<u8>().ok())
            .ok_or_else(|| Error::InvalidId(s.to_string()))?;
        LevelId::new(unit, number)
            .map(StageId::Level)
            .map_err(|_| Error::InvalidId(s.to_string()))
    }
}

impl FromStr for LevelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.parse()? {
            StageId::Level(level) => Ok(level),
            StageId::Boss(_) => Err(Error::InvalidId(format!("{} is not a level", s))),
        }
    }
}

impl FromStr for BossId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.parse()? {
            StageId::Boss(boss) => Ok(boss),
            StageId::Level(_) => Err(Error::InvalidId(format!("{} is not a boss", s))),
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────────

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "list_{}", self.0)
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_level_{}", self.unit, self.number)
    }
}

impl fmt::Display for BossId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_boss", self.unit)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageId::Level(l) => fmt::Display::fmt(l, f),
            StageId::Boss(b) => fmt::Display::fmt(b, f),
        }
    }
}

macro_rules! string_conversions {
    ($($ty:ty),*) => {$(
        impl From<$ty> for String {
            fn from(id: $ty) -> String {
                id.to_string()
            }
        }

        impl TryFrom<String> for $ty {
            type Error = Error;

            fn try_from(s: String) -> Result<Self, Error> {
                s.parse()
            }
        }
    )*};
}

string_conversions!(UnitId, LevelId, BossId);
