use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::LevelNumber;

const KEY_PREFIX: &str = "level";

/// Latest percentage score per completed level.
///
/// Serialized as `{"level1": 80.0, ...}`. Keys that do not name a level and
/// values that are not finite numbers (`null`, strings, ...) are dropped
/// one by one when reading; the remaining entries survive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, StoredPercent>",
    into = "BTreeMap<String, f64>"
)]
pub struct ScoreHistory {
    entries: BTreeMap<LevelNumber, f64>,
}

impl ScoreHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `percent` for `level`, replacing any earlier score.
    ///
    /// Returns the previous score, if any.
    pub fn record(&mut self, level: LevelNumber, percent: f64) -> Option<f64> {
        self.entries.insert(level, percent.clamp(0.0, 100.0))
    }

    #[must_use]
    pub fn get(&self, level: LevelNumber) -> Option<f64> {
        self.entries.get(&level).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LevelNumber, f64)> + '_ {
        self.entries.iter().map(|(level, percent)| (*level, *percent))
    }

    pub fn percents(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.values().copied()
    }
}

/// One stored value, read without failing the whole map.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPercent {
    Number(f64),
    Unreadable(IgnoredAny),
}

impl StoredPercent {
    fn finite(self) -> Option<f64> {
        match self {
            Self::Number(percent) if percent.is_finite() => Some(percent),
            Self::Number(_) | Self::Unreadable(_) => None,
        }
    }
}

impl From<BTreeMap<String, StoredPercent>> for ScoreHistory {
    fn from(raw: BTreeMap<String, StoredPercent>) -> Self {
        let entries = raw
            .into_iter()
            .filter_map(|(key, stored)| stored.finite().map(|percent| (key, percent)))
            .filter_map(|(key, percent)| {
                let number = key.strip_prefix(KEY_PREFIX).unwrap_or(&key);
                number
                    .parse::<LevelNumber>()
                    .ok()
                    .map(|level| (level, percent.clamp(0.0, 100.0)))
            })
            .collect();
        Self { entries }
    }
}

impl From<ScoreHistory> for BTreeMap<String, f64> {
    fn from(history: ScoreHistory) -> Self {
        history
            .entries
            .into_iter()
            .map(|(level, percent)| (format!("{KEY_PREFIX}{level}"), percent))
            .collect()
    }
}
