//! Cross-level statistics derived from the score history.

use crate::model::ScoreHistory;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    pub levels_completed: usize,
    /// Mean of all recorded percents; `None` before any level is finished.
    pub average_percent: Option<f64>,
}

impl ProgressSummary {
    /// Average for display, reporting `0.0` when nothing has been recorded.
    #[must_use]
    pub fn average_or_zero(&self) -> f64 {
        self.average_percent.unwrap_or(0.0)
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(history: &ScoreHistory) -> ProgressSummary {
    let levels_completed = history.len();
    let average_percent = if levels_completed == 0 {
        None
    } else {
        Some(history.percents().sum::<f64>() / levels_completed as f64)
    };

    ProgressSummary {
        levels_completed,
        average_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LevelNumber;

    #[test]
    fn empty_history_has_no_average() {
        let summary = summarize(&ScoreHistory::new());
        assert_eq!(summary.levels_completed, 0);
        assert_eq!(summary.average_percent, None);
        assert_eq!(summary.average_or_zero(), 0.0);
    }

    #[test]
    fn averages_latest_scores() {
        let mut history = ScoreHistory::new();
        history.record(LevelNumber::new(1).unwrap(), 50.0);
        history.record(LevelNumber::new(2).unwrap(), 90.0);
        history.record(LevelNumber::new(1).unwrap(), 70.0);

        let summary = summarize(&history);
        assert_eq!(summary.levels_completed, 2);
        assert_eq!(summary.average_percent, Some(80.0));
    }
}
