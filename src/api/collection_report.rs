use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::Figure;
use crate::error::FigureResult;

/// Figures keyed by name, in registry order.
pub type FigureMap = IndexMap<String, Figure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FigureOutcome {
    Completed { elapsed_ms: u64 },
    /// Routine missed its deadline; the placeholder was stored instead.
    TimedOut { timeout_ms: u64 },
}

impl FigureOutcome {
    #[must_use]
    pub fn is_timed_out(self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/// Result of one collection call with per-figure bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub collected_at: DateTime<Utc>,
    pub figures: FigureMap,
    pub outcomes: IndexMap<String, FigureOutcome>,
}

impl CollectionReport {
    pub(crate) fn new(collected_at: DateTime<Utc>, capacity: usize) -> Self {
        Self {
            collected_at,
            figures: IndexMap::with_capacity(capacity),
            outcomes: IndexMap::with_capacity(capacity),
        }
    }

    pub(crate) fn record(&mut self, name: &str, figure: Figure, outcome: FigureOutcome) {
        self.figures.insert(name.to_owned(), figure);
        self.outcomes.insert(name.to_owned(), outcome);
    }

    #[must_use]
    pub fn into_figures(self) -> FigureMap {
        self.figures
    }

    /// Names whose routine missed the deadline, in registry order.
    pub fn timed_out(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_timed_out())
            .map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.timed_out().next().is_none()
    }

    pub fn to_json_string(&self) -> FigureResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{CollectionReport, FigureOutcome};
    use crate::core::Figure;

    #[test]
    fn tracks_timed_out_names_in_order() {
        let mut report = CollectionReport::new(Utc::now(), 3);
        report.record("a", Figure::new("a"), FigureOutcome::Completed { elapsed_ms: 3 });
        report.record("b", Figure::empty(), FigureOutcome::TimedOut { timeout_ms: 2000 });
        report.record("c", Figure::empty(), FigureOutcome::TimedOut { timeout_ms: 2000 });

        assert!(!report.is_complete());
        assert_eq!(report.timed_out().collect::<Vec<_>>(), ["b", "c"]);
        assert_eq!(report.into_figures().len(), 3);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(FigureOutcome::TimedOut { timeout_ms: 50 })
            .expect("serialize outcome");
        assert_eq!(json["status"], "timed_out");
        assert_eq!(json["timeout_ms"], 50);
    }
}
