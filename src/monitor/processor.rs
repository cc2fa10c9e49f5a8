//! Pure snapshot derivation: classification, trend arrows, suggestion lines.

use super::types::{ClassifiedSnapshot, Snapshot, Trend};

/// Placeholder shown when the service sends no suggestions.
pub const NO_SUGGESTIONS: &str = "No suggestions available.";

/// Last accepted demand/supply values, used only to derive the next trend.
///
/// # Examples
///
/// ```
/// use microgrid_monitor::monitor::processor::TrendState;
///
/// let state = TrendState::default();
/// assert!(state.is_reset());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrendState {
    last_demand_kw: Option<f64>,
    last_supply_kw: Option<f64>,
}

impl TrendState {
    /// Records the values of a newly accepted snapshot.
    pub fn advance(&mut self, snapshot: &Snapshot) {
        self.last_demand_kw = Some(snapshot.total_demand_kw);
        self.last_supply_kw = Some(snapshot.total_supply_kw);
    }

    /// Forgets the prior values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` when no prior value is held.
    pub fn is_reset(&self) -> bool {
        self.last_demand_kw.is_none() && self.last_supply_kw.is_none()
    }

    pub fn last_demand_kw(&self) -> Option<f64> {
        self.last_demand_kw
    }

    pub fn last_supply_kw(&self) -> Option<f64> {
        self.last_supply_kw
    }
}

/// Direction of `current` relative to `prior` by strict comparison.
pub fn trend(prior: Option<f64>, current: f64) -> Trend {
    match prior {
        Some(p) if current > p => Trend::Up,
        Some(p) if current < p => Trend::Down,
        _ => Trend::None,
    }
}

/// Derives status and trends for `snapshot` against `state`.
///
/// Does not touch `state`; advancing it is the caller's job once the
/// snapshot is accepted.
pub fn process(snapshot: Snapshot, state: &TrendState) -> ClassifiedSnapshot {
    ClassifiedSnapshot {
        status: snapshot.status(),
        demand_trend: trend(state.last_demand_kw, snapshot.total_demand_kw),
        supply_trend: trend(state.last_supply_kw, snapshot.total_supply_kw),
        snapshot,
    }
}

/// Suggestion lines to render: the service's list verbatim, or a single
/// placeholder when it is absent or empty.
pub fn suggestion_lines(snapshot: &Snapshot) -> Vec<&str> {
    match snapshot.suggestions.as_deref() {
        Some(list) if !list.is_empty() => list.iter().map(String::as_str).collect(),
        _ => vec![NO_SUGGESTIONS],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::fixtures::snapshot;
    use crate::monitor::types::Status;

    #[test]
    fn first_snapshot_has_no_trend() {
        let state = TrendState::default();
        let c = process(snapshot(100.0, 120.0), &state);
        assert_eq!(c.status, Status::Ok);
        assert_eq!(c.demand_trend, Trend::None);
        assert_eq!(c.supply_trend, Trend::None);
    }

    #[test]
    fn trends_follow_strict_comparison() {
        let mut state = TrendState::default();
        state.advance(&snapshot(100.0, 120.0));

        let c = process(snapshot(150.0, 120.0), &state);
        assert_eq!(c.status, Status::Shortage);
        assert_eq!(c.demand_trend, Trend::Up);
        assert_eq!(c.supply_trend, Trend::None);

        state.advance(&c.snapshot);
        let c = process(snapshot(150.0, 130.0), &state);
        assert_eq!(c.demand_trend, Trend::None);
        assert_eq!(c.supply_trend, Trend::Up);

        state.advance(&c.snapshot);
        let c = process(snapshot(90.0, 10.0), &state);
        assert_eq!(c.demand_trend, Trend::Down);
        assert_eq!(c.supply_trend, Trend::Down);
    }

    #[test]
    fn process_leaves_state_untouched() {
        let state = TrendState::default();
        let _ = process(snapshot(1.0, 2.0), &state);
        assert!(state.is_reset());
    }

    #[test]
    fn reset_forgets_prior_values() {
        let mut state = TrendState::default();
        state.advance(&snapshot(5.0, 6.0));
        assert_eq!(state.last_demand_kw(), Some(5.0));
        state.reset();
        assert!(state.is_reset());
        assert_eq!(trend(state.last_supply_kw(), 6.0), Trend::None);
    }

    #[test]
    fn suggestions_pass_through_verbatim() {
        let mut s = snapshot(1.0, 2.0);
        s.suggestions = Some(vec!["b".into(), "a".into()]);
        assert_eq!(suggestion_lines(&s), vec!["b", "a"]);
    }

    #[test]
    fn missing_or_empty_suggestions_use_placeholder() {
        let mut s = snapshot(1.0, 2.0);
        s.suggestions = None;
        assert_eq!(suggestion_lines(&s), vec![NO_SUGGESTIONS]);
        s.suggestions = Some(Vec::new());
        assert_eq!(suggestion_lines(&s), vec![NO_SUGGESTIONS]);
    }
}
