//! In-memory filtering applied after every coarse stay query.

use innkeep_shared::types::StayId;

use crate::booking::{Stay, StayStatus};
use crate::calendar::DateRange;

/// Narrows a coarse stay listing: status, date overlap, self-exclusion,
/// then ordering by creation time (earliest first, id as tie-breaker).
#[derive(Debug, Clone, Default)]
pub struct PostQueryFilter {
    statuses: Vec<StayStatus>,
    window: Option<DateRange>,
    exclude: Option<StayId>,
}

impl PostQueryFilter {
    /// Keeps every status.
    #[must_use]
    pub fn any_status() -> Self {
        Self::default()
    }

    /// Keeps only stays that hold inventory (`confirmed`, `checked_in`).
    #[must_use]
    pub fn active() -> Self {
        Self::with_statuses(StayStatus::ACTIVE.to_vec())
    }

    /// Keeps only the given statuses (all when empty).
    #[must_use]
    pub fn with_statuses(statuses: Vec<StayStatus>) -> Self {
        Self {
            statuses,
            ..Self::default()
        }
    }

    /// Keeps only stays sharing at least one night with `window`.
    #[must_use]
    pub fn overlapping(mut self, window: DateRange) -> Self {
        self.window = Some(window);
        self
    }

    /// Drops the given stay (used when re-checking a stay against its own room).
    #[must_use]
    pub fn excluding(mut self, stay_id: StayId) -> Self {
        self.exclude = Some(stay_id);
        self
    }

    /// Returns true when `stay` passes every predicate.
    #[must_use]
    pub fn matches(&self, stay: &Stay) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&stay.status))
            && self.window.is_none_or(|w| w.overlaps(&stay.dates))
            && self.exclude != Some(stay.id)
    }

    /// Applies the filter and sorts the survivors.
    #[must_use]
    pub fn apply(&self, stays: Vec<Stay>) -> Vec<Stay> {
        let mut kept: Vec<Stay> = stays.into_iter().filter(|s| self.matches(s)).collect();
        kept.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{range, stay};
    use chrono::Duration;

    #[test]
    fn test_active_filter_drops_cancelled_and_departed() {
        let mut cancelled = stay(range((2025, 2, 1), (2025, 2, 3)));
        cancelled.status = StayStatus::Cancelled;
        let mut departed = stay(range((2025, 2, 1), (2025, 2, 3)));
        departed.status = StayStatus::CheckedOut;
        let live = stay(range((2025, 2, 1), (2025, 2, 3)));

        let kept = PostQueryFilter::active().apply(vec![cancelled, departed, live.clone()]);
        assert_eq!(kept, vec![live]);
    }

    #[test]
    fn test_overlap_is_half_open() {
        let before = stay(range((2025, 2, 1), (2025, 2, 2)));
        let inside = stay(range((2025, 2, 2), (2025, 2, 3)));
        let after = stay(range((2025, 2, 3), (2025, 2, 5)));

        let window = range((2025, 2, 2), (2025, 2, 3));
        let kept = PostQueryFilter::active()
            .overlapping(window)
            .apply(vec![before, inside.clone(), after]);
        assert_eq!(kept, vec![inside]);
    }

    #[test]
    fn test_excluding_self_and_creation_order() {
        let mut first = stay(range((2025, 2, 1), (2025, 2, 4)));
        let mut second = stay(range((2025, 2, 2), (2025, 2, 3)));
        let me = stay(range((2025, 2, 1), (2025, 2, 4)));
        second.created_at = me.created_at - Duration::hours(1);
        first.created_at = me.created_at - Duration::hours(2);

        let kept = PostQueryFilter::active()
            .overlapping(range((2025, 2, 1), (2025, 2, 4)))
            .excluding(me.id)
            .apply(vec![me.clone(), second.clone(), first.clone()]);
        assert_eq!(kept.iter().map(|s| s.id).collect::<Vec<_>>(), vec![first.id, second.id]);
    }
}
