//! Due-date arithmetic for the reminder engine.
//!
//! Loans are due at the end of the expected return day, so all comparisons
//! work on calendar dates rather than raw timestamps.

use chrono::{DateTime, Utc};

/// Whole calendar days between `now` and the expected return date.
///
/// Positive while the loan still has days to run, zero on the due day itself,
/// negative once overdue.
pub fn days_until_due(expected_return_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expected_return_date.date_naive() - now.date_naive()).num_days()
}

/// A reminder milestone the batch engine acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderMilestone {
    DueInThreeDays,
    DueTomorrow,
    Overdue { days_overdue: i64 },
}

impl ReminderMilestone {
    /// Maps a `days_until_due` value to the milestone it triggers, if any.
    ///
    /// The due day itself (zero) triggers nothing; the borrower still has
    /// until end of day.
    pub fn for_days_until_due(days: i64) -> Option<Self> {
        match days {
            3 => Some(ReminderMilestone::DueInThreeDays),
            1 => Some(ReminderMilestone::DueTomorrow),
            d if d < 0 => Some(ReminderMilestone::Overdue { days_overdue: -d }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_days_until_due_future() {
        let now = Utc::now();
        assert_eq!(days_until_due(now + Duration::days(3), now), 3);
        assert_eq!(days_until_due(now + Duration::days(1), now), 1);
    }

    #[test]
    fn test_days_until_due_same_day() {
        let now = Utc::now();
        assert_eq!(days_until_due(now, now), 0);
    }

    #[test]
    fn test_days_until_due_overdue() {
        let now = Utc::now();
        assert_eq!(days_until_due(now - Duration::days(2), now), -2);
    }

    #[test]
    fn test_milestone_mapping() {
        assert_eq!(
            ReminderMilestone::for_days_until_due(3),
            Some(ReminderMilestone::DueInThreeDays)
        );
        assert_eq!(
            ReminderMilestone::for_days_until_due(1),
            Some(ReminderMilestone::DueTomorrow)
        );
        assert_eq!(
            ReminderMilestone::for_days_until_due(-2),
            Some(ReminderMilestone::Overdue { days_overdue: 2 })
        );
    }

    #[test]
    fn test_milestone_quiet_days() {
        assert_eq!(ReminderMilestone::for_days_until_due(0), None);
        assert_eq!(ReminderMilestone::for_days_until_due(2), None);
        assert_eq!(ReminderMilestone::for_days_until_due(4), None);
        assert_eq!(ReminderMilestone::for_days_until_due(30), None);
    }
}
