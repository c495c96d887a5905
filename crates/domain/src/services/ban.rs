//! Late-return ban policy.

use chrono::{DateTime, Months, Utc};

use crate::models::LoanPolicy;

/// A ban the return flow must apply atomically with the record closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanOutcome {
    pub banned_until: DateTime<Utc>,
}

/// Evaluates the late-return policy for a closing loan.
///
/// A return is late only when the return lands on a later calendar day than
/// the expected return date; returning at 23:50 on the due day is on time.
pub fn late_return_ban(
    expected_return_date: DateTime<Utc>,
    returned_at: DateTime<Utc>,
    policy: &LoanPolicy,
) -> Option<BanOutcome> {
    if !policy.late_return_auto_ban {
        return None;
    }
    if returned_at.date_naive() <= expected_return_date.date_naive() {
        return None;
    }
    returned_at
        .checked_add_months(Months::new(policy.late_return_ban_months))
        .map(|banned_until| BanOutcome { banned_until })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_on_time_return_no_ban() {
        let now = Utc::now();
        let policy = LoanPolicy::default();
        assert_eq!(late_return_ban(now + Duration::days(1), now, &policy), None);
        assert_eq!(late_return_ban(now, now, &policy), None);
    }

    #[test]
    fn test_late_return_banned_six_months() {
        let now = Utc::now();
        let policy = LoanPolicy::default();
        let outcome = late_return_ban(now - Duration::days(4), now, &policy)
            .expect("late return should ban");
        assert_eq!(
            outcome.banned_until,
            now.checked_add_months(Months::new(6)).unwrap()
        );
    }

    #[test]
    fn test_policy_disabled_no_ban() {
        let now = Utc::now();
        let policy = LoanPolicy {
            late_return_auto_ban: false,
            ..LoanPolicy::default()
        };
        assert_eq!(late_return_ban(now - Duration::days(10), now, &policy), None);
    }

    #[test]
    fn test_custom_ban_length() {
        let now = Utc::now();
        let policy = LoanPolicy {
            late_return_ban_months: 2,
            ..LoanPolicy::default()
        };
        let outcome = late_return_ban(now - Duration::days(1), now, &policy).unwrap();
        assert_eq!(
            outcome.banned_until,
            now.checked_add_months(Months::new(2)).unwrap()
        );
    }
}
