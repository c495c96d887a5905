//! Borrower eligibility checks.
//!
//! Every borrow-side operation (submit, approve, issue) runs the same gate,
//! so a ban that lands between approval and hand-out still blocks the loan.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::User;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EligibilityError {
    #[error("account is awaiting administrator approval")]
    NotApproved,
    #[error("account has been deactivated")]
    Inactive,
    #[error("account is banned from borrowing{}", match .until {
        Some(t) => format!(" until {}", t.format("%Y-%m-%d")),
        None => String::new(),
    })]
    Banned { until: Option<DateTime<Utc>> },
}

/// Checks whether a user may participate in the borrow lifecycle at `now`.
///
/// A ban with `banned_until` in the past is treated as lifted; the flag is
/// cleared lazily on the next successful write to the user row. A ban with
/// no expiry holds until an administrator revokes it.
pub fn check_borrow_eligibility(user: &User, now: DateTime<Utc>) -> Result<(), EligibilityError> {
    if !user.is_approved {
        return Err(EligibilityError::NotApproved);
    }
    if !user.is_active {
        return Err(EligibilityError::Inactive);
    }
    if user.is_banned {
        match user.banned_until {
            Some(until) if until <= now => {}
            other => return Err(EligibilityError::Banned { until: other }),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use chrono::Duration;
    use uuid::Uuid;

    fn eligible_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "student@univ.edu".to_string(),
            password_hash: "hash".to_string(),
            display_name: "Test Student".to_string(),
            role: UserRole::Student,
            is_approved: true,
            is_active: true,
            is_banned: false,
            banned_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_eligible_user_passes() {
        assert!(check_borrow_eligibility(&eligible_user(), Utc::now()).is_ok());
    }

    #[test]
    fn test_unapproved_user_blocked() {
        let mut user = eligible_user();
        user.is_approved = false;
        assert_eq!(
            check_borrow_eligibility(&user, Utc::now()),
            Err(EligibilityError::NotApproved)
        );
    }

    #[test]
    fn test_inactive_user_blocked() {
        let mut user = eligible_user();
        user.is_active = false;
        assert_eq!(
            check_borrow_eligibility(&user, Utc::now()),
            Err(EligibilityError::Inactive)
        );
    }

    #[test]
    fn test_active_ban_blocked() {
        let now = Utc::now();
        let until = now + Duration::days(30);
        let mut user = eligible_user();
        user.is_banned = true;
        user.banned_until = Some(until);
        assert_eq!(
            check_borrow_eligibility(&user, now),
            Err(EligibilityError::Banned { until: Some(until) })
        );
    }

    #[test]
    fn test_expired_ban_is_lifted() {
        let now = Utc::now();
        let mut user = eligible_user();
        user.is_banned = true;
        user.banned_until = Some(now - Duration::days(1));
        assert!(check_borrow_eligibility(&user, now).is_ok());
    }

    #[test]
    fn test_indefinite_ban_blocked() {
        let mut user = eligible_user();
        user.is_banned = true;
        user.banned_until = None;
        assert_eq!(
            check_borrow_eligibility(&user, Utc::now()),
            Err(EligibilityError::Banned { until: None })
        );
    }
}
