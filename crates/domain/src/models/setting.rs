//! Portal settings and the typed loan policy resolved from them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Setting keys consumed by the lifecycle engines.
pub mod keys {
    pub const LATE_RETURN_AUTO_BAN: &str = "late_return_auto_ban";
    pub const LATE_RETURN_BAN_MONTHS: &str = "late_return_ban_months";
    pub const MAX_ITEMS_PER_USER: &str = "max_items_per_user";
    pub const REMINDER_3DAYS_ENABLED: &str = "reminder_3days_enabled";
    pub const REMINDER_1DAY_ENABLED: &str = "reminder_1day_enabled";
    pub const OVERDUE_NOTICE_ENABLED: &str = "overdue_notice_enabled";
}

/// Typed view over the string settings store, with documented defaults.
///
/// Resolved once per operation invocation and passed explicitly, so tests can
/// substitute fixed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPolicy {
    /// Ban borrowers automatically when they return late.
    pub late_return_auto_ban: bool,
    /// Ban length applied at late return.
    pub late_return_ban_months: u32,
    /// How many open loans one user may hold at once.
    pub max_items_per_user: i64,
    pub reminder_3days_enabled: bool,
    pub reminder_1day_enabled: bool,
    pub overdue_notice_enabled: bool,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            late_return_auto_ban: true,
            late_return_ban_months: 6,
            max_items_per_user: 5,
            reminder_3days_enabled: true,
            reminder_1day_enabled: true,
            overdue_notice_enabled: true,
        }
    }
}

impl LoanPolicy {
    /// Resolves the policy from raw key/value settings, falling back to the
    /// default for any key that is missing or unparseable.
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let defaults = Self::default();

        Self {
            late_return_auto_ban: parse_bool(settings, keys::LATE_RETURN_AUTO_BAN)
                .unwrap_or(defaults.late_return_auto_ban),
            late_return_ban_months: parse_num(settings, keys::LATE_RETURN_BAN_MONTHS)
                .unwrap_or(defaults.late_return_ban_months),
            max_items_per_user: parse_num(settings, keys::MAX_ITEMS_PER_USER)
                .unwrap_or(defaults.max_items_per_user),
            reminder_3days_enabled: parse_bool(settings, keys::REMINDER_3DAYS_ENABLED)
                .unwrap_or(defaults.reminder_3days_enabled),
            reminder_1day_enabled: parse_bool(settings, keys::REMINDER_1DAY_ENABLED)
                .unwrap_or(defaults.reminder_1day_enabled),
            overdue_notice_enabled: parse_bool(settings, keys::OVERDUE_NOTICE_ENABLED)
                .unwrap_or(defaults.overdue_notice_enabled),
        }
    }

    /// The effective settings as key/value strings, defaults included.
    pub fn to_settings(&self) -> HashMap<String, String> {
        HashMap::from([
            (
                keys::LATE_RETURN_AUTO_BAN.to_string(),
                self.late_return_auto_ban.to_string(),
            ),
            (
                keys::LATE_RETURN_BAN_MONTHS.to_string(),
                self.late_return_ban_months.to_string(),
            ),
            (
                keys::MAX_ITEMS_PER_USER.to_string(),
                self.max_items_per_user.to_string(),
            ),
            (
                keys::REMINDER_3DAYS_ENABLED.to_string(),
                self.reminder_3days_enabled.to_string(),
            ),
            (
                keys::REMINDER_1DAY_ENABLED.to_string(),
                self.reminder_1day_enabled.to_string(),
            ),
            (
                keys::OVERDUE_NOTICE_ENABLED.to_string(),
                self.overdue_notice_enabled.to_string(),
            ),
        ])
    }
}

fn parse_bool(settings: &HashMap<String, String>, key: &str) -> Option<bool> {
    settings.get(key).and_then(|v| v.parse().ok())
}

fn parse_num<T: std::str::FromStr>(settings: &HashMap<String, String>, key: &str) -> Option<T> {
    settings.get(key).and_then(|v| v.parse().ok())
}

/// Request body to update a single setting.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = LoanPolicy::default();
        assert!(policy.late_return_auto_ban);
        assert_eq!(policy.late_return_ban_months, 6);
        assert_eq!(policy.max_items_per_user, 5);
        assert!(policy.reminder_3days_enabled);
    }

    #[test]
    fn test_from_settings_overrides() {
        let settings = HashMap::from([
            ("late_return_auto_ban".to_string(), "false".to_string()),
            ("late_return_ban_months".to_string(), "3".to_string()),
            ("max_items_per_user".to_string(), "2".to_string()),
        ]);
        let policy = LoanPolicy::from_settings(&settings);
        assert!(!policy.late_return_auto_ban);
        assert_eq!(policy.late_return_ban_months, 3);
        assert_eq!(policy.max_items_per_user, 2);
        // Untouched keys keep defaults
        assert!(policy.reminder_1day_enabled);
    }

    #[test]
    fn test_from_settings_ignores_garbage() {
        let settings = HashMap::from([
            ("late_return_ban_months".to_string(), "six".to_string()),
            ("reminder_3days_enabled".to_string(), "yes".to_string()),
        ]);
        let policy = LoanPolicy::from_settings(&settings);
        assert_eq!(policy.late_return_ban_months, 6);
        assert!(policy.reminder_3days_enabled);
    }

    #[test]
    fn test_to_settings_round_trip() {
        let policy = LoanPolicy {
            late_return_auto_ban: false,
            late_return_ban_months: 2,
            max_items_per_user: 9,
            reminder_3days_enabled: false,
            reminder_1day_enabled: true,
            overdue_notice_enabled: false,
        };
        let resolved = LoanPolicy::from_settings(&policy.to_settings());
        assert_eq!(resolved, policy);
    }
}
