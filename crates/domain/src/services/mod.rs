pub mod audit;
pub mod ban;
pub mod due_dates;
pub mod eligibility;
pub mod manual_id;

pub use audit::AuditLogBuilder;
pub use ban::{late_return_ban, BanOutcome};
pub use due_dates::{days_until_due, ReminderMilestone};
pub use eligibility::{check_borrow_eligibility, EligibilityError};
pub use manual_id::{format_manual_id, is_valid_manual_id, parse_manual_id};
