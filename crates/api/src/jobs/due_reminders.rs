//! Reminder engine for open loans.
//!
//! Sweeps open returnable loans on an interval, sends due-date reminders
//! and overdue notices, and flips the one-shot sent flags. Each flag flip
//! is claimed inside a transaction that commits only after the email send
//! succeeds: concurrent instances never double-send, and a failed send
//! leaves the flag clear so the next sweep retries.

use sqlx::PgPool;
use tracing::{debug, warn};

use super::scheduler::{Job, JobFrequency};
use crate::services::email::EmailService;
use domain::services::{days_until_due, ReminderMilestone};
use persistence::entities::OpenLoanEntity;
use persistence::repositories::{IssueRecordRepository, ReminderFlag, SettingRepository};

/// Job that sends borrowers reminders about upcoming and missed return dates.
pub struct DueRemindersJob {
    pool: PgPool,
    email: EmailService,
    interval_minutes: u64,
}

impl DueRemindersJob {
    pub fn new(pool: PgPool, email: EmailService, interval_minutes: u64) -> Self {
        Self {
            pool,
            email,
            interval_minutes,
        }
    }

    async fn process_loan(
        &self,
        records: &IssueRecordRepository,
        loan: &OpenLoanEntity,
        milestone: ReminderMilestone,
        days_left: i64,
    ) -> Result<bool, String> {
        let flag = match milestone {
            ReminderMilestone::DueInThreeDays => ReminderFlag::ThreeDays,
            ReminderMilestone::DueTomorrow => ReminderFlag::OneDay,
            ReminderMilestone::Overdue { .. } => ReminderFlag::Overdue,
        };

        // Claim the flag; None means another sweep already sent this one.
        // The claim stays uncommitted until the send goes through.
        let Some(tx) = records
            .begin_reminder_claim(loan.id, flag)
            .await
            .map_err(|e| format!("failed to claim reminder flag: {}", e))?
        else {
            debug!(record_id = %loan.id, "Reminder already sent, skipping");
            return Ok(false);
        };

        let send_result = match milestone {
            ReminderMilestone::Overdue { days_overdue } => {
                self.email
                    .send_overdue_notice(
                        &loan.borrower_email,
                        &loan.borrower_name,
                        &loan.item_name,
                        &loan.item_manual_id,
                        loan.expected_return_date,
                        days_overdue,
                    )
                    .await
            }
            _ => {
                self.email
                    .send_due_reminder(
                        &loan.borrower_email,
                        &loan.borrower_name,
                        &loan.item_name,
                        &loan.item_manual_id,
                        loan.expected_return_date,
                        days_left,
                    )
                    .await
            }
        };

        match send_result {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|e| format!("failed to commit reminder flag: {}", e))?;
                Ok(true)
            }
            Err(e) => {
                // Roll the claim back; the flag stays clear and the next
                // sweep retries the send.
                warn!(
                    record_id = %loan.id,
                    to = %loan.borrower_email,
                    error = %e,
                    "Failed to send reminder email"
                );
                if let Err(e) = tx.rollback().await {
                    warn!(record_id = %loan.id, error = %e, "Reminder claim rollback failed");
                }
                Ok(false)
            }
        }
    }
}

#[async_trait::async_trait]
impl Job for DueRemindersJob {
    fn name(&self) -> &'static str {
        "due_reminders"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        let settings = SettingRepository::new(self.pool.clone());
        let policy = settings
            .load_policy()
            .await
            .map_err(|e| format!("failed to load loan policy: {}", e))?;

        if !policy.reminder_3days_enabled
            && !policy.reminder_1day_enabled
            && !policy.overdue_notice_enabled
        {
            debug!("All reminder notices disabled, skipping sweep");
            return Ok(());
        }

        let records = IssueRecordRepository::new(self.pool.clone());
        let open_loans = records
            .list_open_with_context()
            .await
            .map_err(|e| format!("failed to list open loans: {}", e))?;

        let now = chrono::Utc::now();
        let mut sent = 0usize;

        for loan in &open_loans {
            let days_left = days_until_due(loan.expected_return_date, now);
            let Some(milestone) = ReminderMilestone::for_days_until_due(days_left) else {
                continue;
            };

            let (enabled, already_sent) = match milestone {
                ReminderMilestone::DueInThreeDays => {
                    (policy.reminder_3days_enabled, loan.reminder_3days_sent)
                }
                ReminderMilestone::DueTomorrow => {
                    (policy.reminder_1day_enabled, loan.reminder_1day_sent)
                }
                ReminderMilestone::Overdue { .. } => {
                    (policy.overdue_notice_enabled, loan.overdue_sent)
                }
            };

            if !enabled || already_sent {
                continue;
            }

            if self
                .process_loan(&records, loan, milestone, days_left)
                .await?
            {
                sent += 1;
            }
        }

        if sent > 0 {
            tracing::info!(
                open_loans = open_loans.len(),
                reminders_sent = sent,
                "Reminder sweep completed"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_follows_configuration() {
        // Can't build a PgPool in unit tests; frequency math is what matters.
        let freq = JobFrequency::Minutes(45);
        assert_eq!(freq.duration().as_secs(), 45 * 60);
    }
}
