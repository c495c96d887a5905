//! Audit log domain models.
//!
//! Audit entries are append-only and never read back by the lifecycle
//! engines; persistence failures are logged, not surfaced.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    UserRegister,
    UserApprove,
    UserRoleChange,
    UserDeactivate,
    UserReactivate,
    UserBan,
    UserUnban,
    UserDelete,
    DepartmentCreate,
    DepartmentUpdate,
    DepartmentDelete,
    InchargeAssign,
    InchargeRemove,
    CategoryCreate,
    CategoryUpdate,
    CategoryDelete,
    ItemCreate,
    ItemUpdate,
    ItemDelete,
    AccessGrant,
    AccessRevoke,
    RequestSubmit,
    RequestApprove,
    RequestReject,
    RequestCancel,
    ItemIssue,
    ItemReturn,
    TransferRequest,
    TransferApprove,
    TransferReject,
    TransferComplete,
    SettingUpdate,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserRegister => "user_register",
            AuditAction::UserApprove => "user_approve",
            AuditAction::UserRoleChange => "user_role_change",
            AuditAction::UserDeactivate => "user_deactivate",
            AuditAction::UserReactivate => "user_reactivate",
            AuditAction::UserBan => "user_ban",
            AuditAction::UserUnban => "user_unban",
            AuditAction::UserDelete => "user_delete",
            AuditAction::DepartmentCreate => "department_create",
            AuditAction::DepartmentUpdate => "department_update",
            AuditAction::DepartmentDelete => "department_delete",
            AuditAction::InchargeAssign => "incharge_assign",
            AuditAction::InchargeRemove => "incharge_remove",
            AuditAction::CategoryCreate => "category_create",
            AuditAction::CategoryUpdate => "category_update",
            AuditAction::CategoryDelete => "category_delete",
            AuditAction::ItemCreate => "item_create",
            AuditAction::ItemUpdate => "item_update",
            AuditAction::ItemDelete => "item_delete",
            AuditAction::AccessGrant => "access_grant",
            AuditAction::AccessRevoke => "access_revoke",
            AuditAction::RequestSubmit => "request_submit",
            AuditAction::RequestApprove => "request_approve",
            AuditAction::RequestReject => "request_reject",
            AuditAction::RequestCancel => "request_cancel",
            AuditAction::ItemIssue => "item_issue",
            AuditAction::ItemReturn => "item_return",
            AuditAction::TransferRequest => "transfer_request",
            AuditAction::TransferApprove => "transfer_approve",
            AuditAction::TransferReject => "transfer_reject",
            AuditAction::TransferComplete => "transfer_complete",
            AuditAction::SettingUpdate => "setting_update",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted audit entry.
#[derive(Debug, Clone, Serialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub changes: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an audit entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLogInput {
    pub actor_id: Option<Uuid>,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub changes: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_as_str() {
        assert_eq!(AuditAction::RequestSubmit.as_str(), "request_submit");
        assert_eq!(AuditAction::TransferComplete.as_str(), "transfer_complete");
        assert_eq!(AuditAction::UserUnban.to_string(), "user_unban");
    }

    #[test]
    fn test_action_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&AuditAction::ItemIssue).unwrap(),
            r#""item_issue""#
        );
    }
}
