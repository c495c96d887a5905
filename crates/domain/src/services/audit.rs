//! Audit logging service for tracking user and system actions.
//!
//! Provides convenient methods for creating audit log entries from route
//! handlers. Entries are inserted asynchronously so they never block or fail
//! the request that produced them.

use crate::models::{AuditAction, CreateAuditLogInput};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Builder for creating audit log entries with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditLogBuilder {
    actor_id: Option<Uuid>,
    action: AuditAction,
    entity_type: String,
    entity_id: Option<String>,
    changes: Option<Map<String, Value>>,
}

impl AuditLogBuilder {
    /// Create a new audit log builder for an action taken by a user.
    pub fn user_action(actor_id: Uuid, action: AuditAction) -> Self {
        Self {
            actor_id: Some(actor_id),
            action,
            entity_type: String::new(),
            entity_id: None,
            changes: None,
        }
    }

    /// Create a new audit log builder for a system action (batch jobs).
    pub fn system_action(action: AuditAction) -> Self {
        Self {
            actor_id: None,
            action,
            entity_type: String::new(),
            entity_id: None,
            changes: None,
        }
    }

    /// Set the entity being acted upon.
    pub fn on_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set just the entity type (when no ID is available).
    pub fn on_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self
    }

    /// Record an old/new value pair for one field.
    pub fn with_change(
        mut self,
        field: impl Into<String>,
        old: Option<String>,
        new: Option<String>,
    ) -> Self {
        let changes = self.changes.get_or_insert_with(Map::new);
        changes.insert(field.into(), json!({ "old": old, "new": new }));
        self
    }

    /// Record an arbitrary detail value.
    pub fn with_detail(mut self, field: impl Into<String>, value: Value) -> Self {
        let changes = self.changes.get_or_insert_with(Map::new);
        changes.insert(field.into(), value);
        self
    }

    /// Build the CreateAuditLogInput.
    pub fn build(self) -> CreateAuditLogInput {
        CreateAuditLogInput {
            actor_id: self.actor_id,
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            changes: self.changes.map(Value::Object),
        }
    }
}

/// Convenience functions for common audit log patterns.
pub mod audit_helpers {
    use super::*;

    pub fn request_submitted(user_id: Uuid, request_id: Uuid, item_id: Uuid) -> CreateAuditLogInput {
        AuditLogBuilder::user_action(user_id, AuditAction::RequestSubmit)
            .on_entity("issue_request", request_id.to_string())
            .with_detail("item_id", json!(item_id.to_string()))
            .build()
    }

    pub fn request_approved(reviewer_id: Uuid, request_id: Uuid) -> CreateAuditLogInput {
        AuditLogBuilder::user_action(reviewer_id, AuditAction::RequestApprove)
            .on_entity("issue_request", request_id.to_string())
            .build()
    }

    pub fn request_rejected(reviewer_id: Uuid, request_id: Uuid, reason: &str) -> CreateAuditLogInput {
        AuditLogBuilder::user_action(reviewer_id, AuditAction::RequestReject)
            .on_entity("issue_request", request_id.to_string())
            .with_detail("reason", json!(reason))
            .build()
    }

    pub fn request_cancelled(user_id: Uuid, request_id: Uuid) -> CreateAuditLogInput {
        AuditLogBuilder::user_action(user_id, AuditAction::RequestCancel)
            .on_entity("issue_request", request_id.to_string())
            .build()
    }

    pub fn item_issued(issuer_id: Uuid, record_id: Uuid, item_id: Uuid) -> CreateAuditLogInput {
        AuditLogBuilder::user_action(issuer_id, AuditAction::ItemIssue)
            .on_entity("issue_record", record_id.to_string())
            .with_detail("item_id", json!(item_id.to_string()))
            .build()
    }

    pub fn item_returned(
        receiver_id: Uuid,
        record_id: Uuid,
        condition: &str,
        days_overdue: i64,
    ) -> CreateAuditLogInput {
        AuditLogBuilder::user_action(receiver_id, AuditAction::ItemReturn)
            .on_entity("issue_record", record_id.to_string())
            .with_detail("return_condition", json!(condition))
            .with_detail("days_overdue", json!(days_overdue))
            .build()
    }

    pub fn user_banned(record_id: Uuid, user_id: Uuid, banned_until: &str) -> CreateAuditLogInput {
        AuditLogBuilder::system_action(AuditAction::UserBan)
            .on_entity("user", user_id.to_string())
            .with_change("banned_until", None, Some(banned_until.to_string()))
            .with_detail("issue_record_id", json!(record_id.to_string()))
            .build()
    }

    pub fn transfer_requested(
        user_id: Uuid,
        transfer_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> CreateAuditLogInput {
        AuditLogBuilder::user_action(user_id, AuditAction::TransferRequest)
            .on_entity("transfer_request", transfer_id.to_string())
            .with_detail("item_id", json!(item_id.to_string()))
            .with_detail("quantity", json!(quantity))
            .build()
    }

    pub fn transfer_completed(actor_id: Uuid, transfer_id: Uuid, record_id: Uuid) -> CreateAuditLogInput {
        AuditLogBuilder::user_action(actor_id, AuditAction::TransferComplete)
            .on_entity("transfer_request", transfer_id.to_string())
            .with_detail("transfer_record_id", json!(record_id.to_string()))
            .build()
    }

    pub fn role_changed(
        actor_id: Uuid,
        target_user_id: Uuid,
        old_role: &str,
        new_role: &str,
    ) -> CreateAuditLogInput {
        AuditLogBuilder::user_action(actor_id, AuditAction::UserRoleChange)
            .on_entity("user", target_user_id.to_string())
            .with_change("role", Some(old_role.to_string()), Some(new_role.to_string()))
            .build()
    }

    pub fn setting_updated(
        actor_id: Uuid,
        key: &str,
        old_value: Option<String>,
        new_value: &str,
    ) -> CreateAuditLogInput {
        AuditLogBuilder::user_action(actor_id, AuditAction::SettingUpdate)
            .on_entity("setting", key)
            .with_change("value", old_value, Some(new_value.to_string()))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_action_builder() {
        let actor = Uuid::new_v4();
        let input = AuditLogBuilder::user_action(actor, AuditAction::ItemCreate)
            .on_entity("item", "CSE-001")
            .build();

        assert_eq!(input.actor_id, Some(actor));
        assert_eq!(input.action, AuditAction::ItemCreate);
        assert_eq!(input.entity_type, "item");
        assert_eq!(input.entity_id, Some("CSE-001".to_string()));
        assert!(input.changes.is_none());
    }

    #[test]
    fn test_system_action_builder() {
        let input = AuditLogBuilder::system_action(AuditAction::UserBan)
            .on_entity_type("user")
            .build();

        assert_eq!(input.actor_id, None);
        assert_eq!(input.entity_id, None);
    }

    #[test]
    fn test_with_change() {
        let actor = Uuid::new_v4();
        let input = AuditLogBuilder::user_action(actor, AuditAction::UserRoleChange)
            .on_entity("user", "abc")
            .with_change("role", Some("student".to_string()), Some("staff".to_string()))
            .build();

        let changes = input.changes.unwrap();
        assert_eq!(changes["role"]["old"], "student");
        assert_eq!(changes["role"]["new"], "staff");
    }

    #[test]
    fn test_item_returned_helper() {
        let receiver = Uuid::new_v4();
        let record = Uuid::new_v4();
        let input = audit_helpers::item_returned(receiver, record, "damaged", 2);

        assert_eq!(input.action, AuditAction::ItemReturn);
        assert_eq!(input.entity_type, "issue_record");
        let changes = input.changes.unwrap();
        assert_eq!(changes["return_condition"], "damaged");
        assert_eq!(changes["days_overdue"], 2);
    }

    #[test]
    fn test_user_banned_helper() {
        let record = Uuid::new_v4();
        let user = Uuid::new_v4();
        let input = audit_helpers::user_banned(record, user, "2026-12-01");

        assert_eq!(input.actor_id, None);
        assert_eq!(input.action, AuditAction::UserBan);
        assert!(input.changes.is_some());
    }
}
