//! Department domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A department owning inventory items.
///
/// Incharge assignment is a many-to-many association: one department has at
/// most one incharge at a time, while an incharge may manage several
/// departments. The association is queried from the user side via
/// `departments_managed_by`.
#[derive(Debug, Clone, Serialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    /// 2-10 uppercase alphanumeric characters; prefix of every manual ID.
    pub code: String,
    pub incharge_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a department.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub code: String,
}

/// Request to update a department's name.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDepartmentRequest {
    pub name: String,
}

/// Request to assign an incharge to a department.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignInchargeRequest {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_department_deserialize() {
        let json = r#"{"name":"Mechanical Engineering","code":"MECH"}"#;
        let req: CreateDepartmentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.code, "MECH");
    }
}
