//! Equipment category domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An equipment category governing borrow rules and audience visibility.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Longest allowed borrow duration for items in this category, in days.
    pub max_borrow_duration_days: i32,
    pub requires_approval: bool,
    pub visible_to_students: bool,
    pub visible_to_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub max_borrow_duration_days: i32,
    #[serde(default = "default_true")]
    pub requires_approval: bool,
    #[serde(default = "default_true")]
    pub visible_to_students: bool,
    #[serde(default = "default_true")]
    pub visible_to_staff: bool,
}

/// Request to update a category.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub max_borrow_duration_days: Option<i32>,
    pub requires_approval: Option<bool>,
    pub visible_to_students: Option<bool>,
    pub visible_to_staff: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_category_defaults() {
        let json = r#"{"name":"Oscilloscopes","max_borrow_duration_days":7}"#;
        let req: CreateCategoryRequest = serde_json::from_str(json).unwrap();
        assert!(req.requires_approval);
        assert!(req.visible_to_students);
        assert!(req.visible_to_staff);
    }
}
