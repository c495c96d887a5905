//! HTTP route handlers.

pub mod audit_logs;
pub mod auth;
pub mod categories;
pub mod departments;
pub mod health;
pub mod issue_records;
pub mod issue_requests;
pub mod items;
pub mod settings;
pub mod transfers;
pub mod users;

use serde::Serialize;
use shared::pagination::PageInfo;

/// Envelope for paginated list responses.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page_info: PageInfo) -> Self {
        Self { data, page_info }
    }
}
