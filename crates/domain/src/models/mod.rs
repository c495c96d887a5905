//! Domain models for LabTrack.

pub mod audit_log;
pub mod category;
pub mod department;
pub mod issue_record;
pub mod issue_request;
pub mod item;
pub mod setting;
pub mod transfer;
pub mod user;

pub use audit_log::{AuditAction, AuditLog, CreateAuditLogInput};
pub use category::Category;
pub use department::Department;
pub use issue_record::{IssueRecord, ReturnCondition};
pub use issue_request::{IssueRequest, IssueRequestStatus};
pub use item::{Item, ItemCondition, ItemStatus};
pub use setting::LoanPolicy;
pub use transfer::{TransferRecord, TransferRequest, TransferRequestStatus};
pub use user::{User, UserRole};
