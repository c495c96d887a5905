//! Entity definitions (database row mappings).

pub mod audit_log;
pub mod category;
pub mod department;
pub mod issue_record;
pub mod issue_request;
pub mod item;
pub mod setting;
pub mod transfer;
pub mod user;

pub use audit_log::AuditLogEntity;
pub use category::CategoryEntity;
pub use department::DepartmentEntity;
pub use issue_record::{IssueRecordEntity, OpenLoanEntity};
pub use issue_request::{IssueRequestEntity, IssueRequestStatusDb};
pub use item::{ItemAccessEntity, ItemConditionDb, ItemEntity, ItemStatusDb};
pub use setting::SettingEntity;
pub use transfer::{TransferRecordEntity, TransferRequestEntity, TransferRequestStatusDb};
pub use user::{UserEntity, UserRoleDb};
