//! Repository implementations.

pub mod audit_log;
pub mod category;
pub mod department;
pub mod issue_record;
pub mod issue_request;
pub mod item;
pub mod setting;
pub mod transfer;
pub mod user;

pub use audit_log::AuditLogRepository;
pub use category::CategoryRepository;
pub use department::DepartmentRepository;
pub use issue_record::{IssueRecordRepository, ReminderFlag};
pub use issue_request::IssueRequestRepository;
pub use item::ItemRepository;
pub use setting::SettingRepository;
pub use transfer::TransferRepository;
pub use user::UserRepository;
