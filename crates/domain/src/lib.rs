//! Domain layer for the LabTrack backend.
//!
//! This crate contains:
//! - Domain models (User, Department, Item, IssueRequest, IssueRecord, ...)
//! - Pure business-logic services (eligibility, due dates, ban policy)
//! - Domain error types

pub mod models;
pub mod services;
