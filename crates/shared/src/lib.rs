//! Shared utilities and common types for the LabTrack backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (token generation, hashing)
//! - Password hashing with Argon2id
//! - Common validation logic
//! - JWT session tokens
//! - Pagination types

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
