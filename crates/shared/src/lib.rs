//! Shared utilities and common types for the Taskboard backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password hashing with Argon2id
//! - JWT token issuance and validation
//! - Invitation token generation
//! - Common validation logic

pub mod jwt;
pub mod password;
pub mod token;
pub mod validation;
