//! Domain layer for the Taskboard backend.
//!
//! This crate contains:
//! - Domain models (User, Profile, Invitation, Task)
//! - Request/response types with validation
//! - The invitation state-resolution logic

pub mod models;
pub mod services;
