//! Application services.

pub mod auth;
pub mod email;
pub mod invitations;
