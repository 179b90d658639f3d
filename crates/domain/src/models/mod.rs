//! Domain models.

pub mod invitation;
pub mod task;
pub mod user;
