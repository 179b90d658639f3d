//! Entity definitions (database row mappings).

pub mod invitation;
pub mod task;
pub mod user;

pub use invitation::InvitationEntity;
pub use task::TaskEntity;
pub use user::{ProfileEntity, UserEntity};
