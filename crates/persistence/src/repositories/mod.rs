//! Repository implementations.

pub mod invitation;
pub mod task;
pub mod user;

pub use invitation::InvitationRepository;
pub use task::TaskRepository;
pub use user::UserRepository;
