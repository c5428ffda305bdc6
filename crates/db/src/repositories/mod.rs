//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must join a
//! caller's transaction take `&mut PgConnection` and carry an `_in` suffix.

pub mod form_block_interaction_repo;
pub mod form_block_repo;
pub mod form_repo;
pub mod form_session_repo;
pub mod form_template_repo;
pub mod team_repo;
pub mod user_repo;

pub use form_block_interaction_repo::FormBlockInteractionRepo;
pub use form_block_repo::FormBlockRepo;
pub use form_repo::FormRepo;
pub use form_session_repo::FormSessionRepo;
pub use form_template_repo::FormTemplateRepo;
pub use team_repo::TeamRepo;
pub use user_repo::UserRepo;
