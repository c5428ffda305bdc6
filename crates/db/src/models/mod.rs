//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod form;
pub mod form_block;
pub mod form_block_interaction;
pub mod form_session;
pub mod team;
pub mod user;
