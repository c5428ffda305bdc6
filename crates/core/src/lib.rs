//! Domain logic for forms: storyboard resolution, session metrics, the
//! template codec, short public identifiers and presentation helpers.
//!
//! Nothing in this crate touches the database or the network. The `db` and
//! `api` crates load rows, hand them to these functions and persist results.

pub mod assets;
pub mod error;
pub mod presentation;
pub mod publication;
pub mod sessions;
pub mod short_id;
pub mod storyboard;
pub mod template;
pub mod types;
