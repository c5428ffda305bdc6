//! Owner authentication.

pub mod jwt;
