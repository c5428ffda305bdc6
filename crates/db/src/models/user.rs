//! User entity model and DTOs.

use formkit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A form owner from the `users` table.
///
/// Only the company and privacy details forms fall back to are stored;
/// credentials live with the identity provider.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub privacy_link: Option<String>,
    pub legal_notice_link: Option<String>,
    pub privacy_contact_person: Option<String>,
    pub privacy_contact_email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub privacy_link: Option<String>,
    pub legal_notice_link: Option<String>,
    pub privacy_contact_person: Option<String>,
    pub privacy_contact_email: Option<String>,
}
