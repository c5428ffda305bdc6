//! Repository for the `users` table.

use formkit_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

const COLUMNS: &str = "id, name, email, company_name, company_description, privacy_link, \
     legal_notice_link, privacy_contact_person, privacy_contact_email, created_at, updated_at";

/// Provides read and create operations for form owners.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users
                (name, email, company_name, company_description, privacy_link,
                 legal_notice_link, privacy_contact_person, privacy_contact_email)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.company_name)
            .bind(&input.company_description)
            .bind(&input.privacy_link)
            .bind(&input.legal_notice_link)
            .bind(&input.privacy_contact_person)
            .bind(&input.privacy_contact_email)
            .fetch_one(pool)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
