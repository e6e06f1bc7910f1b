//! Member repository.
//!
//! Members are created through the explicit factory here; no operation in
//! the engine ever creates a member as a side effect of an unrelated read.
//! Ledger and investment operations require the member to already exist.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, Set,
    Statement,
};
use uuid::Uuid;

use crate::entities::members;

/// Prefix for generated account numbers.
const ACCOUNT_NUMBER_PREFIX: &str = "AKB";

/// Error types for member operations.
#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    /// Member not found.
    #[error("Member not found: {0}")]
    NotFound(Uuid),

    /// Display name must not be empty.
    #[error("Display name must not be empty")]
    EmptyDisplayName,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<MemberError> for akiba_shared::AppError {
    fn from(err: MemberError) -> Self {
        match err {
            MemberError::NotFound(_) => Self::NotFound(err.to_string()),
            MemberError::EmptyDisplayName => Self::Validation(err.to_string()),
            MemberError::Database(_) => Self::Database(err.to_string()),
        }
    }
}

/// Member repository for account lifecycle operations.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a member account with a generated account number.
    ///
    /// The number is `AKB-<initials><sequence>`, with the sequence drawn
    /// from a database sequence so concurrent creations can never collide.
    ///
    /// # Errors
    ///
    /// Returns an error if the display name is empty or the insert fails.
    pub async fn create_member(&self, display_name: &str) -> Result<members::Model, MemberError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(MemberError::EmptyDisplayName);
        }

        let account_number = self.next_account_number(display_name).await?;
        let now = Utc::now().into();

        let member = members::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_number: Set(account_number),
            display_name: Set(display_name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = member.insert(&self.db).await?;
        tracing::info!(
            member = %inserted.id,
            account_number = %inserted.account_number,
            "member created"
        );
        Ok(inserted)
    }

    /// Gets a member by ID.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::NotFound` if no such member exists.
    pub async fn get_member(&self, member_id: Uuid) -> Result<members::Model, MemberError> {
        members::Entity::find_by_id(member_id)
            .one(&self.db)
            .await?
            .ok_or(MemberError::NotFound(member_id))
    }

    /// Lists all members.
    pub async fn list_members(&self) -> Result<Vec<members::Model>, MemberError> {
        Ok(members::Entity::find().all(&self.db).await?)
    }

    /// Reserves the next account number from the database sequence.
    async fn next_account_number(&self, display_name: &str) -> Result<String, MemberError> {
        let row = self
            .db
            .query_one(Statement::from_string(
                DbBackend::Postgres,
                "SELECT nextval('member_account_seq') AS seq",
            ))
            .await?
            .ok_or_else(|| DbErr::Custom("account sequence returned no row".to_string()))?;
        let seq: i64 = row.try_get("", "seq")?;

        Ok(format!(
            "{ACCOUNT_NUMBER_PREFIX}-{}{seq:04}",
            initials(display_name)
        ))
    }
}

/// Uppercase initials of the first two name words, padded with 'X'.
fn initials(display_name: &str) -> String {
    let mut letters = display_name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .map(|c| c.to_ascii_uppercase());

    let first = letters.next().unwrap_or('X');
    let second = letters.next().unwrap_or('X');
    format!("{first}{second}")
}
