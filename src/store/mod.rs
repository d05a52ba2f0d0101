use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewScore, NewUser, ProfileUpdate, ScoreKey, ScoreRecord, Taken, User};

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record {0} disappeared during update")]
    Vanished(i64),
}

/// Persistence for score records. A missing row is `Ok(None)`, never an error.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn find_score(&self, key: ScoreKey) -> Result<Option<ScoreRecord>, StoreError>;

    /// Inserts a record for the triple; a concurrent insert for the same triple is overwritten.
    async fn insert_score(&self, score: &NewScore) -> Result<ScoreRecord, StoreError>;

    async fn update_score(
        &self,
        record_id: i64,
        score: i64,
        elapsed_time: f64,
    ) -> Result<ScoreRecord, StoreError>;

    /// All records for a game/control pair in insertion order.
    async fn scores_for(&self, game_id: i64, control_id: i64)
        -> Result<Vec<ScoreRecord>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Reports whether `name` or `email` already belongs to a user other than `except`.
    async fn find_taken(
        &self,
        name: &str,
        email: &str,
        except: Option<i64>,
    ) -> Result<Option<Taken>, StoreError>;

    async fn create_user(&self, user: &NewUser) -> Result<User, StoreError>;

    async fn update_profile(
        &self,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, StoreError>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), StoreError>;

    /// Removes the user together with their scores and control association.
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;

    async fn display_names(&self, ids: &[i64]) -> Result<HashMap<i64, String>, StoreError>;
}
