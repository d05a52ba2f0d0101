use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{ScoreStore, StoreError, UserStore};
use crate::models::{NewScore, NewUser, ProfileUpdate, ScoreKey, ScoreRecord, Taken, User};

const SCORE_COLUMNS: &str = "id, user_id, game_id, control_id, score, elapsed_time";

const SELECT_USER: &str = "
    SELECT u.id, u.name, u.email, u.password_hash, u.birth_date, c.control_id
    FROM users u
    LEFT JOIN user_controls c ON c.user_id = u.id";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreStore for PgStore {
    async fn find_score(&self, key: ScoreKey) -> Result<Option<ScoreRecord>, StoreError> {
        let record = sqlx::query_as::<_, ScoreRecord>(&format!(
            "SELECT {SCORE_COLUMNS} FROM scores
                WHERE user_id = $1 AND game_id = $2 AND control_id = $3"
        ))
        .bind(key.user_id)
        .bind(key.game_id)
        .bind(key.control_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn insert_score(&self, score: &NewScore) -> Result<ScoreRecord, StoreError> {
        let record = sqlx::query_as::<_, ScoreRecord>(&format!(
            "INSERT INTO scores (user_id, game_id, control_id, score, elapsed_time)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, game_id, control_id)
                DO UPDATE SET score = EXCLUDED.score, elapsed_time = EXCLUDED.elapsed_time
                RETURNING {SCORE_COLUMNS}"
        ))
        .bind(score.key.user_id)
        .bind(score.key.game_id)
        .bind(score.key.control_id)
        .bind(score.score)
        .bind(score.elapsed_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_score(
        &self,
        record_id: i64,
        score: i64,
        elapsed_time: f64,
    ) -> Result<ScoreRecord, StoreError> {
        sqlx::query_as::<_, ScoreRecord>(&format!(
            "UPDATE scores SET score = $2, elapsed_time = $3
                WHERE id = $1 RETURNING {SCORE_COLUMNS}"
        ))
        .bind(record_id)
        .bind(score)
        .bind(elapsed_time)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::Vanished(record_id))
    }

    async fn scores_for(
        &self,
        game_id: i64,
        control_id: i64,
    ) -> Result<Vec<ScoreRecord>, StoreError> {
        let records = sqlx::query_as::<_, ScoreRecord>(&format!(
            "SELECT {SCORE_COLUMNS} FROM scores
                WHERE game_id = $1 AND control_id = $2
                ORDER BY id ASC"
        ))
        .bind(game_id)
        .bind(control_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE u.email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_taken(
        &self,
        name: &str,
        email: &str,
        except: Option<i64>,
    ) -> Result<Option<Taken>, StoreError> {
        // Name collisions win over email collisions when both exist.
        let hit: Option<(bool,)> = sqlx::query_as(
            "SELECT name = $1 AS name_taken FROM users
                WHERE (name = $1 OR email = $2) AND ($3::BIGINT IS NULL OR id <> $3)
                ORDER BY (name = $1) DESC
                LIMIT 1",
        )
        .bind(name)
        .bind(email)
        .bind(except)
        .fetch_optional(&self.pool)
        .await?;
        Ok(hit.map(|(name_taken,)| if name_taken { Taken::Name } else { Taken::Email }))
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut transaction = self.pool.begin().await?;
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO users (name, email, password_hash, birth_date)
                VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.birth_date)
        .fetch_one(&mut *transaction)
        .await?;
        sqlx::query("INSERT INTO user_controls (user_id, control_id) VALUES ($1, $2)")
            .bind(id)
            .bind(user.control_id)
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await?;

        Ok(User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            birth_date: user.birth_date,
            control_id: Some(user.control_id),
        })
    }

    async fn update_profile(
        &self,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let mut transaction = self.pool.begin().await?;
        let updated: Option<(i64,)> = sqlx::query_as(
            "UPDATE users SET name = $2, email = $3, birth_date = $4
                WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(update.birth_date)
        .fetch_optional(&mut *transaction)
        .await?;
        if updated.is_none() {
            return Ok(None);
        }
        sqlx::query(
            "INSERT INTO user_controls (user_id, control_id) VALUES ($1, $2)
                ON CONFLICT (user_id) DO UPDATE SET control_id = EXCLUDED.control_id",
        )
        .bind(id)
        .bind(update.control_id)
        .execute(&mut *transaction)
        .await?;
        transaction.commit().await?;

        self.find_user(id).await
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut transaction = self.pool.begin().await?;
        sqlx::query("DELETE FROM scores WHERE user_id = $1")
            .bind(id)
            .execute(&mut *transaction)
            .await?;
        sqlx::query("DELETE FROM user_controls WHERE user_id = $1")
            .bind(id)
            .execute(&mut *transaction)
            .await?;
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *transaction)
            .await?
            .rows_affected();
        transaction.commit().await?;
        Ok(deleted > 0)
    }

    async fn display_names(&self, ids: &[i64]) -> Result<HashMap<i64, String>, StoreError> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }
}
