use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ScoreStore, StoreError, UserStore};
use crate::models::{NewScore, NewUser, ProfileUpdate, ScoreKey, ScoreRecord, Taken, User};

#[derive(Default)]
struct Tables {
    next_id: i64,
    scores: Vec<ScoreRecord>,
    users: Vec<User>,
}

fn key_of(record: &ScoreRecord) -> ScoreKey {
    ScoreKey {
        user_id: record.user_id,
        game_id: record.game_id,
        control_id: record.control_id,
    }
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Vec-backed store for tests. `fail_scores` / `fail_names` force storage errors.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_scores: AtomicBool,
    fail_names: AtomicBool,
}

impl MemoryStore {
    pub fn fail_scores(&self, fail: bool) {
        self.fail_scores.store(fail, Ordering::SeqCst);
    }

    pub fn fail_names(&self, fail: bool) {
        self.fail_names.store(fail, Ordering::SeqCst);
    }

    pub async fn score_count(&self) -> usize {
        self.tables.read().await.scores.len()
    }

    fn check(flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn find_score(&self, key: ScoreKey) -> Result<Option<ScoreRecord>, StoreError> {
        Self::check(&self.fail_scores)?;
        let tables = self.tables.read().await;
        Ok(tables.scores.iter().find(|r| key_of(r) == key).cloned())
    }

    async fn insert_score(&self, score: &NewScore) -> Result<ScoreRecord, StoreError> {
        Self::check(&self.fail_scores)?;
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.scores.iter_mut().find(|r| key_of(r) == score.key) {
            existing.score = score.score;
            existing.elapsed_time = score.elapsed_time;
            return Ok(existing.clone());
        }
        let record = ScoreRecord {
            record_id: tables.next_id(),
            user_id: score.key.user_id,
            game_id: score.key.game_id,
            control_id: score.key.control_id,
            score: score.score,
            elapsed_time: score.elapsed_time,
        };
        tables.scores.push(record.clone());
        Ok(record)
    }

    async fn update_score(
        &self,
        record_id: i64,
        score: i64,
        elapsed_time: f64,
    ) -> Result<ScoreRecord, StoreError> {
        Self::check(&self.fail_scores)?;
        let mut tables = self.tables.write().await;
        let record = tables
            .scores
            .iter_mut()
            .find(|r| r.record_id == record_id)
            .ok_or(StoreError::Vanished(record_id))?;
        record.score = score;
        record.elapsed_time = elapsed_time;
        Ok(record.clone())
    }

    async fn scores_for(
        &self,
        game_id: i64,
        control_id: i64,
    ) -> Result<Vec<ScoreRecord>, StoreError> {
        Self::check(&self.fail_scores)?;
        let tables = self.tables.read().await;
        Ok(tables
            .scores
            .iter()
            .filter(|r| r.game_id == game_id && r.control_id == control_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_taken(
        &self,
        name: &str,
        email: &str,
        except: Option<i64>,
    ) -> Result<Option<Taken>, StoreError> {
        let tables = self.tables.read().await;
        let others = || tables.users.iter().filter(move |u| Some(u.id) != except);
        if others().any(|u| u.name == name) {
            return Ok(Some(Taken::Name));
        }
        if others().any(|u| u.email == email) {
            return Ok(Some(Taken::Email));
        }
        Ok(None)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = User {
            id: tables.next_id(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            birth_date: user.birth_date,
            control_id: Some(user.control_id),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.name = update.name.clone();
        user.email = update.email.clone();
        user.birth_date = update.birth_date;
        user.control_id = Some(update.control_id);
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }
        tables.scores.retain(|r| r.user_id != id);
        Ok(true)
    }

    async fn display_names(&self, ids: &[i64]) -> Result<HashMap<i64, String>, StoreError> {
        Self::check(&self.fail_names)?;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(|u| (u.id, u.name.clone()))
            .collect())
    }
}
