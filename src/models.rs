use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One player's best run for a (user, game, control) triple.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    #[sqlx(rename = "id")]
    pub record_id: i64,
    pub user_id: i64,
    pub game_id: i64,
    pub control_id: i64,
    pub score: i64,
    pub elapsed_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreKey {
    pub user_id: i64,
    pub game_id: i64,
    pub control_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub key: ScoreKey,
    pub score: i64,
    pub elapsed_time: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    #[serde(flatten)]
    pub record: ScoreRecord,
    pub player_name: String,
}

#[derive(FromRow, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub birth_date: NaiveDate,
    pub control_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub birth_date: NaiveDate,
    pub control_id: i64,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub control_id: i64,
}

/// Which unique user field an incoming name/email collides with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taken {
    Name,
    Email,
}
