use std::collections::HashMap;

use serde::Deserialize;

use crate::error::AppError;
use crate::models::{NewScore, RankedEntry, ScoreKey, ScoreRecord};
use crate::ranking;
use crate::store::{ScoreStore, UserStore};

/// Score submission body. Accepts the original Portuguese field names and English ones.
#[derive(Deserialize, Debug, Default)]
pub struct ScoreSubmission {
    #[serde(alias = "pontuacao")]
    pub score: Option<i64>,
    #[serde(alias = "tempo", alias = "elapsedTime")]
    pub time: Option<f64>,
    #[serde(alias = "id_usuario", alias = "userId")]
    pub user_id: Option<i64>,
    #[serde(alias = "id_jogo", alias = "gameId")]
    pub game_id: Option<i64>,
    #[serde(alias = "id_controle", alias = "controlId")]
    pub control_id: Option<i64>,
}

impl ScoreSubmission {
    fn validate(self) -> Result<NewScore, AppError> {
        let (Some(score), Some(elapsed_time), Some(user_id), Some(game_id), Some(control_id)) = (
            self.score,
            self.time,
            self.user_id,
            self.game_id,
            self.control_id,
        ) else {
            return Err(AppError::validation(
                "score, time, userId, gameId and controlId are required",
            ));
        };
        if !elapsed_time.is_finite() || elapsed_time < 0.0 {
            return Err(AppError::validation("time must be a non-negative number"));
        }
        Ok(NewScore {
            key: ScoreKey {
                user_id,
                game_id,
                control_id,
            },
            score,
            elapsed_time,
        })
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct RankingQuery {
    #[serde(alias = "id_jogo", alias = "gameId")]
    pub game_id: Option<i64>,
    #[serde(alias = "id_controle", alias = "controlId")]
    pub control_id: Option<i64>,
}

#[derive(Debug, PartialEq)]
pub enum Submitted {
    Created(ScoreRecord),
    Updated(ScoreRecord),
}

/// Creates the record for the submission's triple, or overwrites score and time in place.
pub async fn submit_score(
    store: &dyn ScoreStore,
    submission: ScoreSubmission,
) -> Result<Submitted, AppError> {
    let new_score = submission.validate()?;

    match store.find_score(new_score.key).await? {
        Some(existing) => {
            let record = store
                .update_score(existing.record_id, new_score.score, new_score.elapsed_time)
                .await?;
            tracing::info!(record_id = record.record_id, "score updated");
            Ok(Submitted::Updated(record))
        }
        None => {
            let record = store.insert_score(&new_score).await?;
            tracing::info!(record_id = record.record_id, "score created");
            Ok(Submitted::Created(record))
        }
    }
}

/// Best scores among the fastest runs for a game/control pair, with player names.
///
/// A failed name lookup does not fail the ranking; every player shows as unknown instead.
pub async fn top_rankings(
    scores: &dyn ScoreStore,
    users: &dyn UserStore,
    query: RankingQuery,
) -> Result<Vec<RankedEntry>, AppError> {
    let (Some(game_id), Some(control_id)) = (query.game_id, query.control_id) else {
        return Err(AppError::validation("gameId and controlId are required"));
    };

    let records = scores.scores_for(game_id, control_id).await?;
    let ranked = ranking::rank(&records, ranking::RANKING_LIMIT);

    let user_ids: Vec<i64> = ranked.iter().map(|r| r.user_id).collect();
    let names = match users.display_names(&user_ids).await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(error = %e, game_id, control_id, "player name lookup failed");
            HashMap::new()
        }
    };

    Ok(ranking::with_player_names(ranked, &names))
}
