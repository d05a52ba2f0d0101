//! Leaderboard ranking: keep the fastest runs first, then order that pool by score.
//!
//! The two stages must stay separate. A record outside the fastest `limit` runs can
//! never be ranked, however high its score.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{RankedEntry, ScoreRecord};

pub const RANKING_LIMIT: usize = 3;

pub const UNKNOWN_PLAYER: &str = "Unknown";

/// The `limit` records with the smallest elapsed time. Equal times keep their input order.
pub fn candidate_pool(records: &[ScoreRecord], limit: usize) -> Vec<ScoreRecord> {
    let mut pool = records.to_vec();
    pool.sort_by(|a, b| a.elapsed_time.total_cmp(&b.elapsed_time));
    pool.truncate(limit);
    pool
}

/// Orders a candidate pool by descending score and keeps the first `limit`.
/// Equal scores go to the faster run, then to the older record.
pub fn rank_pool(mut pool: Vec<ScoreRecord>, limit: usize) -> Vec<ScoreRecord> {
    pool.sort_by(by_score_desc);
    pool.truncate(limit);
    pool
}

pub fn rank(records: &[ScoreRecord], limit: usize) -> Vec<ScoreRecord> {
    rank_pool(candidate_pool(records, limit), limit)
}

/// Attaches player names; ids missing from `names` get [`UNKNOWN_PLAYER`].
pub fn with_player_names(
    ranked: Vec<ScoreRecord>,
    names: &HashMap<i64, String>,
) -> Vec<RankedEntry> {
    ranked
        .into_iter()
        .map(|record| {
            let player_name = names
                .get(&record.user_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_PLAYER.to_string());
            RankedEntry {
                record,
                player_name,
            }
        })
        .collect()
}

fn by_score_desc(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.elapsed_time.total_cmp(&b.elapsed_time))
        .then_with(|| a.record_id.cmp(&b.record_id))
}
