use std::sync::Arc;

use axum::Router;

use crate::store::{ScoreStore, UserStore};

mod scores;
mod users;

#[derive(Clone)]
pub struct AppState {
    pub scores: Arc<dyn ScoreStore>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new<S: ScoreStore + UserStore + 'static>(store: Arc<S>) -> Self {
        Self {
            scores: store.clone(),
            users: store,
        }
    }
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .merge(scores::router(state.clone()))
        .merge(users::router(state))
}
