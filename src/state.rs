// src/state.rs

use crate::{config::Config, store::QuizStore};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

impl FromRef<AppState> for QuizStore {
    fn from_ref(state: &AppState) -> Self {
        QuizStore::new(state.pool.clone())
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
