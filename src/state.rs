use crate::config::Config;
use crate::db::DbPool;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Calendar day that deadlines are compared against.
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
