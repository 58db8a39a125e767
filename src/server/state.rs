//! Application state management

use crate::inference::Predictor;
use chrono::{DateTime, Utc};

use super::ServerConfig;

/// Application state shared across handlers; never mutated after startup
pub struct AppState {
    pub config: ServerConfig,
    pub predictor: Predictor,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, predictor: Predictor) -> Self {
        Self {
            config,
            predictor,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}
