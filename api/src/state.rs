use std::sync::Arc;

use crate::config::ApiConfig;
use crate::error::AppError;

/// Shared handler state. The API keeps no data between requests; callers
/// send the full snapshot every time.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Reject snapshots larger than the configured limit.
    pub fn check_snapshot_size(&self, field: &str, items: usize) -> Result<(), AppError> {
        let limit = self.config.max_snapshot_items;
        if items > limit {
            return Err(AppError::SnapshotTooLarge {
                field: field.to_string(),
                items,
                limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
impl AppState {
    pub fn for_tests() -> Self {
        Self::new(ApiConfig {
            max_snapshot_items: 10,
            ..ApiConfig::default()
        })
    }
}
