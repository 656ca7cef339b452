pub mod health;
pub mod risk;
pub mod scales;
pub mod surveys;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata attached to every computed response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ComputedMeta {
    /// When this response was derived. Values are recomputed per request.
    pub computed_at: DateTime<Utc>,
    pub engine_version: String,
}

impl ComputedMeta {
    pub fn now() -> Self {
        Self {
            computed_at: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
