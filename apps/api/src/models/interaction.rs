use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scored prompt/response cycle. Appended to the interaction log and
/// never mutated afterwards; the dashboard reads the log in aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub id: Uuid,
    pub content: String,
    pub complexity: f64,
    pub impact: f64,
    pub creativity: bool,
    pub unique_concept: bool,
    /// UTMi value computed at creation time, unrounded.
    pub utmi: f64,
    pub estimated_cost_usd: f64,
    pub created_at: DateTime<Utc>,
}
