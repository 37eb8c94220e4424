use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display palette cycled through as competitors are added
pub const COMPETITOR_COLORS: [&str; 5] =
    ["#ec4899", "#f59e0b", "#06b6d4", "#8b5cf6", "#84cc16"];

/// Competitor property tracked in the compset.
///
/// Identity only; rates live inside each `DailyObservation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Competitor {
    /// Create a new Competitor with a fresh id
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// Palette colour for the competitor added after `existing` others
    pub fn palette_color(existing: usize) -> &'static str {
        COMPETITOR_COLORS[existing % COMPETITOR_COLORS.len()]
    }
}

/// Competitor payload before the store assigns an id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompetitor {
    pub name: String,
    pub color: String,
}
