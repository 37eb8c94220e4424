//! Domain models for the RevOp pricing engine.
//!
//! This module contains the daily observation series, the compset, and the
//! derived metrics and suggestions exposed to presentation.

pub mod competitor;
pub mod metrics;
pub mod observation;
pub mod suggestion;

// Re-export all models for convenient access
pub use competitor::{Competitor, NewCompetitor, COMPETITOR_COLORS};
pub use metrics::{DashboardMetrics, DayPosition, HighDemandDate, MarketPosition, Positioning};
pub use observation::{round_half_up, DailyObservation, MAX_RATE};
pub use suggestion::{
    ApplyOutcome, DemandLevel, PriceSuggestion, SuggestionStatus, TrackedSuggestion,
};
