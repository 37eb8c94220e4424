//! Access to the external time-series store.
//!
//! [`SeriesStore`] is the narrow seam the engine talks through: fetch the
//! series and compset, write rates back, and seed an empty store.

pub mod memory_store;
pub mod rest_store;

pub use memory_store::InMemorySeriesStore;
pub use rest_store::RestSeriesStore;

use crate::error::StoreResult;
use crate::models::{Competitor, DailyObservation, NewCompetitor};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Repository trait for the observation series and compset.
///
/// Implementations must be `Send + Sync` and must apply each write to a
/// single date atomically.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetch the series in ascending date order; may be empty
    async fn fetch_series(&self) -> StoreResult<Vec<DailyObservation>>;

    async fn fetch_competitors(&self) -> StoreResult<Vec<Competitor>>;

    /// Set ADR for one date and recompute its RevPAR
    async fn update_rate(&self, date: NaiveDate, new_rate: Decimal) -> StoreResult<()>;

    /// Set one competitor's rate for one date and recompute the market average
    async fn update_competitor_rate(
        &self,
        date: NaiveDate,
        competitor_id: &str,
        new_rate: Decimal,
        active_ids: &BTreeSet<String>,
    ) -> StoreResult<()>;

    /// Replace the whole series
    async fn seed_series(&self, series: &[DailyObservation]) -> StoreResult<()>;

    async fn add_competitor(&self, competitor: NewCompetitor) -> StoreResult<Competitor>;

    /// Remove a competitor identity; its historical rate entries stay
    async fn remove_competitor(&self, competitor_id: &str) -> StoreResult<()>;
}
