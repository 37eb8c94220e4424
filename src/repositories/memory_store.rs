use super::SeriesStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{Competitor, DailyObservation, NewCompetitor};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct StoreState {
    series: Vec<DailyObservation>,
    competitors: Vec<Competitor>,
}

/// In-process store for development and tests
#[derive(Debug, Default)]
pub struct InMemorySeriesStore {
    state: RwLock<StoreState>,
}

impl InMemorySeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with a series and compset
    pub fn with_data(mut series: Vec<DailyObservation>, competitors: Vec<Competitor>) -> Self {
        series.sort_by_key(|day| day.date);
        Self {
            state: RwLock::new(StoreState {
                series,
                competitors,
            }),
        }
    }
}

/// Clone the day, apply `edit`, and swap it in only if the edit succeeded
fn replace_day<F>(series: &mut [DailyObservation], date: NaiveDate, edit: F) -> StoreResult<()>
where
    F: FnOnce(&mut DailyObservation) -> crate::error::AppResult<()>,
{
    let slot = series
        .iter_mut()
        .find(|day| day.date == date)
        .ok_or_else(|| StoreError::NotFound(format!("No observation for {}", date)))?;

    let mut updated = slot.clone();
    edit(&mut updated).map_err(|e| StoreError::Rejected(e.to_string()))?;
    *slot = updated;
    Ok(())
}

#[async_trait]
impl SeriesStore for InMemorySeriesStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_series(&self) -> StoreResult<Vec<DailyObservation>> {
        Ok(self.state.read().await.series.clone())
    }

    async fn fetch_competitors(&self) -> StoreResult<Vec<Competitor>> {
        Ok(self.state.read().await.competitors.clone())
    }

    async fn update_rate(&self, date: NaiveDate, new_rate: Decimal) -> StoreResult<()> {
        let mut state = self.state.write().await;
        replace_day(&mut state.series, date, |day| day.set_adr(new_rate))
    }

    async fn update_competitor_rate(
        &self,
        date: NaiveDate,
        competitor_id: &str,
        new_rate: Decimal,
        active_ids: &BTreeSet<String>,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        replace_day(&mut state.series, date, |day| {
            day.set_competitor_rate(competitor_id, new_rate, active_ids)
        })
    }

    async fn seed_series(&self, series: &[DailyObservation]) -> StoreResult<()> {
        let mut sorted = series.to_vec();
        sorted.sort_by_key(|day| day.date);
        self.state.write().await.series = sorted;
        Ok(())
    }

    async fn add_competitor(&self, competitor: NewCompetitor) -> StoreResult<Competitor> {
        let created = Competitor::new(competitor.name, competitor.color);
        self.state.write().await.competitors.push(created.clone());
        Ok(created)
    }

    async fn remove_competitor(&self, competitor_id: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let before = state.competitors.len();
        state.competitors.retain(|c| c.id != competitor_id);

        if state.competitors.len() == before {
            return Err(StoreError::NotFound(format!("Competitor {} not found", competitor_id)));
        }
        Ok(())
    }
}
