use super::SeriesStore;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{Competitor, DailyObservation, NewCompetitor};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Store backed by the platform REST API
pub struct RestSeriesStore {
    client: Client,
    base_url: String,
}

impl RestSeriesStore {
    /// Create a new REST store for `base_url` (e.g. `http://localhost:8000/api`)
    pub fn new(base_url: impl Into<String>, config: &StoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create from configuration; `None` when no API URL is configured
    pub fn from_config(config: &StoreConfig) -> StoreResult<Option<Self>> {
        config
            .api_url
            .as_deref()
            .map(|url| Self::new(url, config))
            .transpose()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn check_status(response: Response) -> StoreResult<Response> {
    response.error_for_status().map_err(StoreError::from)
}

#[async_trait]
impl SeriesStore for RestSeriesStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn fetch_series(&self) -> StoreResult<Vec<DailyObservation>> {
        let response = self.client.get(self.url("/daily-data")).send().await?;
        let mut series: Vec<DailyObservation> = check_status(response)?.json().await?;
        series.sort_by_key(|day| day.date);
        debug!("Fetched {} observations", series.len());
        Ok(series)
    }

    async fn fetch_competitors(&self) -> StoreResult<Vec<Competitor>> {
        let response = self.client.get(self.url("/competitors")).send().await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn update_rate(&self, date: NaiveDate, new_rate: Decimal) -> StoreResult<()> {
        let new_rate = new_rate
            .to_f64()
            .ok_or_else(|| StoreError::Rejected(format!("Rate {} not representable", new_rate)))?;

        let response = self
            .client
            .post(self.url("/rates/update"))
            .json(&json!({ "date": date.to_string(), "new_rate": new_rate }))
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn update_competitor_rate(
        &self,
        date: NaiveDate,
        competitor_id: &str,
        _new_rate: Decimal,
        _active_ids: &BTreeSet<String>,
    ) -> StoreResult<()> {
        // The backend exposes no competitor-rate endpoint; edits stay local.
        warn!(
            "Competitor rate for {} on {} not persisted: no backend endpoint",
            competitor_id, date
        );
        Ok(())
    }

    async fn seed_series(&self, series: &[DailyObservation]) -> StoreResult<()> {
        let response = self
            .client
            .post(self.url("/daily-data/seed"))
            .json(series)
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn add_competitor(&self, competitor: NewCompetitor) -> StoreResult<Competitor> {
        let response = self
            .client
            .post(self.url("/competitors"))
            .json(&competitor)
            .send()
            .await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn remove_competitor(&self, competitor_id: &str) -> StoreResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/competitors/{}", competitor_id)))
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }
}
