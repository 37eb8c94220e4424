//! Pricing recommendation engine.
//!
//! A [`PricingAdvisor`] turns the observation series into per-date price
//! suggestions. Whatever sits behind the trait, its output is passed through
//! [`validate_suggestions`] before anyone sees it.

pub mod demand;
pub mod gemini;
pub mod rules;

pub use gemini::GeminiAdvisor;
pub use rules::RuleBasedAdvisor;

use crate::config::PricingConfig;
use crate::models::{round_half_up, DailyObservation, DemandLevel, PriceSuggestion, MAX_RATE};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::warn;

/// Error types for advisor calls
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Advisor credentials missing")]
    MissingCredentials,

    #[error("Advisor request timed out")]
    Timeout,

    #[error("Advisor transport error: {0}")]
    Transport(String),

    #[error("Advisor returned HTTP {0}")]
    Status(u16),

    #[error("Malformed advisor payload: {0}")]
    MalformedPayload(String),
}

/// Result type for advisor calls
pub type AdvisorResult<T> = Result<T, AdvisorError>;

impl From<reqwest::Error> for AdvisorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdvisorError::Timeout
        } else if err.is_decode() {
            AdvisorError::MalformedPayload(err.to_string())
        } else if let Some(status) = err.status() {
            AdvisorError::Status(status.as_u16())
        } else {
            AdvisorError::Transport(err.to_string())
        }
    }
}

/// Market hint passed with each request; enriches the rationale only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketContext {
    pub market_hint: String,
    pub currency: String,
}

impl MarketContext {
    pub fn new(market_hint: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            market_hint: market_hint.into(),
            currency: currency.into(),
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.market_hint.clone(), config.currency.clone())
    }
}

impl Default for MarketContext {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

/// Source of price suggestions
#[async_trait]
pub trait PricingAdvisor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Produce suggestions for the series. Must be safe to call repeatedly
    /// with the same input.
    async fn suggest(
        &self,
        series: &[DailyObservation],
        context: &MarketContext,
    ) -> AdvisorResult<Vec<PriceSuggestion>>;
}

/// Loosely typed suggestion as a generative model returns it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSuggestion {
    pub date: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    pub recommended_price: f64,
    pub reason: String,
    pub demand_level: String,
}

impl RawSuggestion {
    /// Check one item against the series and normalise it.
    ///
    /// The price is rounded to a positive integer no greater than
    /// [`MAX_RATE`], the date must exist in the series, and the current price
    /// is re-snapshotted from the series.
    pub fn into_suggestion(
        self,
        adr_by_date: &BTreeMap<NaiveDate, Decimal>,
    ) -> Result<PriceSuggestion, String> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|e| format!("bad date {:?}: {}", self.date, e))?;

        let current_price = *adr_by_date
            .get(&date)
            .ok_or_else(|| format!("date {} not in series", date))?;

        let demand_level = DemandLevel::from_str(&self.demand_level)?;

        if !self.recommended_price.is_finite() {
            return Err(format!("non-finite price for {}", date));
        }
        let recommended_price = Decimal::from_f64_retain(self.recommended_price)
            .map(round_half_up)
            .ok_or_else(|| format!("unrepresentable price for {}", date))?;
        if recommended_price <= Decimal::ZERO {
            return Err(format!("non-positive price {} for {}", recommended_price, date));
        }
        if recommended_price > MAX_RATE {
            return Err(format!("price {} out of range for {}", recommended_price, date));
        }

        let reason = self.reason.trim().to_string();
        if reason.is_empty() {
            return Err(format!("empty reason for {}", date));
        }

        Ok(PriceSuggestion {
            date,
            current_price,
            recommended_price,
            demand_level,
            reason,
        })
    }
}

/// Enforce the suggestion contract on advisor output.
///
/// Drops items for unknown dates, prices outside `1..=MAX_RATE` after
/// rounding, or empty reasons. Keeps the first suggestion per date and
/// re-snapshots the current price from the series.
pub fn validate_suggestions(
    suggestions: Vec<PriceSuggestion>,
    series: &[DailyObservation],
) -> Vec<PriceSuggestion> {
    let adr_by_date: BTreeMap<NaiveDate, Decimal> =
        series.iter().map(|day| (day.date, day.adr())).collect();
    let mut seen = BTreeSet::new();

    suggestions
        .into_iter()
        .filter_map(|mut suggestion| {
            let Some(adr) = adr_by_date.get(&suggestion.date) else {
                warn!("Dropping suggestion for unknown date {}", suggestion.date);
                return None;
            };
            if !seen.insert(suggestion.date) {
                warn!("Dropping duplicate suggestion for {}", suggestion.date);
                return None;
            }

            suggestion.recommended_price = round_half_up(suggestion.recommended_price);
            if suggestion.recommended_price <= Decimal::ZERO {
                warn!("Dropping non-positive suggestion for {}", suggestion.date);
                return None;
            }
            if suggestion.recommended_price > MAX_RATE {
                warn!("Dropping out-of-range suggestion for {}", suggestion.date);
                return None;
            }
            if suggestion.reason.trim().is_empty() {
                warn!("Dropping unexplained suggestion for {}", suggestion.date);
                return None;
            }

            suggestion.current_price = *adr;
            Some(suggestion)
        })
        .collect()
}
