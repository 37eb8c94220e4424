use crate::analytics;
use crate::config::PricingConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    ApplyOutcome, Competitor, DailyObservation, DashboardMetrics, DayPosition, HighDemandDate,
    MarketPosition, NewCompetitor, SuggestionStatus, TrackedSuggestion,
};
use crate::pricing::{validate_suggestions, MarketContext, PricingAdvisor};
use crate::repositories::SeriesStore;
use crate::services::audit::{AuditTrailService, RateChangeSource};
use crate::services::seeding;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Outcome of a bulk apply, per date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyAllReport {
    pub applied: Vec<NaiveDate>,
    pub already_applied: Vec<NaiveDate>,
    /// Dates the store refused, with the reason; their suggestions stay unapplied
    pub failed: Vec<(NaiveDate, String)>,
}

impl ApplyAllReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// What `load` found or created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub days: usize,
    pub competitors: usize,
    pub seeded_competitors: bool,
    pub seeded_series: bool,
}

#[derive(Debug)]
struct SuggestionBook {
    items: Vec<TrackedSuggestion>,
    status: SuggestionStatus,
    /// Generation that produced `items`
    generation: u64,
}

#[derive(Debug)]
struct ServiceState {
    series: Vec<DailyObservation>,
    competitors: Vec<Competitor>,
    book: SuggestionBook,
}

/// Pricing and market analytics over one property's series.
///
/// Holds the acknowledged series in memory. Writes go to the store first and
/// reach the cache only once the store has accepted them, one date at a time,
/// so readers see either the old or the new observation. Mutations are
/// serialized by `write_gate`; suggestion generation runs outside every lock.
pub struct RevenueService {
    store: Arc<dyn SeriesStore>,
    advisor: Arc<dyn PricingAdvisor>,
    config: PricingConfig,
    audit: Option<Arc<AuditTrailService>>,
    state: RwLock<ServiceState>,
    write_gate: Mutex<()>,
    generation: AtomicU64,
}

impl RevenueService {
    pub fn new(
        store: Arc<dyn SeriesStore>,
        advisor: Arc<dyn PricingAdvisor>,
        config: PricingConfig,
    ) -> Self {
        Self {
            store,
            advisor,
            config,
            audit: None,
            state: RwLock::new(ServiceState {
                series: Vec::new(),
                competitors: Vec::new(),
                book: SuggestionBook {
                    items: Vec::new(),
                    status: SuggestionStatus::NotRequested,
                    generation: 0,
                },
            }),
            write_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Record acknowledged rate changes in `audit`
    pub fn with_audit(mut self, audit: Arc<AuditTrailService>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub fn advisor_name(&self) -> &'static str {
        self.advisor.name()
    }

    /// Fetch the series and compset, seeding whichever is empty
    pub async fn load(&self) -> AppResult<LoadSummary> {
        let mut rng = StdRng::from_entropy();
        let start = chrono::Utc::now().date_naive();
        self.load_with(start, &mut rng).await
    }

    /// `load` with an explicit seed start date and random source
    pub async fn load_with(&self, start: NaiveDate, rng: &mut StdRng) -> AppResult<LoadSummary> {
        let _gate = self.write_gate.lock().await;

        let mut competitors = self.store.fetch_competitors().await?;
        let seeded_competitors = competitors.is_empty();
        if seeded_competitors {
            info!("No competitors in {} store, adding defaults", self.store.name());
            for competitor in seeding::default_competitors() {
                competitors.push(self.store.add_competitor(competitor).await?);
            }
        }

        let mut series = self.store.fetch_series().await?;
        let seeded_series = series.is_empty();
        if seeded_series {
            info!("Empty series, seeding {} days from {}", seeding::SEED_DAYS, start);
            series = seeding::generate_series(start, seeding::SEED_DAYS, &competitors, rng)?;
            self.store.seed_series(&series).await?;

            if let Some(audit) = &self.audit {
                if let Err(e) = audit.log_series_seeded(series.len()).await {
                    warn!("Failed to audit series seed: {}", e);
                }
            }
        }
        series.sort_by_key(|day| day.date);

        let summary = LoadSummary {
            days: series.len(),
            competitors: competitors.len(),
            seeded_competitors,
            seeded_series,
        };

        // Any suggestions refer to the previous series
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;
        state.series = series;
        state.competitors = competitors;
        state.book = SuggestionBook {
            items: Vec::new(),
            status: SuggestionStatus::NotRequested,
            generation,
        };

        info!(
            "Loaded {} days and {} competitors",
            summary.days, summary.competitors
        );
        Ok(summary)
    }

    pub async fn series(&self) -> Vec<DailyObservation> {
        self.state.read().await.series.clone()
    }

    pub async fn competitors(&self) -> Vec<Competitor> {
        self.state.read().await.competitors.clone()
    }

    /// Headline KPIs; all zero when the series is empty
    pub async fn metrics(&self) -> DashboardMetrics {
        let state = self.state.read().await;
        analytics::aggregate(&state.series, &self.config)
    }

    /// Trailing-window market summary; `None` with no data or no competitors
    pub async fn market_position(&self) -> Option<MarketPosition> {
        let state = self.state.read().await;
        analytics::market_position(&state.series, &state.competitors, &self.config)
    }

    pub async fn day_positions(&self) -> Vec<DayPosition> {
        let state = self.state.read().await;
        analytics::day_positions(&state.series, &state.competitors)
    }

    pub async fn high_demand_dates(&self) -> Vec<HighDemandDate> {
        let state = self.state.read().await;
        analytics::high_demand_dates(&state.series, &self.config)
    }

    /// Set my rate for one date
    pub async fn update_rate(&self, date: NaiveDate, new_rate: Decimal) -> AppResult<()> {
        let _gate = self.write_gate.lock().await;
        self.write_rate(date, new_rate, RateChangeSource::Manual).await
    }

    /// Write a rate through the store, then into the cache. Caller holds `write_gate`.
    async fn write_rate(
        &self,
        date: NaiveDate,
        new_rate: Decimal,
        source: RateChangeSource,
    ) -> AppResult<()> {
        let mut updated = self.find_day(date).await?;
        let old_rate = updated.adr();
        updated.set_adr(new_rate)?;

        self.store.update_rate(date, new_rate).await?;
        self.replace_day(updated).await;

        debug!("Rate for {} changed {} -> {}", date, old_rate, new_rate);

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_rate_change(date, old_rate, new_rate, source).await {
                warn!("Failed to audit rate change for {}: {}", date, e);
            }
        }

        Ok(())
    }

    /// Set one active competitor's rate for one date
    pub async fn update_competitor_rate(
        &self,
        date: NaiveDate,
        competitor_id: &str,
        new_rate: Decimal,
    ) -> AppResult<()> {
        let _gate = self.write_gate.lock().await;

        let active = {
            let state = self.state.read().await;
            analytics::market::active_ids(&state.competitors)
        };
        if !active.contains(competitor_id) {
            return Err(AppError::NotFound(format!(
                "Competitor {} is not in the compset",
                competitor_id
            )));
        }

        let mut updated = self.find_day(date).await?;
        updated.set_competitor_rate(competitor_id, new_rate, &active)?;

        self.store
            .update_competitor_rate(date, competitor_id, new_rate, &active)
            .await?;
        self.replace_day(updated).await;

        debug!("Competitor {} rate for {} set to {}", competitor_id, date, new_rate);
        Ok(())
    }

    /// Add a competitor, coloured from the palette
    pub async fn add_competitor(&self, name: &str) -> AppResult<Competitor> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Competitor name cannot be empty".into()));
        }

        let _gate = self.write_gate.lock().await;
        let existing = self.state.read().await.competitors.len();

        let created = self
            .store
            .add_competitor(NewCompetitor {
                name: name.to_string(),
                color: Competitor::palette_color(existing).to_string(),
            })
            .await?;

        self.state.write().await.competitors.push(created.clone());
        info!("Added competitor {} ({})", created.name, created.id);

        if let Some(audit) = &self.audit {
            if let Err(e) = audit
                .log_competitor_change("competitor_added", &created.id, &created.name)
                .await
            {
                warn!("Failed to audit competitor add: {}", e);
            }
        }

        Ok(created)
    }

    /// Remove a competitor identity. Its past rate entries stay on each day.
    pub async fn remove_competitor(&self, competitor_id: &str) -> AppResult<()> {
        let _gate = self.write_gate.lock().await;

        let removed = {
            let state = self.state.read().await;
            state
                .competitors
                .iter()
                .find(|c| c.id == competitor_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::NotFound(format!("Competitor {} not found", competitor_id))
                })?
        };

        self.store.remove_competitor(competitor_id).await?;
        self.state
            .write()
            .await
            .competitors
            .retain(|c| c.id != competitor_id);
        info!("Removed competitor {} ({})", removed.name, removed.id);

        if let Some(audit) = &self.audit {
            if let Err(e) = audit
                .log_competitor_change("competitor_removed", &removed.id, &removed.name)
                .await
            {
                warn!("Failed to audit competitor removal: {}", e);
            }
        }

        Ok(())
    }

    /// Ask the advisor for a fresh set of suggestions.
    ///
    /// Supersedes any request still in flight: only the result of the latest
    /// request is kept. Advisor failures empty the book and mark it
    /// unavailable instead of returning an error.
    pub async fn request_suggestions(&self, market_hint: Option<&str>) -> SuggestionStatus {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let series = {
            let mut state = self.state.write().await;
            // A newer request may already have settled the book
            if self.generation.load(Ordering::SeqCst) == generation {
                state.book.status = SuggestionStatus::Pending { generation };
            }
            state.series.clone()
        };

        let context = MarketContext::new(
            market_hint.unwrap_or(self.config.market_hint.as_str()),
            self.config.currency.clone(),
        );

        info!(
            "Requesting suggestions from {} advisor (generation {}, {} days, {})",
            self.advisor.name(),
            generation,
            series.len(),
            context.market_hint
        );
        let result = self.advisor.suggest(&series, &context).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding stale suggestions from generation {}", generation);
            return state.book.status.clone();
        }

        match result {
            Ok(suggestions) => {
                let items: Vec<TrackedSuggestion> = validate_suggestions(suggestions, &state.series)
                    .into_iter()
                    .map(|suggestion| TrackedSuggestion {
                        suggestion,
                        applied: false,
                    })
                    .collect();

                info!("Received {} suggestions", items.len());
                state.book = SuggestionBook {
                    items,
                    status: SuggestionStatus::Ready { generation },
                    generation,
                };
            }
            Err(e) => {
                warn!("Suggestion generation failed: {}", e);
                state.book = SuggestionBook {
                    items: Vec::new(),
                    status: SuggestionStatus::Unavailable {
                        generation,
                        reason: e.to_string(),
                    },
                    generation,
                };
            }
        }

        state.book.status.clone()
    }

    pub async fn suggestions(&self) -> Vec<TrackedSuggestion> {
        self.state.read().await.book.items.clone()
    }

    pub async fn status(&self) -> SuggestionStatus {
        self.state.read().await.book.status.clone()
    }

    /// Write the held suggestion for `date` into the store as my rate
    pub async fn apply_suggestion(&self, date: NaiveDate) -> AppResult<ApplyOutcome> {
        let _gate = self.write_gate.lock().await;

        let (generation, tracked) = {
            let state = self.state.read().await;
            let tracked = state
                .book
                .items
                .iter()
                .find(|t| t.suggestion.date == date)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("No suggestion for {}", date)))?;
            (state.book.generation, tracked)
        };

        if tracked.applied {
            return Ok(ApplyOutcome::AlreadyApplied);
        }

        self.write_rate(
            date,
            tracked.suggestion.recommended_price,
            RateChangeSource::Suggestion,
        )
        .await?;
        self.mark_applied(generation, date).await;

        info!(
            "Applied suggestion for {}: {}",
            date, tracked.suggestion.recommended_price
        );
        Ok(ApplyOutcome::Applied)
    }

    /// Apply every held suggestion, recording which dates the store accepted
    pub async fn apply_all(&self) -> ApplyAllReport {
        let _gate = self.write_gate.lock().await;

        let (generation, items) = {
            let state = self.state.read().await;
            (state.book.generation, state.book.items.clone())
        };

        let mut report = ApplyAllReport::default();
        for tracked in items {
            let date = tracked.suggestion.date;
            if tracked.applied {
                report.already_applied.push(date);
                continue;
            }

            match self
                .write_rate(
                    date,
                    tracked.suggestion.recommended_price,
                    RateChangeSource::BulkSuggestion,
                )
                .await
            {
                Ok(()) => {
                    self.mark_applied(generation, date).await;
                    report.applied.push(date);
                }
                Err(e) => {
                    warn!("Failed to apply suggestion for {}: {}", date, e);
                    report.failed.push((date, e.to_string()));
                }
            }
        }

        info!(
            "Applied {} suggestions ({} already applied, {} failed)",
            report.applied.len(),
            report.already_applied.len(),
            report.failed.len()
        );
        report
    }

    async fn find_day(&self, date: NaiveDate) -> AppResult<DailyObservation> {
        self.state
            .read()
            .await
            .series
            .iter()
            .find(|day| day.date == date)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No observation for {}", date)))
    }

    async fn replace_day(&self, updated: DailyObservation) {
        let mut state = self.state.write().await;
        if let Some(slot) = state.series.iter_mut().find(|day| day.date == updated.date) {
            *slot = updated;
        }
    }

    /// Mark a suggestion applied unless a newer book has replaced it
    async fn mark_applied(&self, generation: u64, date: NaiveDate) {
        let mut state = self.state.write().await;
        if state.book.generation != generation {
            return;
        }
        if let Some(tracked) = state.book.items.iter_mut().find(|t| t.suggestion.date == date) {
            tracked.applied = true;
        }
    }
}
