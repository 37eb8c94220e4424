#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use revop_rms::config::PricingConfig;
use revop_rms::error::{StoreError, StoreResult};
use revop_rms::models::*;
use revop_rms::pricing::{AdvisorError, AdvisorResult, MarketContext, PricingAdvisor};
use revop_rms::repositories::*;
use revop_rms::services::RevenueService;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap() + Duration::days(day as i64 - 1)
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

/// Single-competitor observation
pub fn observation(
    day: u32,
    occupancy: i64,
    adr: i64,
    competitor: &Competitor,
    rate: i64,
) -> DailyObservation {
    let mut rates = BTreeMap::new();
    rates.insert(competitor.id.clone(), dec(rate));
    DailyObservation::new(date(day), dec(occupancy), dec(adr), rates, 5).unwrap()
}

/// Occupancies [90, 50, 20], ADRs [5000, 4000, 3000], market [4500, 4200, 3500]
pub fn three_day_fixture() -> (Vec<DailyObservation>, Vec<Competitor>) {
    let competitor = Competitor::new("Grand Hotel Mumbai", "#ec4899");
    let series = vec![
        observation(1, 90, 5000, &competitor, 4500),
        observation(2, 50, 4000, &competitor, 4200),
        observation(3, 20, 3000, &competitor, 3500),
    ];
    (series, vec![competitor])
}

/// `days` observations with two competitors and varied occupancy
pub fn long_fixture(days: u32) -> (Vec<DailyObservation>, Vec<Competitor>) {
    let a = Competitor::new("City Stay Inn", "#ec4899");
    let b = Competitor::new("Seaside Resort", "#f59e0b");

    let series = (1..=days)
        .map(|day| {
            let occupancy = 30 + (day as i64 * 7) % 70;
            let adr = 4000 + day as i64 * 50;
            let mut rates = BTreeMap::new();
            rates.insert(a.id.clone(), dec(adr - 300));
            rates.insert(b.id.clone(), dec(adr + 200));
            DailyObservation::new(date(day), dec(occupancy), dec(adr), rates, 3).unwrap()
        })
        .collect();

    (series, vec![a, b])
}

pub fn suggestion(day: u32, recommended: i64, level: DemandLevel) -> PriceSuggestion {
    PriceSuggestion {
        date: date(day),
        current_price: Decimal::ZERO,
        recommended_price: dec(recommended),
        demand_level: level,
        reason: format!("Occupancy driven {} pricing", level),
    }
}

/// Service over `store` and `advisor`, already loaded
pub async fn loaded_service(
    store: Arc<dyn SeriesStore>,
    advisor: Arc<dyn PricingAdvisor>,
) -> RevenueService {
    let service = RevenueService::new(store, advisor, PricingConfig::default());
    service
        .load_with(date(1), &mut StdRng::seed_from_u64(42))
        .await
        .unwrap();
    service
}

/// In-memory store that refuses rate updates for chosen dates
pub struct FailingStore {
    inner: InMemorySeriesStore,
    failing_dates: Mutex<BTreeSet<NaiveDate>>,
}

impl FailingStore {
    pub fn new(series: Vec<DailyObservation>, competitors: Vec<Competitor>) -> Self {
        Self {
            inner: InMemorySeriesStore::with_data(series, competitors),
            failing_dates: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn fail_on(&self, date: NaiveDate) {
        self.failing_dates.lock().unwrap().insert(date);
    }
}

#[async_trait]
impl SeriesStore for FailingStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch_series(&self) -> StoreResult<Vec<DailyObservation>> {
        self.inner.fetch_series().await
    }

    async fn fetch_competitors(&self) -> StoreResult<Vec<Competitor>> {
        self.inner.fetch_competitors().await
    }

    async fn update_rate(&self, date: NaiveDate, new_rate: Decimal) -> StoreResult<()> {
        if self.failing_dates.lock().unwrap().contains(&date) {
            return Err(StoreError::Transport("connection reset".into()));
        }
        self.inner.update_rate(date, new_rate).await
    }

    async fn update_competitor_rate(
        &self,
        date: NaiveDate,
        competitor_id: &str,
        new_rate: Decimal,
        active_ids: &BTreeSet<String>,
    ) -> StoreResult<()> {
        self.inner
            .update_competitor_rate(date, competitor_id, new_rate, active_ids)
            .await
    }

    async fn seed_series(&self, series: &[DailyObservation]) -> StoreResult<()> {
        self.inner.seed_series(series).await
    }

    async fn add_competitor(&self, competitor: NewCompetitor) -> StoreResult<Competitor> {
        self.inner.add_competitor(competitor).await
    }

    async fn remove_competitor(&self, competitor_id: &str) -> StoreResult<()> {
        self.inner.remove_competitor(competitor_id).await
    }
}

/// One scripted advisor reply
pub struct Step {
    result: AdvisorResult<Vec<PriceSuggestion>>,
    hold: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl Step {
    pub fn ok(suggestions: Vec<PriceSuggestion>) -> Self {
        Self {
            result: Ok(suggestions),
            hold: None,
        }
    }

    pub fn fail(error: AdvisorError) -> Self {
        Self {
            result: Err(error),
            hold: None,
        }
    }

    /// Signal `entered` on arrival, then wait for `release` before replying
    pub fn held(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.hold = Some((entered, release));
        self
    }
}

/// Advisor replaying scripted steps; replies with nothing once the script runs out
#[derive(Default)]
pub struct StubAdvisor {
    script: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl StubAdvisor {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PricingAdvisor for StubAdvisor {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn suggest(
        &self,
        _series: &[DailyObservation],
        _context: &MarketContext,
    ) -> AdvisorResult<Vec<PriceSuggestion>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front();

        let Some(step) = step else {
            return Ok(Vec::new());
        };

        if let Some((entered, release)) = step.hold {
            entered.notify_one();
            release.notified().await;
        }
        step.result
    }
}
