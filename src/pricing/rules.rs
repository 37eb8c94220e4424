use super::demand::classify;
use super::{AdvisorResult, MarketContext, PricingAdvisor};
use crate::models::{round_half_up, DailyObservation, DemandLevel, PriceSuggestion};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Deterministic advisor: competitor average (or my rate when there is no
/// market data) scaled by the demand multiplier.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedAdvisor;

impl RuleBasedAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// Suggestion for a single day
    pub fn suggest_day(&self, day: &DailyObservation, context: &MarketContext) -> PriceSuggestion {
        let demand_level = classify(day.occupancy());
        let has_market = day.competitor_rate() > Decimal::ZERO;
        let base = if has_market { day.competitor_rate() } else { day.adr() };

        let recommended = round_half_up(base * demand_level.multiplier()).max(Decimal::ONE);

        PriceSuggestion {
            date: day.date,
            current_price: day.adr(),
            recommended_price: recommended,
            demand_level,
            reason: reason(day, demand_level, has_market, context),
        }
    }
}

fn reason(
    day: &DailyObservation,
    level: DemandLevel,
    has_market: bool,
    context: &MarketContext,
) -> String {
    let stance = match level {
        DemandLevel::Extreme => "very strong demand, push rate well above market",
        DemandLevel::High => "strong demand, price above market",
        DemandLevel::Medium => "steady demand, stay close to market",
        DemandLevel::Low => "soft demand, discount to stimulate bookings",
    };

    let market = if has_market {
        format!(
            "competitor average {} {}",
            context.currency,
            day.competitor_rate()
        )
    } else {
        "no competitor rates, anchored on current rate".to_string()
    };

    format!(
        "Occupancy {}% in {}: {}; {} (x{})",
        day.occupancy(),
        context.market_hint,
        stance,
        market,
        level.multiplier()
    )
}

#[async_trait]
impl PricingAdvisor for RuleBasedAdvisor {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn suggest(
        &self,
        series: &[DailyObservation],
        context: &MarketContext,
    ) -> AdvisorResult<Vec<PriceSuggestion>> {
        Ok(series.iter().map(|day| self.suggest_day(day, context)).collect())
    }
}
