//! Market position of my rate against the active compset.

use crate::config::PricingConfig;
use crate::models::{
    round_half_up, Competitor, DailyObservation, DayPosition, MarketPosition, Positioning,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Ids of the currently tracked competitors
pub fn active_ids(competitors: &[Competitor]) -> BTreeSet<String> {
    competitors.iter().map(|c| c.id.clone()).collect()
}

/// Percent difference of `my_rate` from `market_rate`.
///
/// Zero when the market rate is not positive or the ratio is out of range.
pub fn variance(my_rate: Decimal, market_rate: Decimal) -> Decimal {
    if market_rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    my_rate
        .checked_sub(market_rate)
        .and_then(|diff| diff.checked_div(market_rate))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// 1-based position of `my_rate` in the compset sorted most expensive first.
///
/// My rate goes in first and the sort is stable, so a tie with a competitor
/// resolves in my favour.
pub fn rank(my_rate: Decimal, competitor_rates: impl IntoIterator<Item = Decimal>) -> usize {
    let mut rates: Vec<Decimal> = std::iter::once(my_rate).chain(competitor_rates).collect();
    rates.sort_by(|a, b| b.cmp(a));

    rates
        .iter()
        .position(|rate| *rate == my_rate)
        .map(|idx| idx + 1)
        .unwrap_or(1)
}

/// Compare one day against the active competitors
pub fn day_position(day: &DailyObservation, active_ids: &BTreeSet<String>) -> DayPosition {
    let rates: Vec<Decimal> = day.active_competitor_rates(active_ids).collect();
    let positive = rates.iter().copied().filter(|r| *r > Decimal::ZERO);
    let lowest = positive.clone().min();
    let highest = positive.max();

    let variance = variance(day.adr(), day.competitor_rate());

    DayPosition {
        date: day.date,
        my_rate: day.adr(),
        market_rate: day.competitor_rate(),
        variance,
        rank: rank(day.adr(), rates),
        positioning: Positioning::from_variance(variance),
        lowest_competitor_rate: lowest,
        highest_competitor_rate: highest,
    }
}

/// Per-day positions for the whole series, in series order
pub fn day_positions(series: &[DailyObservation], competitors: &[Competitor]) -> Vec<DayPosition> {
    let ids = active_ids(competitors);
    series.iter().map(|day| day_position(day, &ids)).collect()
}

/// Summarise the trailing window.
///
/// Returns `None` when there is nothing to compare: no observations or no
/// competitors.
pub fn market_position(
    series: &[DailyObservation],
    competitors: &[Competitor],
    config: &PricingConfig,
) -> Option<MarketPosition> {
    if series.is_empty() || competitors.is_empty() {
        return None;
    }

    let ids = active_ids(competitors);
    let window: Vec<DayPosition> = series
        .iter()
        .take(config.trailing_window_days)
        .map(|day| day_position(day, &ids))
        .collect();

    if window.is_empty() {
        return None;
    }

    let days = Decimal::from(window.len() as u64);
    let variance_sum = window
        .iter()
        .try_fold(Decimal::ZERO, |sum, p| sum.checked_add(p.variance))?;
    let rank_sum: Decimal = window.iter().map(|p| Decimal::from(p.rank as u64)).sum();

    let avg_variance = round_half_up(variance_sum.checked_div(days)?);
    let avg_rank = round_half_up(rank_sum / days);

    Some(MarketPosition {
        avg_variance,
        avg_rank,
        set_size: competitors.len() + 1,
        is_premium: avg_variance > Decimal::ZERO,
        window_days: window.len(),
    })
}
