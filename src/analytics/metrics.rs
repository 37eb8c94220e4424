//! Roll-up of a daily series into dashboard KPIs.

use crate::config::PricingConfig;
use crate::models::{round_half_up, DailyObservation, DashboardMetrics, HighDemandDate};
use rust_decimal::Decimal;

/// Reduce a series into a `DashboardMetrics` snapshot.
///
/// RevPAR is recomputed from the rounded occupancy and ADR aggregates rather
/// than averaged from the per-day values. An empty series yields all-zero
/// metrics.
pub fn aggregate(series: &[DailyObservation], config: &PricingConfig) -> DashboardMetrics {
    if series.is_empty() {
        return DashboardMetrics::default();
    }

    let count = Decimal::from(series.len() as u64);
    let rooms = Decimal::from(config.fixed_room_count);

    let occupancy_sum: Decimal = series.iter().map(DailyObservation::occupancy).sum();
    let adr_sum: Decimal = series.iter().map(DailyObservation::adr).sum();
    let total_revenue: Decimal = series.iter().map(|day| day.revpar() * rooms).sum();

    let occupancy_rate = round_half_up(occupancy_sum / count);
    let avg_adr = round_half_up(adr_sum / count);
    let rev_par = round_half_up(avg_adr * occupancy_rate / Decimal::ONE_HUNDRED);

    DashboardMetrics {
        total_revenue: round_half_up(total_revenue),
        occupancy_rate,
        avg_adr,
        rev_par,
        revenue_room_basis: config.fixed_room_count,
        days: series.len(),
    }
}

/// First dates, in series order, whose occupancy exceeds the high-demand threshold
pub fn high_demand_dates(
    series: &[DailyObservation],
    config: &PricingConfig,
) -> Vec<HighDemandDate> {
    let high = Decimal::from(config.high_demand_occupancy);
    let extreme = Decimal::from(config.extreme_demand_occupancy);

    series
        .iter()
        .filter(|day| day.occupancy() > high)
        .take(config.high_demand_limit)
        .map(|day| HighDemandDate {
            date: day.date,
            occupancy: day.occupancy(),
            adr: day.adr(),
            is_extreme: day.occupancy() > extreme,
        })
        .collect()
}
