use crate::models::DemandLevel;
use rust_decimal::Decimal;

/// Occupancy above which demand is Extreme
pub const EXTREME_OCCUPANCY: i64 = 90;
/// Occupancy above which demand is High
pub const HIGH_OCCUPANCY: i64 = 80;
/// Occupancy below which demand is Low
pub const LOW_OCCUPANCY: i64 = 40;

/// Map an occupancy percentage to a demand level.
///
/// Above 80% biases the price upward, below 40% downward; anything in
/// between stays with the market.
pub fn classify(occupancy: Decimal) -> DemandLevel {
    if occupancy > Decimal::from(EXTREME_OCCUPANCY) {
        DemandLevel::Extreme
    } else if occupancy > Decimal::from(HIGH_OCCUPANCY) {
        DemandLevel::High
    } else if occupancy < Decimal::from(LOW_OCCUPANCY) {
        DemandLevel::Low
    } else {
        DemandLevel::Medium
    }
}
