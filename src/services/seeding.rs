//! Default data for an empty store.

use crate::error::{AppError, AppResult};
use crate::models::{round_half_up, Competitor, DailyObservation, NewCompetitor};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Days synthesized when the series is empty
pub const SEED_DAYS: u32 = 30;

/// Compset created when no competitors exist
pub const DEFAULT_COMPETITORS: [&str; 3] =
    ["Grand Hotel Mumbai", "City Stay Inn", "Seaside Resort"];

const BASE_PRICE: f64 = 4500.0;
const WEEKEND_OCCUPANCY: f64 = 85.0;
const WEEKDAY_OCCUPANCY: f64 = 55.0;

/// Default compset, coloured in palette order
pub fn default_competitors() -> Vec<NewCompetitor> {
    DEFAULT_COMPETITORS
        .iter()
        .enumerate()
        .map(|(idx, name)| NewCompetitor {
            name: name.to_string(),
            color: Competitor::palette_color(idx).to_string(),
        })
        .collect()
}

fn decimal(value: f64) -> AppResult<Decimal> {
    Decimal::from_f64_retain(value)
        .ok_or_else(|| AppError::Message(format!("Cannot represent {} as a decimal", value)))
}

/// Synthesize `days` observations starting at `start`.
///
/// Fridays and Saturdays run hotter; my rate tracks occupancy and each
/// competitor sits within ±15% of it.
pub fn generate_series<R: Rng>(
    start: NaiveDate,
    days: u32,
    competitors: &[Competitor],
    rng: &mut R,
) -> AppResult<Vec<DailyObservation>> {
    let mut series = Vec::with_capacity(days as usize);

    for offset in 0..days {
        let date = start + Duration::days(offset as i64);
        let base = match date.weekday() {
            Weekday::Fri | Weekday::Sat => WEEKEND_OCCUPANCY,
            _ => WEEKDAY_OCCUPANCY,
        };
        let occupancy = (base + rng.gen_range(-10.0..10.0)).clamp(20.0, 100.0);

        let adr = round_half_up(decimal(
            BASE_PRICE * (1.0 + occupancy / 100.0) + rng.gen_range(0.0..500.0),
        )?);

        let mut rates = BTreeMap::new();
        for competitor in competitors {
            let spread = decimal(1.0 + rng.gen_range(-0.15..0.15))?;
            rates.insert(competitor.id.clone(), round_half_up(adr * spread));
        }

        let bookings = rng.gen_range(2..12);

        series.push(DailyObservation::new(
            date,
            round_half_up(decimal(occupancy)?),
            adr,
            rates,
            bookings,
        )?);
    }

    Ok(series)
}
