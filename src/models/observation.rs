use crate::error::{AppError, AppResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Largest rate (ADR, RevPAR or competitor rate) a series may hold
pub const MAX_RATE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Round half toward positive infinity, `floor(x + 0.5)`.
pub fn round_half_up(value: Decimal) -> Decimal {
    // At the top of the range there is no fractional part left to round
    value
        .checked_add(Decimal::new(5, 1))
        .unwrap_or(value)
        .floor()
}

/// One calendar date's state for a single property.
///
/// `revpar` and `competitor_rate` are cached projections of the other
/// fields. They can only change through [`DailyObservation::set_adr`] and
/// [`DailyObservation::set_competitor_rate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ObservationRecord")]
pub struct DailyObservation {
    pub date: NaiveDate,
    occupancy: Decimal,
    adr: Decimal,
    revpar: Decimal,
    competitor_rates: BTreeMap<String, Decimal>,
    competitor_rate: Decimal,
    pub bookings: u32,
}

/// Observation as the store sends it, range-checked before use
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationRecord {
    date: NaiveDate,
    occupancy: Decimal,
    adr: Decimal,
    revpar: Decimal,
    #[serde(default)]
    competitor_rates: BTreeMap<String, Decimal>,
    competitor_rate: Decimal,
    #[serde(default)]
    bookings: u32,
}

impl TryFrom<ObservationRecord> for DailyObservation {
    type Error = AppError;

    fn try_from(record: ObservationRecord) -> AppResult<Self> {
        validate_occupancy(record.occupancy)?;
        validate_rate(record.adr, "ADR")?;
        validate_rate(record.revpar, "RevPAR")?;
        validate_rate(record.competitor_rate, "market average")?;
        for (competitor_id, rate) in &record.competitor_rates {
            validate_rate(*rate, competitor_id)?;
        }

        Ok(Self {
            date: record.date,
            occupancy: record.occupancy,
            adr: record.adr,
            revpar: record.revpar,
            competitor_rates: record.competitor_rates,
            competitor_rate: record.competitor_rate,
            bookings: record.bookings,
        })
    }
}

impl DailyObservation {
    /// Create a new observation, deriving `revpar` and `competitor_rate`
    pub fn new(
        date: NaiveDate,
        occupancy: Decimal,
        adr: Decimal,
        competitor_rates: BTreeMap<String, Decimal>,
        bookings: u32,
    ) -> AppResult<Self> {
        validate_occupancy(occupancy)?;
        validate_rate(adr, "ADR")?;
        for (competitor_id, rate) in &competitor_rates {
            validate_rate(*rate, competitor_id)?;
        }

        let competitor_rate = mean_rate(competitor_rates.values().copied())?;

        Ok(Self {
            date,
            occupancy,
            adr,
            revpar: derive_revpar(adr, occupancy)?,
            competitor_rates,
            competitor_rate,
            bookings,
        })
    }

    /// Occupancy percentage, 0-100
    pub fn occupancy(&self) -> Decimal {
        self.occupancy
    }

    /// My average daily rate for this date
    pub fn adr(&self) -> Decimal {
        self.adr
    }

    pub fn revpar(&self) -> Decimal {
        self.revpar
    }

    /// Rates keyed by competitor id, including ids no longer tracked
    pub fn competitor_rates(&self) -> &BTreeMap<String, Decimal> {
        &self.competitor_rates
    }

    /// Cached rounded mean of competitor rates as of the last write
    pub fn competitor_rate(&self) -> Decimal {
        self.competitor_rate
    }

    /// Rates observed for the given competitor ids only
    pub fn active_competitor_rates<'a>(
        &'a self,
        active_ids: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = Decimal> + 'a {
        self.competitor_rates
            .iter()
            .filter(move |(id, _)| active_ids.contains(*id))
            .map(|(_, rate)| *rate)
    }

    /// Change my rate and recompute RevPAR for this date
    pub fn set_adr(&mut self, new_rate: Decimal) -> AppResult<()> {
        validate_rate(new_rate, "ADR")?;
        self.revpar = derive_revpar(new_rate, self.occupancy)?;
        self.adr = new_rate;
        Ok(())
    }

    /// Record one competitor's rate and recompute the cached market average.
    ///
    /// The average covers the entries whose id is in `active_ids`; entries
    /// left behind by removed competitors stay in the map but no longer count.
    pub fn set_competitor_rate(
        &mut self,
        competitor_id: &str,
        rate: Decimal,
        active_ids: &BTreeSet<String>,
    ) -> AppResult<()> {
        validate_rate(rate, competitor_id)?;

        let mut rates = self.competitor_rates.clone();
        rates.insert(competitor_id.to_string(), rate);
        let average = mean_rate(
            rates
                .iter()
                .filter(|(id, _)| active_ids.contains(*id))
                .map(|(_, rate)| *rate),
        )?;

        self.competitor_rates = rates;
        self.competitor_rate = average;
        Ok(())
    }
}

fn overflow(what: &str) -> AppError {
    AppError::Validation(format!("{} is out of range", what))
}

fn derive_revpar(adr: Decimal, occupancy: Decimal) -> AppResult<Decimal> {
    adr.checked_mul(occupancy)
        .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
        .map(round_half_up)
        .ok_or_else(|| overflow("RevPAR"))
}

fn mean_rate(mut rates: impl Iterator<Item = Decimal>) -> AppResult<Decimal> {
    let (sum, count) = rates
        .try_fold((Decimal::ZERO, 0u32), |(sum, count), rate| {
            sum.checked_add(rate).map(|sum| (sum, count + 1))
        })
        .ok_or_else(|| overflow("Competitor average"))?;

    if count == 0 {
        return Ok(Decimal::ZERO);
    }

    sum.checked_div(Decimal::from(count))
        .map(round_half_up)
        .ok_or_else(|| overflow("Competitor average"))
}

fn validate_occupancy(occupancy: Decimal) -> AppResult<()> {
    if occupancy < Decimal::ZERO || occupancy > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation(format!(
            "Occupancy must be within 0-100, got {}",
            occupancy
        )));
    }
    Ok(())
}

fn validate_rate(rate: Decimal, label: &str) -> AppResult<()> {
    if rate < Decimal::ZERO || rate > MAX_RATE {
        return Err(AppError::Validation(format!(
            "Rate for {} must be within 0-{}, got {}",
            label, MAX_RATE, rate
        )));
    }
    Ok(())
}
