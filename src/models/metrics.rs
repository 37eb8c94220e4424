use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline KPIs rolled up from a daily series
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Sum of per-day RevPAR times `revenue_room_basis`. An extrapolation,
    /// not a revenue ledger.
    #[serde(rename = "totalRevenue")]
    pub total_revenue: Decimal,
    #[serde(rename = "occupancyRate")]
    pub occupancy_rate: Decimal,
    #[serde(rename = "avgADR")]
    pub avg_adr: Decimal,
    #[serde(rename = "revPAR")]
    pub rev_par: Decimal,
    /// Rooms per night assumed for `total_revenue`; zero for an empty series
    #[serde(rename = "revenueRoomBasis")]
    pub revenue_room_basis: u32,
    /// Observations rolled up
    pub days: usize,
}

impl DashboardMetrics {
    /// Whether these metrics came from an empty series
    pub fn is_empty(&self) -> bool {
        self.days == 0
    }
}

/// Pricing posture relative to the market average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Positioning {
    Premium,
    Value,
}

impl Positioning {
    /// Positive variance is Premium; zero or negative is Value
    pub fn from_variance(variance: Decimal) -> Self {
        if variance > Decimal::ZERO {
            Positioning::Premium
        } else {
            Positioning::Value
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Positioning::Premium => "Premium",
            Positioning::Value => "Value",
        }
    }
}

/// One day's comparison of my rate against the compset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPosition {
    pub date: NaiveDate,
    pub my_rate: Decimal,
    pub market_rate: Decimal,
    /// Percent above (+) or below (-) the market rate; zero when no comparison
    pub variance: Decimal,
    /// 1 is the most expensive property in the compset that day
    pub rank: usize,
    pub positioning: Positioning,
    pub lowest_competitor_rate: Option<Decimal>,
    pub highest_competitor_rate: Option<Decimal>,
}

/// Market position over the trailing window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPosition {
    pub avg_variance: Decimal,
    pub avg_rank: Decimal,
    /// Active competitors plus self
    pub set_size: usize,
    pub is_premium: bool,
    /// Number of days the averages cover
    pub window_days: usize,
}

impl MarketPosition {
    pub fn positioning(&self) -> Positioning {
        if self.is_premium {
            Positioning::Premium
        } else {
            Positioning::Value
        }
    }
}

/// Date whose occupancy marks it as high demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighDemandDate {
    pub date: NaiveDate,
    pub occupancy: Decimal,
    pub adr: Decimal,
    pub is_extreme: bool,
}
