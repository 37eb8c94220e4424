use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Qualitative demand level attached to a price suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl DemandLevel {
    pub const ALL: [DemandLevel; 4] = [
        DemandLevel::Low,
        DemandLevel::Medium,
        DemandLevel::High,
        DemandLevel::Extreme,
    ];

    /// Parse from the wire label
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(DemandLevel::Low),
            "medium" => Ok(DemandLevel::Medium),
            "high" => Ok(DemandLevel::High),
            "extreme" => Ok(DemandLevel::Extreme),
            _ => Err(format!("Invalid demand level: {}", s)),
        }
    }

    /// Convert to the wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::Low => "Low",
            DemandLevel::Medium => "Medium",
            DemandLevel::High => "High",
            DemandLevel::Extreme => "Extreme",
        }
    }

    /// Price multiplier shown next to each suggestion
    pub fn multiplier(&self) -> Decimal {
        match self {
            DemandLevel::Extreme => Decimal::new(150, 2),
            DemandLevel::High => Decimal::new(125, 2),
            DemandLevel::Medium => Decimal::ONE,
            DemandLevel::Low => Decimal::new(85, 2),
        }
    }
}

impl std::fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended rate for one date, produced by a pricing advisor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSuggestion {
    pub date: NaiveDate,
    /// Snapshot of ADR when the suggestion was produced
    pub current_price: Decimal,
    pub recommended_price: Decimal,
    pub demand_level: DemandLevel,
    pub reason: String,
}

impl PriceSuggestion {
    /// Recommended minus current price
    pub fn delta(&self) -> Decimal {
        self.recommended_price - self.current_price
    }

    /// Change relative to the current price, in percent (None when current is zero)
    pub fn delta_percent(&self) -> Option<Decimal> {
        if self.current_price.is_zero() {
            return None;
        }
        Some(self.delta() / self.current_price * Decimal::ONE_HUNDRED)
    }
}

/// A held suggestion plus whether it has been written back to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedSuggestion {
    #[serde(flatten)]
    pub suggestion: PriceSuggestion,
    pub applied: bool,
}

/// State of the suggestion book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SuggestionStatus {
    /// No optimisation requested yet
    NotRequested,
    Pending { generation: u64 },
    Ready { generation: u64 },
    /// The advisor failed; the suggestion list is empty
    Unavailable { generation: u64, reason: String },
}

impl SuggestionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SuggestionStatus::Pending { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SuggestionStatus::Unavailable { .. })
    }
}

/// Result of applying a single suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApplyOutcome {
    Applied,
    AlreadyApplied,
}
