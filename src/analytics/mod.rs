pub mod market;
pub mod metrics;

pub use market::{day_positions, market_position};
pub use metrics::{aggregate, high_demand_dates};
