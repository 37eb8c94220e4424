pub mod audit;
pub mod revenue_service;
pub mod seeding;

pub use audit::{AuditTrailService, RateChangeSource};
pub use revenue_service::{ApplyAllReport, LoadSummary, RevenueService};
