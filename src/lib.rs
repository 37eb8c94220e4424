//! RevOp revenue-management engine
//!
//! Pricing and market analytics over a hotel's daily occupancy and rate
//! series: dashboard KPIs, compset positioning, and price suggestions that
//! can be written back to the series store.

pub mod analytics;
pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use pricing::{GeminiAdvisor, PricingAdvisor, RuleBasedAdvisor};
use repositories::{InMemorySeriesStore, RestSeriesStore, SeriesStore};
use services::{AuditTrailService, RevenueService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Application state wired from configuration
pub struct AppState {
    pub config: AppConfig,
    pub service: Arc<RevenueService>,
}

impl AppState {
    /// Select the store and advisor from `config` and build the service.
    ///
    /// Fails with [`AppError::Config`] when the pricing settings are invalid.
    /// Uses the REST store when `STORE_API_URL` is set, otherwise an
    /// in-memory store. Uses Gemini when an API key is set, otherwise the
    /// rule-based advisor.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        config.pricing.validate().map_err(AppError::Config)?;

        let store: Arc<dyn SeriesStore> = match RestSeriesStore::from_config(&config.store)? {
            Some(store) => Arc::new(store),
            None => {
                warn!("STORE_API_URL not configured - using in-memory store");
                Arc::new(InMemorySeriesStore::new())
            }
        };

        let advisor: Arc<dyn PricingAdvisor> = if config.advisor.has_credentials() {
            let advisor = GeminiAdvisor::new(config.advisor.clone())
                .map_err(|e| AppError::ExternalService(format!("Gemini advisor: {}", e)))?;
            Arc::new(advisor)
        } else {
            warn!("GEMINI_API_KEY not configured - using rule-based advisor");
            Arc::new(RuleBasedAdvisor::new())
        };

        let mut service = RevenueService::new(store, advisor, config.pricing.clone());

        match AuditTrailService::new(PathBuf::from(&config.audit_log_dir)) {
            Ok(audit) => service = service.with_audit(Arc::new(audit)),
            Err(e) => warn!("Audit trail disabled: {}", e),
        }

        info!(
            "Revenue service ready (store: {}, advisor: {})",
            service.store_name(),
            service.advisor_name()
        );

        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }
}
