//! RevOp Revenue Service
//!
//! Loads (or seeds) a property's daily series and reports:
//! - dashboard KPIs and high-demand dates
//! - compset market position
//! - price suggestions from the configured advisor
//!
//! Run with `apply-all` to write every suggestion back to the store.

use anyhow::Context;
use revop_rms::{AppConfig, AppError, AppState};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(AppError::Config)?;

    // Initialize tracing/logging with config
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("revop_rms={},reqwest=warn", config.log_level).into()
    });
    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let apply_all = std::env::args().skip(1).any(|arg| arg == "apply-all");

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           RevOp Revenue Service Starting                 ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("Market: {} ({})", config.pricing.market_hint, config.pricing.currency);

    // =========================================================================
    // SERVICE SETUP
    // =========================================================================
    let state = AppState::from_config(config).context("Failed to initialize services")?;
    let service = state.service.clone();
    let currency = state.config.pricing.currency.clone();

    let summary = service.load().await.map_err(|e| {
        error!("Failed to load series: {}", e);
        e
    })?;
    if summary.seeded_competitors {
        info!("✓ Default competitors created");
    }
    if summary.seeded_series {
        info!("✓ Seeded {} days", summary.days);
    }
    info!("✓ Series loaded: {} days, {} competitors", summary.days, summary.competitors);

    // =========================================================================
    // DASHBOARD
    // =========================================================================
    let (metrics, high_demand, position) = futures::join!(
        service.metrics(),
        service.high_demand_dates(),
        service.market_position()
    );
    if metrics.is_empty() {
        warn!("No observations - dashboard is empty");
    } else {
        info!("Occupancy:     {}%", metrics.occupancy_rate);
        info!("ADR:           {} {}", currency, metrics.avg_adr);
        info!("RevPAR:        {} {}", currency, metrics.rev_par);
        info!(
            "Total revenue: {} {} (approx., {} rooms/night)",
            currency, metrics.total_revenue, metrics.revenue_room_basis
        );
    }

    for date in high_demand {
        let label = if date.is_extreme { "extreme" } else { "high" };
        info!(
            "High demand {}: {}% occupancy at {} {} ({})",
            date.date, date.occupancy, currency, date.adr, label
        );
    }

    match position {
        Some(position) => info!(
            "Market position: {} ({}% vs market, avg rank {} of {}, {} days)",
            position.positioning().as_str(),
            position.avg_variance,
            position.avg_rank,
            position.set_size,
            position.window_days
        ),
        None => info!("Market position: no comparison possible"),
    }

    // =========================================================================
    // SUGGESTIONS
    // =========================================================================
    let status = service.request_suggestions(None).await;
    if status.is_unavailable() {
        warn!("Suggestions unavailable: {:?}", status);
    }

    for tracked in service.suggestions().await {
        let s = &tracked.suggestion;
        let percent = s.delta_percent().map(|p| p.round_dp(1)).unwrap_or(Decimal::ZERO);
        info!(
            "{} {:>8} -> {:>8} ({:+}%, {} x{}): {}",
            s.date,
            s.current_price,
            s.recommended_price,
            percent,
            s.demand_level,
            s.demand_level.multiplier(),
            s.reason
        );
    }

    if apply_all {
        let report = service.apply_all().await;
        info!(
            "✓ Applied {} suggestions ({} already applied)",
            report.applied.len(),
            report.already_applied.len()
        );
        for (date, reason) in &report.failed {
            error!("Could not apply {}: {}", date, reason);
        }

        let metrics = service.metrics().await;
        info!("RevPAR after apply: {} {}", currency, metrics.rev_par);
    }

    info!("RevOp revenue service run complete");
    Ok(())
}
