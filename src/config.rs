use std::env;
use std::time::Duration;

/// Pricing and analytics configuration
///
/// Passed explicitly into the aggregator and analyzer so they stay testable
/// with arbitrary values.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Rooms assumed per night when extrapolating total revenue
    pub fixed_room_count: u32,
    /// Trailing window, in days, for the market-position summary
    pub trailing_window_days: usize,
    pub currency: String,
    /// City or market name used to enrich recommendation text
    pub market_hint: String,
    /// Occupancy above which a date is listed as high demand
    pub high_demand_occupancy: u32,
    /// Occupancy above which a high-demand date is flagged extreme
    pub extreme_demand_occupancy: u32,
    /// Maximum number of high-demand dates surfaced
    pub high_demand_limit: usize,
}

/// Generative pricing advisor configuration
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    /// Only the first N observations are sent to the model
    pub sample_days: usize,
}

/// Series store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// REST backend base URL; the in-memory store is used when absent
    pub api_url: Option<String>,
    pub timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub advisor: AdvisorConfig,
    pub store: StoreConfig,
    pub log_level: String,
    pub environment: String,
    pub audit_log_dir: String,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl PricingConfig {
    /// Create pricing config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            fixed_room_count: env_parse("FIXED_ROOM_COUNT", defaults.fixed_room_count),
            trailing_window_days: env_parse("TRAILING_WINDOW_DAYS", defaults.trailing_window_days),
            currency: env::var("CURRENCY").unwrap_or(defaults.currency),
            market_hint: env::var("MARKET_HINT").unwrap_or(defaults.market_hint),
            high_demand_occupancy: env_parse(
                "HIGH_DEMAND_OCCUPANCY",
                defaults.high_demand_occupancy,
            ),
            extreme_demand_occupancy: env_parse(
                "EXTREME_DEMAND_OCCUPANCY",
                defaults.extreme_demand_occupancy,
            ),
            high_demand_limit: env_parse("HIGH_DEMAND_LIMIT", defaults.high_demand_limit),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.fixed_room_count == 0 {
            return Err("FIXED_ROOM_COUNT must be greater than 0".to_string());
        }

        if self.trailing_window_days == 0 {
            return Err("TRAILING_WINDOW_DAYS must be greater than 0".to_string());
        }

        if self.high_demand_occupancy > 100 || self.extreme_demand_occupancy > 100 {
            return Err("Demand occupancy thresholds must be within 0-100".to_string());
        }

        Ok(())
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fixed_room_count: 50,
            trailing_window_days: 30,
            currency: "INR".to_string(),
            market_hint: "Mumbai".to_string(),
            high_demand_occupancy: 70,
            extreme_demand_occupancy: 90,
            high_demand_limit: 5,
        }
    }
}

impl AdvisorConfig {
    /// Create advisor config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            api_key: env_non_empty("GEMINI_API_KEY"),
            model: env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            endpoint: env::var("GEMINI_ENDPOINT").unwrap_or(defaults.endpoint),
            timeout_secs: env_parse("ADVISOR_TIMEOUT_SECS", defaults.timeout_secs),
            temperature: env_parse("ADVISOR_TEMPERATURE", defaults.temperature),
            sample_days: env_parse("ADVISOR_SAMPLE_DAYS", defaults.sample_days),
        };

        if config.timeout_secs == 0 {
            return Err("ADVISOR_TIMEOUT_SECS must be greater than 0".to_string());
        }

        if !(0.0..=2.0).contains(&config.temperature) {
            return Err(format!(
                "Invalid ADVISOR_TEMPERATURE: {}. Must be within 0.0-2.0",
                config.temperature
            ));
        }

        Ok(config)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if the generative advisor can be used
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 20,
            temperature: 0.3,
            sample_days: 10,
        }
    }
}

impl StoreConfig {
    /// Create store config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let api_url =
            env_non_empty("STORE_API_URL").map(|url| url.trim_end_matches('/').to_string());
        let timeout_secs = env_parse("STORE_TIMEOUT_SECS", 10u64);

        if timeout_secs == 0 {
            return Err("STORE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self { api_url, timeout_secs })
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let pricing = PricingConfig::from_env()?;
        let advisor = AdvisorConfig::from_env()?;
        let store = StoreConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let audit_log_dir = env::var("AUDIT_LOG_DIR").unwrap_or_else(|_| "./logs".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            pricing,
            advisor,
            store,
            log_level: log_level.to_lowercase(),
            environment: environment.to_lowercase(),
            audit_log_dir,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            advisor: AdvisorConfig::default(),
            store: StoreConfig::default(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
            audit_log_dir: "./logs".to_string(),
        }
    }
}
