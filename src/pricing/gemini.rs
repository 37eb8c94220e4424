use super::{AdvisorError, AdvisorResult, MarketContext, PricingAdvisor, RawSuggestion};
use crate::config::AdvisorConfig;
use crate::models::{DailyObservation, PriceSuggestion};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Advisor backed by the Gemini `generateContent` REST API with a JSON
/// response schema.
pub struct GeminiAdvisor {
    client: Client,
    config: AdvisorConfig,
}

impl GeminiAdvisor {
    /// Create a new Gemini advisor
    pub fn new(config: AdvisorConfig) -> AdvisorResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdvisorError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Request body carrying the prompt, schema and sampling settings
    pub fn request_body(&self, series: &[DailyObservation], context: &MarketContext) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(series, context, self.config.sample_days) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
                "temperature": self.config.temperature,
            }
        })
    }
}

/// Prompt text with the rules of thumb and the leading slice of the series
pub fn build_prompt(
    series: &[DailyObservation],
    context: &MarketContext,
    sample_days: usize,
) -> String {
    let sample: Vec<Value> = series
        .iter()
        .take(sample_days)
        .map(|day| {
            json!({
                "date": day.date.to_string(),
                "occupancy": day.occupancy().to_f64().unwrap_or(0.0),
                "adr": day.adr().to_f64().unwrap_or(0.0),
                "competitorRate": day.competitor_rate().to_f64().unwrap_or(0.0),
            })
        })
        .collect();

    format!(
        "You are a revenue management expert for the hospitality market.\n\
         Analyze the following hotel data for a hotel in {market}.\n\
         Currency is {currency}.\n\
         Consider the occupancy trends and competitor rates.\n\n\
         Data: {data}\n\n\
         Provide pricing recommendations for these dates.\n\
         Rules of thumb:\n\
         - If occupancy > 80%, increase price.\n\
         - If occupancy < 40%, decrease price slightly to stimulate demand.\n\
         - Stay competitive with the competitor rate.\n\
         - Identify potential events based on dates (weekends, weddings, festivals).\n\
         Every reason must cite the occupancy or the competitor rate it is based on.",
        market = context.market_hint,
        currency = context.currency,
        data = Value::Array(sample),
    )
}

/// JSON schema the model must answer with
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "date": { "type": "STRING", "description": "YYYY-MM-DD format" },
                "currentPrice": { "type": "NUMBER" },
                "recommendedPrice": { "type": "NUMBER" },
                "reason": { "type": "STRING" },
                "demandLevel": { "type": "STRING", "enum": ["Low", "Medium", "High", "Extreme"] }
            },
            "required": ["date", "currentPrice", "recommendedPrice", "reason", "demandLevel"]
        }
    })
}

/// Pull the suggestion array out of a `generateContent` response.
///
/// Items that fail the contract are dropped with a warning; a response with
/// no candidate text or a non-array body is malformed.
pub fn parse_response(
    body: &Value,
    series: &[DailyObservation],
) -> AdvisorResult<Vec<PriceSuggestion>> {
    let text = body
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AdvisorError::MalformedPayload("response has no candidate text".to_string())
        })?;

    let items: Vec<Value> = serde_json::from_str(text).map_err(|e| {
        AdvisorError::MalformedPayload(format!("candidate text is not a JSON array: {}", e))
    })?;

    let adr_by_date: BTreeMap<NaiveDate, Decimal> =
        series.iter().map(|day| (day.date, day.adr())).collect();

    let mut suggestions = Vec::with_capacity(items.len());
    for item in items {
        let checked = serde_json::from_value::<RawSuggestion>(item)
            .map_err(|e| e.to_string())
            .and_then(|raw| raw.into_suggestion(&adr_by_date));

        match checked {
            Ok(suggestion) => suggestions.push(suggestion),
            Err(e) => warn!("Discarding advisor item: {}", e),
        }
    }

    Ok(suggestions)
}

#[async_trait]
impl PricingAdvisor for GeminiAdvisor {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn suggest(
        &self,
        series: &[DailyObservation],
        context: &MarketContext,
    ) -> AdvisorResult<Vec<PriceSuggestion>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AdvisorError::MissingCredentials)?;

        info!(
            "Requesting price suggestions from {} for {} ({} days)",
            self.config.model,
            context.market_hint,
            series.len().min(self.config.sample_days)
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(series, context))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AdvisorError::Status(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        let suggestions = parse_response(&body, series)?;
        debug!("Advisor returned {} usable suggestions", suggestions.len());

        Ok(suggestions)
    }
}
