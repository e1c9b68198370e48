use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::FetchError;
use crate::source::{Quote, QuoteSource};
use crate::state::Config;

/// Adapter for the Yahoo Finance v7 quote endpoint. When `relay_base` is
/// set, the target URL is percent-encoded and appended to the relay, the
/// same indirection the upstream deployment uses to sidestep origin checks.
pub struct YahooSource {
    client: Client,
    base: String,
    relay: Option<String>,
}

impl YahooSource {
    pub fn new(cfg: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.fetch_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base: cfg.quote_base.clone(),
            relay: cfg.relay_base.clone(),
        }
    }

    fn quote_url(&self, symbols: &[String]) -> String {
        let target = format!("{}/v7/finance/quote?symbols={}", self.base, symbols.join(","));
        match &self.relay {
            Some(relay) => {
                let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
                format!("{}?{}", relay, encoded)
            }
            None => target,
        }
    }
}

#[derive(Deserialize, Debug)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: Option<QuoteResponse>,
}

#[derive(Deserialize, Debug)]
struct QuoteResponse {
    result: Option<Vec<YahooQuote>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct YahooQuote {
    symbol: String,
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "regularMarketChangePercent")]
    regular_market_change_percent: Option<f64>,
    #[serde(rename = "regularMarketVolume")]
    regular_market_volume: Option<u64>,
}

#[async_trait]
impl QuoteSource for YahooSource {
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, FetchError> {
        let url = self.quote_url(symbols);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Request(format!("quote endpoint returned {}", status)));
        }
        let envelope: QuoteEnvelope = resp
            .json()
            .await
            .map_err(|e| FetchError::Shape(format!("quote body not parseable: {}", e)))?;
        let body = envelope
            .quote_response
            .ok_or_else(|| FetchError::Shape("missing quoteResponse".to_string()))?;
        if let Some(err) = body.error {
            return Err(FetchError::Request(format!("quote endpoint error: {}", err)));
        }
        let result = body
            .result
            .ok_or_else(|| FetchError::Shape("missing quoteResponse.result".to_string()))?;
        Ok(result
            .into_iter()
            .map(|q| Quote {
                symbol: q.symbol,
                name: q.long_name.or(q.short_name),
                price: q.regular_market_price,
                change_pct: q.regular_market_change_percent,
                volume: q.regular_market_volume,
            })
            .collect())
    }
}
