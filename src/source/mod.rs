use async_trait::async_trait;
use std::sync::Arc;

use crate::error::FetchError;
use crate::state::Config;

pub mod demo;
pub mod retry;
pub mod yahoo;

/// One external market data point for one traded symbol. Ephemeral: consumed
/// by a synchronization pass, never stored.
#[derive(Debug, Clone)]
pub struct Quote {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub change_pct: Option<f64>,
    pub volume: Option<u64>,
}

#[derive(Clone, Copy, Debug)]
pub enum SourceKind {
    Yahoo,
    Demo,
}

impl SourceKind {
    pub fn from_env() -> Self {
        match std::env::var("SOURCE").unwrap_or_else(|_| "yahoo".to_string()).as_str() {
            "demo" => SourceKind::Demo,
            _ => SourceKind::Yahoo,
        }
    }

    pub fn build(self, cfg: &Config) -> Arc<dyn QuoteSource + Send + Sync> {
        match self {
            SourceKind::Yahoo => Arc::new(yahoo::YahooSource::new(cfg)),
            SourceKind::Demo => Arc::new(demo::DemoSource::new()),
        }
    }
}

/// The one capability the ticker needs from the outside world. How quotes
/// are obtained (direct API, relay, canned data) is an adapter concern.
#[async_trait]
pub trait QuoteSource {
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, FetchError>;
}
