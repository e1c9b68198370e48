//! Client for the portfolio analysis backend.
//!
//! The request is a multipart form: the ten risk-profile fields plus the
//! transaction CSV as a file part. The response body is validated into
//! typed records before anything renders from it; a backend-reported
//! `{"error": ...}` body and a missing `portfolio_analysis` are distinct
//! failures.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::FetchError;
use crate::state::{Config, RiskProfile};

pub mod report;

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioAnalysis {
    pub current_holdings: Vec<Holding>,
    pub keep: Vec<Pick>,
    pub exit: Vec<Pick>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Holding {
    pub security_name: String,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    pub quantity_held: f64,
    pub average_purchase_price: f64,
    pub current_market_rate: f64,
    pub sector: String,
    pub market_cap: MarketCap,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    pub volatility: Volatility,
}

/// A keep/exit recommendation row: holding fields plus the justification.
#[derive(Debug, Clone, Deserialize)]
pub struct Pick {
    pub security_name: String,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    pub quantity_held: f64,
    pub average_purchase_price: f64,
    pub current_market_rate: f64,
    pub market_cap: MarketCap,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MarketCap {
    #[serde(rename = "Large-cap")]
    Large,
    #[serde(rename = "Mid-cap")]
    Mid,
    #[serde(rename = "Small-cap")]
    Small,
    #[serde(other)]
    Unknown,
}

impl MarketCap {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketCap::Large => "Large-cap",
            MarketCap::Mid => "Mid-cap",
            MarketCap::Small => "Small-cap",
            MarketCap::Unknown => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Volatility {
    Low,
    // The backend has emitted both spellings over time.
    #[serde(alias = "Medium")]
    Moderate,
    High,
    #[serde(other)]
    Unknown,
}

impl Volatility {
    pub fn tag(&self) -> &'static str {
        match self {
            Volatility::Low => "[LOW]",
            Volatility::Moderate => "[MOD]",
            Volatility::High => "[HIGH]",
            Volatility::Unknown => "[?]",
        }
    }
}

#[derive(Deserialize, Debug)]
struct AnalyzeEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    portfolio_analysis: Option<serde_json::Value>,
}

pub struct AnalyzeClient {
    client: Client,
    base: String,
}

impl AnalyzeClient {
    pub fn new(cfg: &Config) -> Self {
        let client = Client::builder()
            // Analysis runs a model server-side; give it far longer than a quote fetch.
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base: cfg.analyze_base.clone() }
    }

    pub async fn submit(
        &self,
        profile: &RiskProfile,
        csv: Vec<u8>,
        filename: &str,
    ) -> Result<PortfolioAnalysis, FetchError> {
        let part = Part::bytes(csv)
            .file_name(filename.to_string())
            .mime_str("text/csv")
            .map_err(|e| FetchError::Request(format!("csv part: {}", e)))?;
        let form = Form::new()
            .text("total_assets", profile.total_assets.to_string())
            .text("total_liabilities", profile.total_liabilities.to_string())
            .text("monthly_income", profile.monthly_income.to_string())
            .text("monthly_expenses", profile.monthly_expenses.to_string())
            .text("emergency_fund_months", profile.emergency_fund_months.to_string())
            .text("investment_experience", profile.investment_experience.clone())
            .text("age", profile.age.to_string())
            .text("retirement_goals", profile.retirement_goals.clone())
            .text("investment_horizon", profile.investment_horizon.clone())
            .text("risk_appetite", profile.risk_appetite.clone())
            .part("portfolio_csv", part);

        let url = format!("{}/analyze", self.base);
        let resp = self.client.post(&url).multipart(form).send().await?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Request(format!("reading analyze body: {}", e)))?;
        if !status.is_success() {
            // Failure bodies are {"error": ...} when the backend got that far.
            let detail = serde_json::from_str::<AnalyzeEnvelope>(&body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| status.to_string());
            return Err(FetchError::Request(format!("analyze failed: {}", detail)));
        }
        parse_analysis(&body)
    }
}

/// Read the portfolio CSV from disk, returning the bytes and the filename
/// to carry on the multipart file part.
pub fn load_csv(path: &str) -> Result<(Vec<u8>, String), FetchError> {
    let bytes = std::fs::read(path)
        .map_err(|e| FetchError::Request(format!("reading {}: {}", path, e)))?;
    let filename = std::path::Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "portfolio.csv".to_string());
    Ok((bytes, filename))
}

/// Validate a 2xx analyze body into typed records.
pub fn parse_analysis(body: &str) -> Result<PortfolioAnalysis, FetchError> {
    let envelope: AnalyzeEnvelope = serde_json::from_str(body)
        .map_err(|e| FetchError::Shape(format!("analyze body not parseable: {}", e)))?;
    if let Some(error) = envelope.error {
        return Err(FetchError::Request(format!("analyze failed: {}", error)));
    }
    let analysis = envelope
        .portfolio_analysis
        .ok_or_else(|| FetchError::Shape("missing portfolio_analysis".to_string()))?;
    serde_json::from_value(analysis)
        .map_err(|e| FetchError::Shape(format!("malformed portfolio_analysis: {}", e)))
}
