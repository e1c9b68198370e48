use chrono::Utc;

/// Nifty 50 constituents tracked by default, as quoted on the NSE feed.
pub const NIFTY_SYMBOLS: [&str; 30] = [
    "RELIANCE.NS", "TCS.NS", "HDFCBANK.NS", "INFY.NS", "ICICIBANK.NS",
    "HINDUNILVR.NS", "ITC.NS", "SBIN.NS", "BHARTIARTL.NS", "KOTAKBANK.NS",
    "BAJFINANCE.NS", "ASIANPAINT.NS", "HCLTECH.NS", "WIPRO.NS", "AXISBANK.NS",
    "MARUTI.NS", "TATASTEEL.NS", "NTPC.NS", "ADANIPORTS.NS", "ULTRACEMCO.NS",
    "SUNPHARMA.NS", "BAJAJFINSV.NS", "LT.NS", "TITAN.NS", "TATAMOTORS.NS",
    "NESTLEIND.NS", "POWERGRID.NS", "GRASIM.NS", "ONGC.NS", "JSWSTEEL.NS",
];

#[derive(Clone)]
pub struct Config {
    pub symbols: Vec<String>,
    pub poll_secs: u64,
    pub fetch_timeout_secs: u64,
    pub highlight_ms: u64,
    pub quote_base: String,
    pub relay_base: Option<String>,
    pub analyze_base: String,
    pub portfolio_csv: Option<String>,
    pub retry_max: u32,
    pub retry_base_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            symbols: std::env::var("SYMBOLS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or_else(|_| NIFTY_SYMBOLS.iter().map(|s| s.to_string()).collect()),
            poll_secs: std::env::var("POLL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(60),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            highlight_ms: std::env::var("HIGHLIGHT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(1000),
            quote_base: std::env::var("QUOTE_BASE").unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string()),
            relay_base: std::env::var("RELAY_BASE").ok().filter(|v| !v.is_empty()),
            analyze_base: std::env::var("ANALYZE_BASE").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
            portfolio_csv: std::env::var("PORTFOLIO_CSV").ok().filter(|v| !v.is_empty()),
            retry_max: std::env::var("RETRY_MAX").ok().and_then(|v| v.parse().ok()).unwrap_or(2),
            retry_base_delay_ms: std::env::var("RETRY_BASE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(250),
        }
    }
}

/// The ten risk-profile fields the analyze endpoint expects, form-encoded
/// verbatim in `analyze::AnalyzeClient::submit`.
#[derive(Clone, Debug)]
pub struct RiskProfile {
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub emergency_fund_months: f64,
    pub investment_experience: String,
    pub age: u32,
    pub retirement_goals: String,
    pub investment_horizon: String,
    pub risk_appetite: String,
}

impl RiskProfile {
    pub fn from_env() -> Self {
        Self {
            total_assets: std::env::var("TOTAL_ASSETS").ok().and_then(|v| v.parse().ok()).unwrap_or(1_500_000.0),
            total_liabilities: std::env::var("TOTAL_LIABILITIES").ok().and_then(|v| v.parse().ok()).unwrap_or(400_000.0),
            monthly_income: std::env::var("MONTHLY_INCOME").ok().and_then(|v| v.parse().ok()).unwrap_or(120_000.0),
            monthly_expenses: std::env::var("MONTHLY_EXPENSES").ok().and_then(|v| v.parse().ok()).unwrap_or(70_000.0),
            emergency_fund_months: std::env::var("EMERGENCY_FUND_MONTHS").ok().and_then(|v| v.parse().ok()).unwrap_or(6.0),
            investment_experience: std::env::var("INVESTMENT_EXPERIENCE").unwrap_or_else(|_| "Intermediate".to_string()),
            age: std::env::var("AGE").ok().and_then(|v| v.parse().ok()).unwrap_or(32),
            retirement_goals: std::env::var("RETIREMENT_GOALS").unwrap_or_else(|_| "Wealth creation".to_string()),
            investment_horizon: std::env::var("INVESTMENT_HORIZON").unwrap_or_else(|_| "Long-term".to_string()),
            risk_appetite: std::env::var("RISK_APPETITE").unwrap_or_else(|_| "Moderate".to_string()),
        }
    }
}

pub fn now_ts() -> u64 {
    Utc::now().timestamp() as u64
}
