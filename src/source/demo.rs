use async_trait::async_trait;
use rand::Rng;
use std::sync::Mutex;

use crate::error::FetchError;
use crate::source::{Quote, QuoteSource};

/// Canned quote board used when the live source is unreachable. The first
/// fetch returns the seed values verbatim; later fetches random-walk each
/// price by roughly half a percent and report the step as the change.
pub struct DemoSource {
    state: Mutex<DemoState>,
}

struct DemoState {
    rows: Vec<DemoRow>,
    drifted: bool,
}

struct DemoRow {
    symbol: &'static str,
    name: &'static str,
    price: f64,
    change_pct: f64,
}

const SEED_ROWS: [(&str, &str, f64, f64); 30] = [
    ("RELIANCE", "Reliance Industries", 2935.40, 1.24),
    ("TCS", "Tata Consultancy Services", 3580.65, 0.78),
    ("HDFCBANK", "HDFC Bank", 1475.20, -0.42),
    ("INFY", "Infosys", 1420.80, 1.05),
    ("ICICIBANK", "ICICI Bank", 1027.90, 0.54),
    ("HINDUNILVR", "Hindustan Unilever", 2345.75, -0.61),
    ("ITC", "ITC Ltd", 434.25, 0.92),
    ("SBIN", "State Bank of India", 748.60, 1.37),
    ("BHARTIARTL", "Bharti Airtel", 1287.45, 0.28),
    ("KOTAKBANK", "Kotak Mahindra Bank", 1755.30, -0.19),
    ("BAJFINANCE", "Bajaj Finance", 6870.50, -1.12),
    ("ASIANPAINT", "Asian Paints", 2789.15, 0.37),
    ("HCLTECH", "HCL Technologies", 1342.90, 1.68),
    ("WIPRO", "Wipro Ltd", 445.75, 0.85),
    ("AXISBANK", "Axis Bank", 1128.40, 0.63),
    ("MARUTI", "Maruti Suzuki", 10425.80, -0.24),
    ("TATASTEEL", "Tata Steel", 178.55, 2.16),
    ("NTPC", "NTPC Ltd", 345.20, 0.48),
    ("ADANIPORTS", "Adani Ports", 1245.60, -0.73),
    ("ULTRACEMCO", "UltraTech Cement", 9870.25, 0.53),
    ("SUNPHARMA", "Sun Pharmaceutical", 1430.80, 1.14),
    ("BAJAJFINSV", "Bajaj Finserv", 1645.30, -0.86),
    ("LT", "Larsen & Toubro", 3420.75, 1.03),
    ("TITAN", "Titan Company", 3285.60, 0.42),
    ("TATAMOTORS", "Tata Motors", 887.45, 1.78),
    ("NESTLEIND", "Nestle India", 2486.90, -0.28),
    ("POWERGRID", "Power Grid Corp", 328.65, 0.36),
    ("GRASIM", "Grasim Industries", 2175.40, 0.59),
    ("ONGC", "Oil & Natural Gas Corp", 274.85, 1.47),
    ("JSWSTEEL", "JSW Steel", 892.30, 1.96),
];

impl DemoSource {
    pub fn new() -> Self {
        let rows = SEED_ROWS
            .iter()
            .map(|&(symbol, name, price, change_pct)| DemoRow { symbol, name, price, change_pct })
            .collect();
        Self {
            state: Mutex::new(DemoState { rows, drifted: false }),
        }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for DemoSource {
    // The canned board ignores the requested universe, same as the original
    // fallback: it always shows its own thirty rows.
    async fn fetch_quotes(&self, _symbols: &[String]) -> Result<Vec<Quote>, FetchError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| FetchError::Request("demo state poisoned".to_string()))?;
        if state.drifted {
            let mut rng = rand::thread_rng();
            for row in state.rows.iter_mut() {
                // Step in [-0.45%, +0.55%), slightly upward biased.
                let step_pct = rng.gen_range(-0.45..0.55);
                row.price *= 1.0 + step_pct / 100.0;
                row.change_pct = step_pct;
            }
        } else {
            state.drifted = true;
        }
        Ok(state
            .rows
            .iter()
            .map(|row| Quote {
                symbol: row.symbol.to_string(),
                name: Some(row.name.to_string()),
                price: Some(row.price),
                change_pct: Some(row.change_pct),
                volume: None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_fetch_returns_seed_values() {
        let src = DemoSource::new();
        let quotes = src.fetch_quotes(&[]).await.unwrap();
        assert_eq!(quotes.len(), 30);
        assert_eq!(quotes[1].symbol, "TCS");
        assert_eq!(quotes[1].price, Some(3580.65));
        assert_eq!(quotes[1].change_pct, Some(0.78));
    }

    #[tokio::test]
    async fn later_fetches_drift_within_bounds() {
        let src = DemoSource::new();
        let first = src.fetch_quotes(&[]).await.unwrap();
        let second = src.fetch_quotes(&[]).await.unwrap();
        assert_eq!(second.len(), 30);
        for (a, b) in first.iter().zip(second.iter()) {
            let (pa, pb) = (a.price.unwrap(), b.price.unwrap());
            assert!((pb - pa).abs() / pa < 0.006, "step too large: {} -> {}", pa, pb);
            let step = b.change_pct.unwrap();
            assert!((-0.45..0.55).contains(&step));
        }
    }
}
