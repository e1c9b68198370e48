//! Benchmark indices and the exchange trading session.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};

use crate::source::Quote;
use crate::state::now_ts;
use crate::ticker::format;

pub const NIFTY: &str = "^NSEI";
pub const SENSEX: &str = "^BSESN";

pub fn index_symbols() -> Vec<String> {
    vec![NIFTY.to_string(), SENSEX.to_string()]
}

#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    pub symbol: String,
    pub value: f64,
    pub change_pct: f64,
    pub ts: u64,
}

impl IndexSnapshot {
    pub fn display(&self) -> String {
        format!(
            "{} {} {} {}",
            self.symbol,
            format::inr(self.value),
            format::direction(self.change_pct),
            format::signed_pct(self.change_pct)
        )
    }
}

/// Latest known values for the two benchmarks. A failed refresh leaves the
/// previous snapshots in place.
#[derive(Debug, Default)]
pub struct IndexBoard {
    pub nifty: Option<IndexSnapshot>,
    pub sensex: Option<IndexSnapshot>,
}

impl IndexBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb a quote set; unknown symbols and missing prices are ignored.
    pub fn update(&mut self, quotes: &[Quote]) -> usize {
        let ts = now_ts();
        let mut touched = 0;
        for quote in quotes {
            let Some(price) = quote.price.filter(|p| p.is_finite() && *p > 0.0) else {
                continue;
            };
            let snap = IndexSnapshot {
                symbol: quote.symbol.clone(),
                value: price,
                change_pct: quote.change_pct.unwrap_or(0.0),
                ts,
            };
            match quote.symbol.as_str() {
                NIFTY => {
                    self.nifty = Some(snap);
                    touched += 1;
                }
                SENSEX => {
                    self.sensex = Some(snap);
                    touched += 1;
                }
                _ => {}
            }
        }
        touched
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSession {
    Open,
    Closed,
}

impl MarketSession {
    /// NSE/BSE cash session: 09:15–15:30 IST, Monday through Friday.
    pub fn at(utc: DateTime<Utc>) -> Self {
        let ist = match FixedOffset::east_opt(5 * 3600 + 1800) {
            Some(offset) => utc.with_timezone(&offset),
            None => return MarketSession::Closed,
        };
        if matches!(ist.weekday(), Weekday::Sat | Weekday::Sun) {
            return MarketSession::Closed;
        }
        let minute_of_day = ist.hour() * 60 + ist.minute();
        if (9 * 60 + 15..15 * 60 + 30).contains(&minute_of_day) {
            MarketSession::Open
        } else {
            MarketSession::Closed
        }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketSession::Open => "open",
            MarketSession::Closed => "closed",
        }
    }
}
