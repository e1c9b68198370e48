//! The ticker board and its synchronization pass.
//!
//! The board is the single mutable view state: an ordered list of entries,
//! possibly with one duplicate copy per symbol so a renderer can loop the
//! tape seamlessly. A synchronization pass reconciles the board against a
//! freshly fetched quote set; entries the fetch did not cover keep their
//! last known values.

use std::time::{Duration, Instant};

use crate::source::Quote;
use crate::state::now_ts;

pub mod format;

#[derive(Debug, Clone)]
pub struct TickerEntry {
    /// Base symbol, market suffix stripped (`TCS`, not `TCS.NS`).
    pub symbol: String,
    pub name: Option<String>,
    pub price: f64,
    pub change_pct: f64,
    pub last_updated: u64,
    highlight_until: Option<Instant>,
}

impl TickerEntry {
    pub fn display_price(&self) -> String {
        format::inr(self.price)
    }

    pub fn display_change(&self) -> String {
        format!("{} {}", format::direction(self.change_pct), format::signed_pct(self.change_pct))
    }

    pub fn is_highlighted(&self, now: Instant) -> bool {
        matches!(self.highlight_until, Some(deadline) if now < deadline)
    }
}

/// Strip a market-suffix decoration: `TCS.NS` -> `TCS`. Symbols without a
/// suffix (including index symbols like `^NSEI`) pass through unchanged.
pub fn base_symbol(symbol: &str) -> &str {
    match symbol.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => symbol,
    }
}

fn usable_price(quote: &Quote) -> Option<f64> {
    // Null, non-finite and zero prices are invalid data, not errors.
    quote.price.filter(|p| p.is_finite() && *p > 0.0)
}

pub struct TickerBoard {
    entries: Vec<TickerEntry>,
    highlight_ttl: Duration,
}

impl TickerBoard {
    pub fn from_quotes(quotes: &[Quote], highlight_ttl: Duration) -> Self {
        let ts = now_ts();
        let entries = quotes
            .iter()
            .filter_map(|q| {
                let price = usable_price(q)?;
                Some(TickerEntry {
                    symbol: base_symbol(&q.symbol).to_string(),
                    name: q.name.clone(),
                    price,
                    change_pct: q.change_pct.unwrap_or(0.0),
                    last_updated: ts,
                    highlight_until: None,
                })
            })
            .collect();
        Self { entries, highlight_ttl }
    }

    /// Append one copy of every entry, in order. Rendering concern only:
    /// both copies of a symbol stay in lockstep through `apply_quotes`.
    pub fn duplicate_for_loop(&mut self) {
        let copies = self.entries.clone();
        self.entries.extend(copies);
    }

    /// One synchronization pass. Every quote with a usable price updates
    /// all entries whose base symbol matches (case-sensitively); matched
    /// entries get a highlight deadline that lapses on its own. Returns
    /// the number of entry updates applied.
    pub fn apply_quotes(&mut self, quotes: &[Quote], now: Instant) -> usize {
        let ts = now_ts();
        let mut touched = 0;
        for quote in quotes {
            let Some(price) = usable_price(quote) else { continue };
            let base = base_symbol(&quote.symbol);
            for entry in self.entries.iter_mut().filter(|e| e.symbol == base) {
                entry.price = price;
                if let Some(change) = quote.change_pct {
                    entry.change_pct = change;
                }
                entry.last_updated = ts;
                entry.highlight_until = Some(now + self.highlight_ttl);
                touched += 1;
            }
        }
        touched
    }

    pub fn entries(&self) -> &[TickerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn highlighted(&self, now: Instant) -> usize {
        self.entries.iter().filter(|e| e.is_highlighted(now)).count()
    }

    /// One tape segment as text, for the cycle log.
    pub fn tape(&self) -> String {
        self.entries
            .iter()
            .take(self.logical_len())
            .map(|e| format!("{} {} {}", e.symbol, format::rupees(e.price), e.display_change()))
            .collect::<Vec<_>>()
            .join("  |  ")
    }

    fn logical_len(&self) -> usize {
        // A duplicated board holds exactly two copies; the tape shows one.
        let n = self.entries.len();
        if n >= 2 && self.entries[..n / 2] == self.entries[n / 2..] {
            n / 2
        } else {
            n
        }
    }
}

impl PartialEq for TickerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.price == other.price && self.change_pct == other.change_pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, price: Option<f64>, change: Option<f64>) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            name: None,
            price,
            change_pct: change,
            volume: None,
        }
    }

    fn board(symbols: &[(&str, f64, f64)]) -> TickerBoard {
        let quotes: Vec<Quote> = symbols
            .iter()
            .map(|&(s, p, c)| quote(s, Some(p), Some(c)))
            .collect();
        TickerBoard::from_quotes(&quotes, Duration::from_secs(1))
    }

    #[test]
    fn suffix_is_stripped_on_populate() {
        let b = board(&[("TCS.NS", 100.0, 0.0)]);
        assert_eq!(b.entries()[0].symbol, "TCS");
    }

    #[test]
    fn base_symbol_passthrough() {
        assert_eq!(base_symbol("TCS.NS"), "TCS");
        assert_eq!(base_symbol("TCS"), "TCS");
        assert_eq!(base_symbol("^NSEI"), "^NSEI");
        assert_eq!(base_symbol(".NS"), ".NS");
    }

    #[test]
    fn match_updates_price_change_and_highlight() {
        let mut b = board(&[("TCS.NS", 100.0, 0.0)]);
        let now = Instant::now();
        let n = b.apply_quotes(&[quote("TCS.NS", Some(105.0), Some(5.0))], now);
        assert_eq!(n, 1);
        let e = &b.entries()[0];
        assert_eq!(e.display_price(), "105.00");
        assert_eq!(e.change_pct, 5.0);
        assert!(e.is_highlighted(now));
    }

    #[test]
    fn unmatched_entries_are_untouched() {
        let mut b = board(&[("TCS.NS", 100.0, 1.0), ("INFY.NS", 200.0, 2.0)]);
        b.apply_quotes(&[quote("TCS.NS", Some(105.0), Some(5.0))], Instant::now());
        let infy = &b.entries()[1];
        assert_eq!(infy.price, 200.0);
        assert_eq!(infy.change_pct, 2.0);
        assert!(!infy.is_highlighted(Instant::now()));
    }

    #[test]
    fn null_and_zero_prices_are_skipped() {
        let mut b = board(&[("TCS.NS", 100.0, 1.0)]);
        let n = b.apply_quotes(
            &[
                quote("TCS.NS", None, Some(9.0)),
                quote("TCS.NS", Some(0.0), Some(9.0)),
                quote("TCS.NS", Some(f64::NAN), Some(9.0)),
            ],
            Instant::now(),
        );
        assert_eq!(n, 0);
        assert_eq!(b.entries()[0].price, 100.0);
        assert_eq!(b.entries()[0].change_pct, 1.0);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let mut b = board(&[("TCS.NS", 100.0, 1.0)]);
        let n = b.apply_quotes(&[quote("tcs.NS", Some(105.0), Some(5.0))], Instant::now());
        assert_eq!(n, 0);
        assert_eq!(b.entries()[0].price, 100.0);
    }

    #[test]
    fn loop_duplicates_update_together() {
        let mut b = board(&[("TCS.NS", 100.0, 1.0), ("INFY.NS", 200.0, 2.0)]);
        b.duplicate_for_loop();
        assert_eq!(b.len(), 4);
        let n = b.apply_quotes(&[quote("TCS.NS", Some(105.0), Some(5.0))], Instant::now());
        assert_eq!(n, 2);
        assert_eq!(b.entries()[0].price, 105.0);
        assert_eq!(b.entries()[2].price, 105.0);
    }

    #[test]
    fn missing_change_keeps_previous_value() {
        let mut b = board(&[("TCS.NS", 100.0, 1.5)]);
        b.apply_quotes(&[quote("TCS.NS", Some(105.0), None)], Instant::now());
        assert_eq!(b.entries()[0].price, 105.0);
        assert_eq!(b.entries()[0].change_pct, 1.5);
    }

    #[test]
    fn highlight_lapses_without_a_clear_call() {
        let mut b = board(&[("TCS.NS", 100.0, 0.0)]);
        let now = Instant::now();
        b.apply_quotes(&[quote("TCS.NS", Some(101.0), Some(1.0))], now);
        assert!(b.entries()[0].is_highlighted(now));
        assert_eq!(b.highlighted(now + Duration::from_millis(1500)), 0);
    }

    #[test]
    fn invalid_quotes_are_dropped_on_populate() {
        let b = TickerBoard::from_quotes(
            &[quote("TCS.NS", Some(100.0), Some(1.0)), quote("GHOST.NS", None, None)],
            Duration::from_secs(1),
        );
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn tape_renders_one_segment_of_a_duplicated_board() {
        let mut b = board(&[("TCS.NS", 3580.65, 0.78)]);
        b.duplicate_for_loop();
        let tape = b.tape();
        assert_eq!(tape.matches("TCS").count(), 1);
        assert!(tape.contains("\u{20b9}3,580.65"));
    }
}
