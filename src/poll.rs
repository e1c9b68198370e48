//! The fetch-then-synchronize polling loop.
//!
//! Cycles are serialized: the interval skips ticks that elapse while a
//! cycle is still in flight, so two fetches never race on the board. The
//! spawned loop is owned by a `PollHandle`; dropping into `cancel()` stops
//! it and joins the task.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::indices::{index_symbols, IndexBoard, MarketSession};
use crate::logging::{json_log, json_log_at, obj, v_num, v_str, Level};
use crate::source::QuoteSource;
use crate::state::Config;
use crate::ticker::TickerBoard;

pub struct PollHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub async fn cancel(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

pub fn spawn(
    cfg: Config,
    source: Arc<dyn QuoteSource + Send + Sync>,
    board: Arc<Mutex<TickerBoard>>,
    indices: Arc<Mutex<IndexBoard>>,
) -> PollHandle {
    let (shutdown, mut stopped) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(cfg.poll_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; the board was just populated.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    run_cycle(&cfg, source.as_ref(), &board, &indices).await;
                }
                _ = stopped.changed() => {
                    json_log("poll", obj(&[("event", v_str("cancelled"))]));
                    break;
                }
            }
        }
    });
    PollHandle { shutdown, task }
}

/// One synchronization cycle. A failed quote fetch leaves the board as it
/// was: stale values stay visible until the next cycle succeeds.
async fn run_cycle(
    cfg: &Config,
    source: &(dyn QuoteSource + Send + Sync),
    board: &Mutex<TickerBoard>,
    indices: &Mutex<IndexBoard>,
) {
    match source.fetch_quotes(&cfg.symbols).await {
        Ok(quotes) => {
            let now = Instant::now();
            let (updated, highlighted) = match board.lock() {
                Ok(mut b) => {
                    let updated = b.apply_quotes(&quotes, now);
                    (updated, b.highlighted(now))
                }
                Err(_) => (0, 0),
            };
            json_log(
                "ticker",
                obj(&[
                    ("event", v_str("synchronized")),
                    ("quotes", v_num(quotes.len() as f64)),
                    ("updated", v_num(updated as f64)),
                    ("highlighted", v_num(highlighted as f64)),
                ]),
            );
        }
        Err(err) => {
            json_log_at(
                Level::Warn,
                "ticker",
                obj(&[
                    ("event", v_str("fetch_failed")),
                    ("error", v_str(&err.to_string())),
                    ("policy", v_str("stale_values_kept")),
                ]),
            );
        }
    }

    match source.fetch_quotes(&index_symbols()).await {
        Ok(quotes) => {
            let touched = match indices.lock() {
                Ok(mut ix) => ix.update(&quotes),
                Err(_) => 0,
            };
            json_log(
                "indices",
                obj(&[
                    ("event", v_str("refreshed")),
                    ("touched", v_num(touched as f64)),
                    ("session", v_str(MarketSession::now().as_str())),
                ]),
            );
        }
        Err(err) => {
            json_log_at(
                Level::Warn,
                "indices",
                obj(&[("event", v_str("fetch_failed")), ("error", v_str(&err.to_string()))]),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::source::Quote;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration as StdDuration;

    struct CountingSource {
        calls: AtomicU32,
    }

    #[async_trait]
    impl QuoteSource for CountingSource {
        async fn fetch_quotes(&self, _symbols: &[String]) -> Result<Vec<Quote>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Quote {
                symbol: "TCS.NS".to_string(),
                name: None,
                price: Some(3600.0),
                change_pct: Some(0.5),
                volume: None,
            }])
        }
    }

    struct FailingSource;

    #[async_trait]
    impl QuoteSource for FailingSource {
        async fn fetch_quotes(&self, _symbols: &[String]) -> Result<Vec<Quote>, FetchError> {
            Err(FetchError::Request("boom".to_string()))
        }
    }

    fn seeded_board() -> Arc<Mutex<TickerBoard>> {
        let quotes = vec![Quote {
            symbol: "TCS.NS".to_string(),
            name: None,
            price: Some(3580.65),
            change_pct: Some(0.78),
            volume: None,
        }];
        Arc::new(Mutex::new(TickerBoard::from_quotes(&quotes, StdDuration::from_secs(1))))
    }

    #[tokio::test]
    async fn cycle_applies_quotes_to_board() {
        let cfg = Config::from_env();
        let board = seeded_board();
        let indices = Mutex::new(IndexBoard::new());
        let source = CountingSource { calls: AtomicU32::new(0) };
        run_cycle(&cfg, &source, &board, &indices).await;
        let b = board.lock().unwrap();
        assert_eq!(b.entries()[0].price, 3600.0);
        // One call for the board universe, one for the benchmarks.
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_cycle_leaves_board_untouched() {
        let cfg = Config::from_env();
        let board = seeded_board();
        let indices = Mutex::new(IndexBoard::new());
        run_cycle(&cfg, &FailingSource, &board, &indices).await;
        let b = board.lock().unwrap();
        assert_eq!(b.entries()[0].price, 3580.65);
        assert_eq!(b.entries()[0].change_pct, 0.78);
    }

    #[tokio::test]
    async fn cancel_stops_the_loop() {
        let mut cfg = Config::from_env();
        cfg.poll_secs = 3600;
        let board = seeded_board();
        let indices = Arc::new(Mutex::new(IndexBoard::new()));
        let source: Arc<dyn QuoteSource + Send + Sync> =
            Arc::new(CountingSource { calls: AtomicU32::new(0) });
        let handle = spawn(cfg, source, board, indices);
        handle.cancel().await;
    }
}
