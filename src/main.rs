use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};

use portfoliofx::analyze::{self, report, AnalyzeClient};
use portfoliofx::error::FetchError;
use portfoliofx::indices::IndexBoard;
use portfoliofx::logging::{json_log, json_log_at, obj, v_num, v_str, Level};
use portfoliofx::poll;
use portfoliofx::source::demo::DemoSource;
use portfoliofx::source::retry::{retry_async, RetryConfig};
use portfoliofx::source::{QuoteSource, SourceKind};
use portfoliofx::state::{Config, RiskProfile};
use portfoliofx::ticker::TickerBoard;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let kind = SourceKind::from_env();
    json_log(
        "system",
        obj(&[
            ("event", v_str("startup")),
            ("source", v_str(&format!("{:?}", kind).to_lowercase())),
            ("symbols", v_num(cfg.symbols.len() as f64)),
            ("poll_secs", v_num(cfg.poll_secs as f64)),
        ]),
    );

    let retry_cfg = RetryConfig::from_config(&cfg);
    let mut source: Arc<dyn QuoteSource + Send + Sync> = kind.build(&cfg);

    // Initial population. If the live source is down we run the whole
    // session off the canned board rather than an empty tape.
    let quotes = retry_async(&retry_cfg, "fetch_quotes", |e: &FetchError| e.is_retryable(), || {
        source.fetch_quotes(&cfg.symbols)
    })
    .await;
    let quotes = match quotes {
        Ok(quotes) => quotes,
        Err(err) => {
            json_log_at(
                Level::Warn,
                "system",
                obj(&[
                    ("event", v_str("live_source_unavailable")),
                    ("error", v_str(&err.to_string())),
                    ("fallback", v_str("demo")),
                ]),
            );
            source = Arc::new(DemoSource::new());
            source
                .fetch_quotes(&cfg.symbols)
                .await
                .context("demo source failed")?
        }
    };

    let mut board = TickerBoard::from_quotes(&quotes, Duration::from_millis(cfg.highlight_ms));
    board.duplicate_for_loop();
    json_log(
        "ticker",
        obj(&[("event", v_str("populated")), ("entries", v_num(board.len() as f64))]),
    );
    println!("{}", board.tape());

    let board = Arc::new(Mutex::new(board));
    let indices = Arc::new(Mutex::new(IndexBoard::new()));

    // One-shot portfolio analysis when a CSV is supplied.
    if let Some(path) = &cfg.portfolio_csv {
        run_analysis(&cfg, path).await;
    }

    let handle = poll::spawn(cfg, source, board, indices);
    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    handle.cancel().await;
    json_log("system", obj(&[("event", v_str("shutdown"))]));
    Ok(())
}

async fn run_analysis(cfg: &Config, path: &str) {
    let (csv, filename) = match analyze::load_csv(path) {
        Ok(loaded) => loaded,
        Err(err) => {
            json_log_at(
                Level::Error,
                "analyze",
                obj(&[("event", v_str("csv_unreadable")), ("error", v_str(&err.to_string()))]),
            );
            eprintln!("There was an error analyzing your portfolio. Please try again.");
            return;
        }
    };
    let profile = RiskProfile::from_env();
    let client = AnalyzeClient::new(cfg);
    json_log(
        "analyze",
        obj(&[("event", v_str("submitted")), ("csv_bytes", v_num(csv.len() as f64))]),
    );
    match client.submit(&profile, csv, &filename).await {
        Ok(analysis) => {
            json_log(
                "analyze",
                obj(&[
                    ("event", v_str("completed")),
                    ("holdings", v_num(analysis.current_holdings.len() as f64)),
                    ("keep", v_num(analysis.keep.len() as f64)),
                    ("exit", v_num(analysis.exit.len() as f64)),
                ]),
            );
            println!("{}", report::render(&analysis));
        }
        Err(err) => {
            json_log_at(
                Level::Error,
                "analyze",
                obj(&[("event", v_str("failed")), ("error", v_str(&err.to_string()))]),
            );
            eprintln!("There was an error analyzing your portfolio. Please try again.");
        }
    }
}
