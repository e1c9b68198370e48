//! Text rendering of the three recommendation tables.

use crate::analyze::{Holding, Pick, PortfolioAnalysis};
use crate::ticker::format;

/// Percent move from average purchase price to current rate.
pub fn price_change_pct(avg_purchase: f64, current: f64) -> f64 {
    if avg_purchase > 0.0 {
        (current - avg_purchase) / avg_purchase * 100.0
    } else {
        0.0
    }
}

pub fn render(analysis: &PortfolioAnalysis) -> String {
    let mut out = String::new();
    render_holdings(&mut out, &analysis.current_holdings);
    out.push('\n');
    render_picks(&mut out, "STOCKS TO KEEP", &analysis.keep);
    out.push('\n');
    render_picks(&mut out, "STOCKS TO EXIT", &analysis.exit);
    out
}

fn render_holdings(out: &mut String, holdings: &[Holding]) {
    push_heading(out, "CURRENT HOLDINGS");
    push_row(out, &["Security", "Qty", "Avg Buy", "Current", "Change", "Market Cap", "Sector", "Volatility"]);
    for h in holdings {
        let change = price_change_pct(h.average_purchase_price, h.current_market_rate);
        push_row(
            out,
            &[
                &h.security_name,
                &trim_qty(h.quantity_held),
                &format::rupees(h.average_purchase_price),
                &format::rupees(h.current_market_rate),
                &format!("{} {}", format::direction(change), format::signed_pct(change)),
                h.market_cap.as_str(),
                &h.sector,
                h.volatility.tag(),
            ],
        );
    }
}

fn render_picks(out: &mut String, title: &str, picks: &[Pick]) {
    push_heading(out, title);
    push_row(out, &["Security", "Qty", "Avg Buy", "Current", "Change", "Market Cap", "Reason"]);
    for p in picks {
        let change = price_change_pct(p.average_purchase_price, p.current_market_rate);
        push_row(
            out,
            &[
                &p.security_name,
                &trim_qty(p.quantity_held),
                &format::rupees(p.average_purchase_price),
                &format::rupees(p.current_market_rate),
                &format!("{} {}", format::direction(change), format::signed_pct(change)),
                p.market_cap.as_str(),
                &p.reason,
            ],
        );
    }
}

fn push_heading(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.len()));
    out.push('\n');
}

fn push_row(out: &mut String, cells: &[&str]) {
    // Fixed widths keep rows aligned; the last column runs free.
    const WIDTHS: [usize; 7] = [14, 8, 14, 14, 12, 11, 26];
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        match WIDTHS.get(i) {
            Some(w) => {
                line.push_str(cell);
                let pad = w.saturating_sub(cell.chars().count()) + 2;
                line.push_str(&" ".repeat(pad));
            }
            None => line.push_str(cell),
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn trim_qty(qty: f64) -> String {
    if qty.fract() == 0.0 {
        format!("{}", qty as i64)
    } else {
        format!("{:.2}", qty)
    }
}
