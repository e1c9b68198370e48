//! Display formatting for prices and change percents, matching the en-IN
//! conventions the board has always rendered with.

/// Two decimals with Indian digit grouping: `1234567.89` -> `12,34,567.89`.
pub fn inr(value: f64) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (fixed.as_str(), "00"),
    };
    let grouped = group_indian(int_part);
    if negative {
        format!("-{}.{}", grouped, frac_part)
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}

/// `₹`-prefixed price string.
pub fn rupees(value: f64) -> String {
    format!("\u{20b9}{}", inr(value))
}

/// Signed two-decimal percent: `+1.24%`, `-0.42%`.
pub fn signed_pct(value: f64) -> String {
    format!("{}{:.2}%", if value >= 0.0 { "+" } else { "-" }, value.abs())
}

/// Direction glyph for a change percent.
pub fn direction(value: f64) -> char {
    if value >= 0.0 {
        '\u{25b2}'
    } else {
        '\u{25bc}'
    }
}

// Indian grouping: last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let bytes = head.as_bytes();
    let mut end = bytes.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
