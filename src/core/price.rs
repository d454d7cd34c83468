// src/core/price.rs
//
// Single normalization boundary for free-form configurator prices.
// Everything that means "no extra cost" collapses to one sentinel;
// everything else becomes `$<amount>` (or `-$<amount>` for credits).

use super::sanitize::normalize_ws;

/// Texts that mean "no charge", compared case-insensitively after
/// currency symbols are removed.
const ZERO_WORDS: &[&str] = &[
    "included", "no charge", "standard", "free", "null", "none", "n/a", "-",
];

const CURRENCY: &[char] = &['$', '€', '£', '¥', '₹'];

/// Normalize a raw price to `$<amount>` or the zero sentinel.
///
/// Idempotent for every sentinel: the sentinel itself, zero amounts,
/// empty text, the no-charge words and unparseable text all map to `zero`.
pub fn normalize_price(raw: &str, zero: &str) -> String {
    let t = raw.trim();
    if t.is_empty() || t == zero {
        return s!(zero);
    }

    let lower = t.to_lowercase();
    let words = normalize_ws(&lower.replace(CURRENCY, ""));
    if ZERO_WORDS.contains(&words.as_str()) {
        return s!(zero);
    }

    let residual: String = lower
        .chars()
        .filter(|c| !CURRENCY.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();

    match first_amount(&residual) {
        Some((negative, amount)) if !is_zero(&amount) => {
            if negative { format!("-${amount}") } else { format!("${amount}") }
        }
        _ => s!(zero),
    }
}

/// First numeric run (`123`, `123.45`, `.99` read as `0.99`) and whether a
/// `-` sits right before it.
fn first_amount(s: &str) -> Option<(bool, String)> {
    let bytes = s.as_bytes();
    let mut start = bytes.iter().position(u8::is_ascii_digit)?;
    let bare_fraction = start > 0 && bytes[start - 1] == b'.';
    if bare_fraction {
        start -= 1;
    }
    let mut end = if bare_fraction { start + 1 } else { start };
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    // Decimals only when a digit follows the dot.
    if !bare_fraction && end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    let negative = start > 0 && bytes[start - 1] == b'-';
    let amount = &s[start..end];
    Some((negative, if bare_fraction { format!("0{amount}") } else { s!(amount) }))
}

fn is_zero(amount: &str) -> bool {
    amount.chars().all(|c| c == '0' || c == '.')
}
