use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// R$ 50,00 = 5000 cents.
pub type Cents = i64;

/// Largest amount a single transaction may carry: R$ 100 billion.
///
/// Keeps ledger sums far from `i64` limits; the aggregations still saturate
/// rather than overflow.
pub const MAX_AMOUNT: Cents = 10_000_000_000_000;

/// Format cents as a plain decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Format cents the way the dashboard shows them: "R$ 1.234,56".
pub fn format_brl(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = (abs_cents / 100).to_string();

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{}R$ {},{:02}", sign, grouped, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(ParseCentsError::InvalidFormat);
    }

    let parts: Vec<&str> = input.split('.').collect();
    let cents = match parts.as_slice() {
        [units] => parse_units(units)?
            .checked_mul(100)
            .ok_or(ParseCentsError::InvalidFormat)?,
        [units, decimals] => {
            if units.is_empty() && decimals.is_empty() {
                return Err(ParseCentsError::InvalidFormat);
            }
            let units = if units.is_empty() { 0 } else { parse_units(units)? };

            // Pad or truncate to 2 digits
            let decimal_cents: i64 = match decimals.len() {
                0 => 0,
                1 => parse_units(decimals)? * 10,
                _ => parse_units(&decimals[..2])?,
            };

            units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseCentsError::InvalidFormat)?
        }
        _ => return Err(ParseCentsError::InvalidFormat),
    };

    Ok(if negative { -cents } else { cents })
}

fn parse_units(digits: &str) -> Result<i64, ParseCentsError> {
    digits.parse().map_err(|_| ParseCentsError::InvalidFormat)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

/// Serde adapter keeping the stored wire shape: amounts are JSON numbers in
/// currency units (`1000`, `12.5`), held in memory as cents.
///
/// Negative, non-finite and over-limit values fail to deserialize.
pub mod amount_units {
    use serde::{Deserializer, Serializer, de};

    use super::{Cents, MAX_AMOUNT};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        super::total_units::serialize(cents, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let cents = super::total_units::deserialize(deserializer)?;
        if !(0..=MAX_AMOUNT).contains(&cents) {
            return Err(de::Error::custom(format!(
                "amount out of range: {} cents",
                cents
            )));
        }
        Ok(cents)
    }
}

/// Serde adapter for derived totals: currency units on the wire, cents in
/// memory. Unlike [`amount_units`] the value may be negative (balances).
pub mod total_units {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::Cents;

    // Largest magnitude, in cents, that round-trips through f64 exactly
    const LIMIT: f64 = 9_007_199_254_740_992.0;

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        if cents % 100 == 0 {
            serializer.serialize_i64(cents / 100)
        } else {
            serializer.serialize_f64(*cents as f64 / 100.0)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let units = f64::deserialize(deserializer)?;
        let cents = (units * 100.0).round();
        if !cents.is_finite() || cents.abs() > LIMIT {
            return Err(de::Error::custom(format!("invalid amount: {}", units)));
        }
        Ok(cents as Cents)
    }
}
