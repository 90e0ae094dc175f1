/// Money formatting helpers.
///
/// Amounts are stored as NUMERIC(12, 2) and carried as `BigDecimal`, so no
/// float rounding happens between the database and the dashboard cards.
use sqlx::types::BigDecimal;

/// Format an amount as dollars with thousands separators, e.g. `$1,234.50`.
pub fn format_usd(amount: &BigDecimal) -> String {
    let rounded = amount.round(2).with_scale(2).to_string();
    let (negative, digits) = match rounded.strip_prefix('-') {
        Some(rest) => (true, rest.to_string()),
        None => (false, rounded),
    };

    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let grouped = group_thousands(integer);

    if negative {
        format!("-${}.{}", grouped, fraction)
    } else {
        format!("${}.{}", grouped, fraction)
    }
}

fn group_thousands(integer: &str) -> String {
    let mut out = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse a user-supplied price such as `"12500"` or `"999.99"`.
pub fn parse_amount(amount_str: &str) -> Result<BigDecimal, String> {
    amount_str
        .trim()
        .parse::<BigDecimal>()
        .map_err(|_| "Invalid amount format".to_string())
        .and_then(|amount| {
            if amount < BigDecimal::from(0) {
                Err("Amount cannot be negative".to_string())
            } else {
                Ok(amount)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(&BigDecimal::from(0)), "$0.00");
        assert_eq!(format_usd(&BigDecimal::from_str("1234.5").unwrap()), "$1,234.50");
        assert_eq!(format_usd(&BigDecimal::from(1_000_000)), "$1,000,000.00");
        assert_eq!(format_usd(&BigDecimal::from_str("999.999").unwrap()), "$1,000.00");
        assert_eq!(format_usd(&BigDecimal::from_str("-42.1").unwrap()), "-$42.10");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("10000"), Ok(BigDecimal::from(10000)));
        assert_eq!(parse_amount(" 99.5 "), Ok(BigDecimal::from_str("99.5").unwrap()));
        assert_eq!(parse_amount("-1"), Err("Amount cannot be negative".to_string()));
        assert_eq!(parse_amount("+10000x"), Err("Invalid amount format".to_string()));
    }
}
