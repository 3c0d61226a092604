//! # Numeric Coercion
//!
//! Everything numeric that enters the engine passes through here. The
//! estimator is driven by form input, where half-typed and invalid values are
//! the normal transient state, so nothing in this module fails: anything that
//! is not a finite number becomes `0.0`.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::numeric::{parse_number, format_number, format_rate};
//!
//! assert_eq!(parse_number("1,250.5 جنيه"), 1250.5);
//! assert_eq!(parse_number("abc"), 0.0);
//! assert_eq!(format_number(1234567.891), "1,234,567.89");
//! assert_eq!(format_rate(0.125), "0.125");
//! ```

/// Replace NaN and infinities with zero.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Percentage to multiplier fraction (`10` -> `0.10`), invalid input counts as 0%.
pub fn percent(value: f64) -> f64 {
    sanitize(value) / 100.0
}

/// Parse user text as a number.
///
/// Thousands separators are ignored and the longest numeric prefix wins
/// (`"12.5m"` -> `12.5`). Blank or non-numeric text yields `0.0`.
pub fn parse_number(input: &str) -> f64 {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();

    let numeric_len = cleaned
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .count();
    // only ASCII chars were counted, so this is a valid byte boundary
    let candidate = &cleaned[..numeric_len];

    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f64>().ok())
        .map(sanitize)
        .unwrap_or(0.0)
}

/// Format a money or quantity value with two decimals and thousands
/// separators (`1234.5` -> `"1,234.50"`). Non-finite values print as `"0.00"`.
pub fn format_number(value: f64) -> String {
    let value = sanitize(value);
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, frac_part)
}

/// Format a usage rate with up to four decimals, trailing zeros removed
/// (`1.5` -> `"1.5"`, `10.0` -> `"10"`).
pub fn format_rate(value: f64) -> String {
    let fixed = format!("{:.4}", sanitize(value));
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Round a value to four decimals, the precision rates are edited at.
pub fn round_rate(value: f64) -> f64 {
    parse_number(&format_rate(value))
}

/// Serde helpers that accept numbers, numeric strings or null.
///
/// Older project files store some values as text (rates typed into a form)
/// and non-finite values as `null`; both load as plain `f64`.
pub mod lenient {
    use serde::{Deserialize, Deserializer};

    use super::{parse_number, sanitize};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    impl Loose {
        fn into_option(self) -> Option<f64> {
            match self {
                Loose::Number(n) => Some(sanitize(n)),
                Loose::Text(s) if s.trim().is_empty() => None,
                Loose::Text(s) => Some(parse_number(&s)),
                Loose::Other(_) => None,
            }
        }
    }

    /// Deserialize into `f64`, anything unusable becomes `0.0`.
    pub fn f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Loose::deserialize(deserializer)?.into_option().unwrap_or(0.0))
    }

    /// Deserialize into `Option<f64>`; null and blank text become `None`.
    pub fn option_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Loose::deserialize(deserializer)?.into_option())
    }

    /// Deserialize a map of numbers, coercing each value.
    pub fn f64_map<'de, D>(
        deserializer: D,
    ) -> Result<std::collections::BTreeMap<String, f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = std::collections::BTreeMap::<String, Loose>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(k, v)| (k, v.into_option().unwrap_or(0.0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
        assert_eq!(sanitize(-2.5), -2.5);
    }

    #[test]
    fn test_parse_number_prefix_semantics() {
        assert_eq!(parse_number("42"), 42.0);
        assert_eq!(parse_number("  3.75  "), 3.75);
        assert_eq!(parse_number("1,000"), 1000.0);
        assert_eq!(parse_number("12.5m"), 12.5);
        assert_eq!(parse_number("1e"), 1.0);
        assert_eq!(parse_number("-7"), -7.0);
    }

    #[test]
    fn test_parse_number_invalid_is_zero() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number("."), 0.0);
        assert_eq!(parse_number("-"), 0.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0.00");
        assert_eq!(format_number(999.999), "1,000.00");
        assert_eq!(format_number(1234.5), "1,234.50");
        assert_eq!(format_number(-1234.5), "-1,234.50");
        assert_eq!(format_number(-0.001), "0.00");
        assert_eq!(format_number(f64::NAN), "0.00");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1.5), "1.5");
        assert_eq!(format_rate(10.0), "10");
        assert_eq!(format_rate(0.0), "0");
        assert_eq!(format_rate(0.33333333), "0.3333");
        assert_eq!(round_rate(0.123456), 0.1235);
    }

    #[test]
    fn test_lenient_deserialization() {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(deserialize_with = "lenient::f64")]
            amount: f64,
            #[serde(default, deserialize_with = "lenient::option_f64")]
            risk: Option<f64>,
        }

        let row: Row = serde_json::from_str(r#"{"amount": "2.5", "risk": null}"#).unwrap();
        assert_eq!(row.amount, 2.5);
        assert_eq!(row.risk, None);

        let row: Row = serde_json::from_str(r#"{"amount": null, "risk": "10"}"#).unwrap();
        assert_eq!(row.amount, 0.0);
        assert_eq!(row.risk, Some(10.0));

        let row: Row = serde_json::from_str(r#"{"amount": "oops"}"#).unwrap();
        assert_eq!(row.amount, 0.0);
        assert_eq!(row.risk, None);
    }
}
