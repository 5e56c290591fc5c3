//! Unit normalization for bound comparisons.
//!
//! A value such as `10k` or `100n` is reduced to an absolute magnitude
//! through one flat suffix table shared by every category. The same letter can
//! mean different things in different categories (`m` is milli-ohm to a
//! resistor reader but scales like a capacitance here); the table is applied
//! as-is and magnitudes are only meaningful when compared within one field.

use partstock_core::{StockError, StockResult};

/// Suffix → multiplier table.
const MULTIPLIERS: &[(char, f64)] = &[
    // resistance
    ('k', 1e3),
    ('M', 1e6),
    ('G', 1e9),
    // capacitance and inductance, relative to pico
    ('p', 1.0),
    ('n', 1e3),
    ('u', 1e6),
    ('m', 1e9),
    // plain units
    ('V', 1.0),
    ('A', 1.0),
    ('W', 1.0),
    ('%', 1.0),
];

/// Look up the multiplier for a unit suffix.
pub fn multiplier(suffix: char) -> Option<f64> {
    MULTIPLIERS
        .iter()
        .find(|(s, _)| *s == suffix)
        .map(|(_, m)| *m)
}

/// Convert a numeric-with-suffix string into an absolute magnitude.
///
/// - A string ending in a digit (or `.`) parses as a plain float.
/// - Otherwise the last character is a unit suffix and the prefix is scaled.
pub fn normalize(value: &str) -> StockResult<f64> {
    let last = value
        .chars()
        .next_back()
        .ok_or_else(|| StockError::InvalidNumber(value.to_string()))?;

    if last.is_ascii_digit() || last == '.' {
        return parse_float(value);
    }

    let factor = multiplier(last).ok_or_else(|| StockError::UnrecognizedUnit(last.to_string()))?;
    let prefix = &value[..value.len() - last.len_utf8()];
    Ok(parse_float(prefix)? * factor)
}

fn parse_float(s: &str) -> StockResult<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| StockError::InvalidNumber(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers_parse_unscaled() {
        assert_eq!(normalize("47").unwrap(), 47.0);
        assert_eq!(normalize("2.2").unwrap(), 2.2);
    }

    #[test]
    fn suffixes_scale_the_prefix() {
        assert_eq!(normalize("5k").unwrap(), 5_000.0);
        assert_eq!(normalize("10k").unwrap(), 10_000.0);
        assert_eq!(normalize("1M").unwrap(), 1_000_000.0);
        assert_eq!(normalize("100n").unwrap(), 100_000.0);
        assert_eq!(normalize("4.7u").unwrap(), 4_700_000.0);
        assert_eq!(normalize("16V").unwrap(), 16.0);
        assert_eq!(normalize("5%").unwrap(), 5.0);
    }

    #[test]
    fn milli_and_mega_are_distinct() {
        assert_eq!(normalize("1m").unwrap(), 1e9);
        assert_eq!(normalize("1M").unwrap(), 1e6);
    }

    #[test]
    fn unknown_suffix_is_rejected() {
        assert_eq!(
            normalize("10R").unwrap_err(),
            StockError::UnrecognizedUnit("R".to_string())
        );
        assert_eq!(
            normalize("0805Ω").unwrap_err(),
            StockError::UnrecognizedUnit("Ω".to_string())
        );
    }

    #[test]
    fn empty_or_garbled_numbers_are_rejected() {
        assert!(matches!(normalize(""), Err(StockError::InvalidNumber(_))));
        assert!(matches!(normalize("k"), Err(StockError::InvalidNumber(_))));
        assert!(matches!(normalize("1.2.3k"), Err(StockError::InvalidNumber(_))));
    }
}
