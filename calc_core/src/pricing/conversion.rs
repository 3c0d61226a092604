//! Unit Conversion Table
//!
//! Static price conversion factors between a resource's default unit and its
//! alternate purchase unit. A factor is the number of default units in one
//! alternate unit, so a price moves to the alternate unit by multiplying:
//!
//! - cement: 1 ton = 20 bags, bag price 300 -> ton price 6000
//! - sand: 1 truckload = 3 m3
//! - bricks: 1 thousand = 1000 bricks
//!
//! Lookups for pairs that are not in the table return the price unchanged.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::numeric::sanitize;

/// One convertible (default unit, alternate unit) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConversion {
    pub default_unit: &'static str,
    pub alt_unit: &'static str,
    /// Default units per alternate unit
    pub factor: f64,
}

const BAG: &str = "شيكارة";
const TON: &str = "طن";
const CUBIC_METER: &str = "م3";
const TRUCKLOAD: &str = "نقلة";
const LITER: &str = "لتر";
const KILO: &str = "كيلو";
const BRICK: &str = "طوبة";
const THOUSAND_BRICKS: &str = "1000 طوبة";

static CONVERSIONS: Lazy<HashMap<&'static str, UnitConversion>> = Lazy::new(|| {
    let entries: [(&str, &str, &str, f64); 15] = [
        ("أسمنت أسود", BAG, TON, 20.0),
        ("أسمنت أبيض", BAG, TON, 25.0),
        ("مادة لاصقة", BAG, TON, 20.0),
        ("رمل مونة", CUBIC_METER, TRUCKLOAD, 3.0),
        ("رمل ردم", CUBIC_METER, TRUCKLOAD, 3.0),
        ("سيلر حراري", LITER, "بستلة 20 لتر", 20.0),
        ("سيلر مائي", LITER, "بستلة 9 لتر", 9.0),
        ("معجون أكريلك", KILO, "بستلة 15 كيلو", 15.0),
        ("معجون دايتون", KILO, "بستلة 15 كيلو", 15.0),
        ("بلاستيك 7070", LITER, "بستلة 9 لتر", 9.0),
        ("دهانات بلاستيك", LITER, "بستلة 9 لتر", 9.0),
        ("طوب أحمر 20 10 5", BRICK, THOUSAND_BRICKS, 1000.0),
        ("طوب طفلي 20 9 5", BRICK, THOUSAND_BRICKS, 1000.0),
        ("طوب طفلي 24 11 6", BRICK, THOUSAND_BRICKS, 1000.0),
        ("طوب مصمت دبل 24 11 11", BRICK, THOUSAND_BRICKS, 1000.0),
    ];

    entries
        .into_iter()
        .map(|(resource, default_unit, alt_unit, factor)| {
            (
                resource,
                UnitConversion {
                    default_unit,
                    alt_unit,
                    factor,
                },
            )
        })
        .collect()
});

/// The conversion registered for a resource, if any
pub fn conversion_for(resource: &str) -> Option<&'static UnitConversion> {
    CONVERSIONS.get(resource)
}

/// Multiplier taking a price per `from` unit to a price per `to` unit.
fn price_factor(resource: &str, from: &str, to: &str) -> Option<f64> {
    let conv = conversion_for(resource)?;
    if conv.default_unit == from && conv.alt_unit == to {
        Some(conv.factor)
    } else if conv.alt_unit == from && conv.default_unit == to {
        Some(1.0 / conv.factor)
    } else {
        None
    }
}

/// Convert a default-unit price into the alternate unit.
pub fn convert_to_alt(resource: &str, price_in_default: f64, default_unit: &str, alt_unit: &str) -> f64 {
    let price = sanitize(price_in_default);
    match price_factor(resource, default_unit, alt_unit) {
        Some(factor) => sanitize(price * factor),
        None => price,
    }
}

/// Convert an alternate-unit price back into the default unit.
pub fn convert_from_alt(resource: &str, price_in_alt: f64, alt_unit: &str, default_unit: &str) -> f64 {
    let price = sanitize(price_in_alt);
    match price_factor(resource, alt_unit, default_unit) {
        Some(factor) => sanitize(price * factor),
        None => price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_cement_bag_to_ton_and_back() {
        let ton = convert_to_alt("أسمنت أسود", 300.0, "شيكارة", "طن");
        assert!(approx(ton, 6000.0));
        let bag = convert_from_alt("أسمنت أسود", ton, "طن", "شيكارة");
        assert!(approx(bag, 300.0));
    }

    #[test]
    fn test_other_factors() {
        assert!(approx(convert_to_alt("أسمنت أبيض", 10.0, "شيكارة", "طن"), 250.0));
        assert!(approx(convert_to_alt("رمل مونة", 200.0, "م3", "نقلة"), 600.0));
        assert!(approx(convert_from_alt("سيلر مائي", 90.0, "بستلة 9 لتر", "لتر"), 10.0));
        assert!(approx(convert_to_alt("طوب أحمر 20 10 5", 2.5, "طوبة", "1000 طوبة"), 2500.0));
    }

    #[test]
    fn test_missing_entry_is_identity() {
        assert_eq!(convert_to_alt("سيكا 107", 1000.0, "شيكارة", "طن"), 1000.0);
        // known resource, unknown unit pair
        assert_eq!(convert_to_alt("أسمنت أسود", 300.0, "شيكارة", "كيلو"), 300.0);
        // same unit both ways
        assert_eq!(convert_from_alt("أسمنت أسود", 300.0, "شيكارة", "شيكارة"), 300.0);
    }

    #[test]
    fn test_nan_input_is_zero() {
        assert_eq!(convert_to_alt("أسمنت أسود", f64::NAN, "شيكارة", "طن"), 0.0);
        assert_eq!(convert_from_alt("unknown", f64::NAN, "a", "b"), 0.0);
    }
}
