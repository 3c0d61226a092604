//! Work-item measurement units.
//!
//! Most trades are measured by a fixed unit regardless of what the catalog
//! rows say (porcelain by square meter, electrical rough-in by point, ...),
//! with a few sub-items measured by linear meter instead. The rules are an
//! ordered table matched against normalized names; the first match wins and
//! the catalog's recorded unit is the fallback.

use once_cell::sync::Lazy;

use crate::catalog::Catalog;
use crate::normalize::{normalize_arabic, normalize_key};

pub const SQUARE_METER: &str = "م2";
pub const LINEAR_METER: &str = "مط";
pub const POINT: &str = "نقطة";

enum MainMatch {
    /// Normalized main item contains any needle
    Contains(Vec<String>),
    /// Normalized main item equals one of the names
    Equals(Vec<String>),
}

struct UnitRule {
    main: MainMatch,
    /// Sub items containing any of these are measured in `sub_unit`
    sub_needles: Vec<String>,
    sub_unit: &'static str,
    unit: &'static str,
}

impl UnitRule {
    fn contains(needles: &[&str], unit: &'static str) -> Self {
        UnitRule {
            main: MainMatch::Contains(needles.iter().map(|n| normalize_arabic(n)).collect()),
            sub_needles: Vec::new(),
            sub_unit: unit,
            unit,
        }
    }

    fn equals(names: &[&str], unit: &'static str) -> Self {
        UnitRule {
            main: MainMatch::Equals(names.iter().map(|n| normalize_arabic(n)).collect()),
            sub_needles: Vec::new(),
            sub_unit: unit,
            unit,
        }
    }

    fn with_sub_exception(mut self, needles: &[&str], sub_unit: &'static str) -> Self {
        self.sub_needles = needles.iter().map(|n| normalize_arabic(n)).collect();
        self.sub_unit = sub_unit;
        self
    }

    fn matches_main(&self, main: &str) -> bool {
        match &self.main {
            MainMatch::Contains(needles) => needles.iter().any(|n| main.contains(n.as_str())),
            MainMatch::Equals(names) => names.iter().any(|n| n == main),
        }
    }

    fn unit_for(&self, sub: &str) -> &'static str {
        if self.sub_needles.iter().any(|n| sub.contains(n.as_str())) {
            self.sub_unit
        } else {
            self.unit
        }
    }
}

static UNIT_RULES: Lazy<Vec<UnitRule>> = Lazy::new(|| {
    vec![
        UnitRule::contains(&["بورسلين"], SQUARE_METER).with_sub_exception(&["وزر"], LINEAR_METER),
        UnitRule::contains(&["جبسوم بورد"], SQUARE_METER).with_sub_exception(
            &[
                "ابيض طولي",
                "أبيض طولي",
                "اخضر طولي",
                "أخضر طولي",
                "بيوت ستاير",
                "بيوت ستائر",
                "نور",
                "ماجنتك",
                "ماجنتك تراك",
                "تراك ماجنتك",
            ],
            LINEAR_METER,
        ),
        UnitRule::contains(&["تأسيس كهرباء"], POINT).with_sub_exception(&["صواعد"], LINEAR_METER),
        UnitRule::contains(&["تأسيس سباكة"], POINT),
        UnitRule::contains(&["تأسيس تكييف", "تكييفات"], LINEAR_METER),
        UnitRule::contains(&["عزل"], SQUARE_METER),
        UnitRule::equals(&["مباني", "هدم", "نقاشة", "نقاشه", "محارة", "رخام"], SQUARE_METER),
    ]
});

/// Unit fixed by the rule table, if any rule applies.
pub fn rule_unit(main_item: &str, sub_item: &str) -> Option<&'static str> {
    let main = normalize_key(main_item);
    let sub = normalize_arabic(sub_item);
    UNIT_RULES
        .iter()
        .find(|rule| rule.matches_main(&main))
        .map(|rule| rule.unit_for(&sub))
}

/// Measurement unit of a work item: rule table first, then the first unit
/// recorded in the catalog for the pair, else empty.
pub fn correct_unit(catalog: &Catalog, main_item: &str, sub_item: &str) -> String {
    rule_unit(main_item, sub_item)
        .map(str::to_string)
        .or_else(|| catalog.item_unit(main_item, sub_item).map(str::to_string))
        .unwrap_or_default()
}
