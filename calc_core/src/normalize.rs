//! Arabic text normalization for matching work-item names.
//!
//! Catalog names are typed by hand and drift in spelling: hamza forms,
//! alef-maksura vs. yaa, stray diacritics, tatweel, and an optional leading
//! definite article. Business rules match on the normalized form so that
//! `"الإنشاءات"`, `"انشاءات"` and `"إنشاءات"` are the same key.

/// Strip a leading definite article `ال` (and any whitespace after it).
pub fn strip_article(s: &str) -> &str {
    let trimmed = s.trim();
    match trimmed.strip_prefix("ال") {
        Some(rest) => rest.trim_start(),
        None => trimmed,
    }
}

/// Normalize letter variants and remove diacritics.
///
/// - removes tashkeel (U+064B..=U+065F, U+0670) and tatweel (U+0640)
/// - `أ`, `إ`, `آ` -> `ا`
/// - `ى` -> `ي`
/// - drops `ؤ`, `ئ`, `ء`
/// - collapses runs of whitespace to one space and trims
pub fn normalize_arabic(s: &str) -> String {
    let mapped: String = s
        .chars()
        .filter(|c| !is_diacritic(*c))
        .filter_map(|c| match c {
            'أ' | 'إ' | 'آ' => Some('ا'),
            'ى' => Some('ي'),
            'ؤ' | 'ئ' | 'ء' => None,
            other => Some(other),
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full key used by the unit rule table: article stripped, then normalized.
pub fn normalize_key(s: &str) -> String {
    normalize_arabic(strip_article(s))
}

fn is_diacritic(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0640}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_article() {
        assert_eq!(strip_article("المباني"), "مباني");
        assert_eq!(strip_article("  ال هدم"), "هدم");
        assert_eq!(strip_article("رخام"), "رخام");
    }

    #[test]
    fn test_hamza_and_yaa_variants() {
        assert_eq!(normalize_arabic("تأسيس"), "تاسيس");
        assert_eq!(normalize_arabic("إضاءة"), "اضاة");
        assert_eq!(normalize_arabic("مبنى"), "مبني");
        assert_eq!(normalize_arabic("ستائر"), "ستار");
    }

    #[test]
    fn test_diacritics_and_tatweel_removed() {
        assert_eq!(normalize_arabic("نَقّاشة"), "نقاشة");
        assert_eq!(normalize_arabic("رخـــام"), "رخام");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_arabic("  جبسوم   بورد "), "جبسوم بورد");
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("الْمَبَانِي"), "مباني");
        assert_eq!(normalize_key("الإنشاءات"), normalize_key("انشاءات"));
    }
}
