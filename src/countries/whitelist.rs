use std::collections::HashSet;

use lazy_static::lazy_static;

/// Country names accepted by uploads.
pub const RECOGNIZED_COUNTRIES: [&str; 25] = [
    "India",
    "USA",
    "Japan",
    "Germany",
    "France",
    "Brazil",
    "Canada",
    "Australia",
    "Mexico",
    "UK",
    "China",
    "Russia",
    "South Korea",
    "Italy",
    "Spain",
    "Netherlands",
    "Switzerland",
    "Sweden",
    "Norway",
    "Denmark",
    "Belgium",
    "Austria",
    "Poland",
    "Greece",
    "Portugal",
];

lazy_static! {
    static ref LOWERCASED: HashSet<String> = RECOGNIZED_COUNTRIES
        .iter()
        .map(|c| c.to_lowercase())
        .collect();
}

/// Case-insensitive membership test. The caller trims.
pub fn is_recognized(name: &str) -> bool {
    LOWERCASED.contains(&name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_ignoring_case() {
        assert!(is_recognized("India"));
        assert!(is_recognized("INDIA"));
        assert!(is_recognized("india"));
        assert!(is_recognized("south korea"));
        assert!(is_recognized("uk"));
    }

    #[test]
    fn rejects_unknown_and_partial_names() {
        assert!(!is_recognized("Atlantis"));
        assert!(!is_recognized("Ind"));
        assert!(!is_recognized("South"));
        assert!(!is_recognized(""));
    }

    #[test]
    fn every_entry_is_recognized() {
        for name in RECOGNIZED_COUNTRIES {
            assert!(is_recognized(name), "{}", name);
        }
        assert_eq!(LOWERCASED.len(), RECOGNIZED_COUNTRIES.len());
    }
}
