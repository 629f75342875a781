//! Card-equivalence fingerprinting.
//!
//! Two tokens with different opaque ids can still be the same physical card.
//! The fingerprint is the (brand, last4, exp_month, exp_year) tuple; equal
//! fingerprints are treated as the same card for duplicate detection.

use serde::{Deserialize, Serialize};

use super::TokenRecord;

/// Derived card-equivalence tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: i32,
}

impl Fingerprint {
    /// Pure equality over the four fields.
    pub fn matches(&self, other: &Fingerprint) -> bool {
        self == other
    }
}

/// Finds the first existing record that is the same card as `candidate`.
///
/// A record counts as the same card when its token id equals the candidate's
/// or when their fingerprints are equal. No side effects.
pub fn find_duplicate<'a>(
    candidate: &TokenRecord,
    existing: &'a [TokenRecord],
) -> Option<&'a TokenRecord> {
    let candidate_fp = candidate.fingerprint();
    existing.iter().find(|record| {
        record.token_id == candidate.token_id || record.fingerprint().matches(&candidate_fp)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn token(id: &str, brand: &str, last4: &str, month: u32, year: i32) -> TokenRecord {
        TokenRecord {
            token_id: id.to_string(),
            customer_id: None,
            brand: brand.to_string(),
            last4: last4.to_string(),
            exp_month: month,
            exp_year: year,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn matches_is_field_equality() {
        let a = token("pm_a", "visa", "4242", 12, 2030).fingerprint();
        let b = token("pm_b", "visa", "4242", 12, 2030).fingerprint();
        assert!(a.matches(&b));

        let c = token("pm_c", "visa", "4242", 11, 2030).fingerprint();
        assert!(!a.matches(&c));
    }

    #[test]
    fn finds_duplicate_by_token_id() {
        let candidate = token("pm_1", "visa", "4242", 12, 2030);
        let existing = vec![token("pm_1", "mastercard", "4444", 1, 2029)];
        let found = find_duplicate(&candidate, &existing);
        assert_eq!(found.map(|t| t.token_id.as_str()), Some("pm_1"));
    }

    #[test]
    fn finds_duplicate_by_fingerprint_with_different_id() {
        let candidate = token("pm_new", "visa", "4242", 12, 2030);
        let existing = vec![
            token("pm_other", "mastercard", "4444", 1, 2029),
            token("pm_old", "visa", "4242", 12, 2030),
        ];
        let found = find_duplicate(&candidate, &existing);
        assert_eq!(found.map(|t| t.token_id.as_str()), Some("pm_old"));
    }

    #[test]
    fn returns_none_for_distinct_cards() {
        let candidate = token("pm_new", "visa", "4242", 12, 2030);
        let existing = vec![token("pm_other", "mastercard", "4444", 1, 2029)];
        assert!(find_duplicate(&candidate, &existing).is_none());
    }

    #[test]
    fn returns_none_for_empty_list() {
        let candidate = token("pm_new", "visa", "4242", 12, 2030);
        assert!(find_duplicate(&candidate, &[]).is_none());
    }

    proptest! {
        #[test]
        fn matches_is_reflexive(
            brand in "[a-z]{2,12}",
            last4 in "[0-9]{4}",
            month in 1u32..=12,
            year in 2024i32..2050,
        ) {
            let fp = token("pm_x", &brand, &last4, month, year).fingerprint();
            prop_assert!(fp.matches(&fp.clone()));
        }

        #[test]
        fn matches_is_symmetric(
            brand_a in "[a-z]{2,12}",
            brand_b in "[a-z]{2,12}",
            last4 in "[0-9]{4}",
            month in 1u32..=12,
            year in 2024i32..2050,
        ) {
            let a = token("pm_a", &brand_a, &last4, month, year).fingerprint();
            let b = token("pm_b", &brand_b, &last4, month, year).fingerprint();
            prop_assert_eq!(a.matches(&b), b.matches(&a));
        }

        #[test]
        fn duplicate_detection_ignores_token_id_when_fingerprints_match(
            brand in "[a-z]{2,12}",
            last4 in "[0-9]{4}",
            month in 1u32..=12,
            year in 2024i32..2050,
        ) {
            let candidate = token("pm_candidate", &brand, &last4, month, year);
            let existing = vec![token("pm_existing", &brand, &last4, month, year)];
            prop_assert!(find_duplicate(&candidate, &existing).is_some());
        }
    }
}
