//! Format properties of the generated business codes.

use proptest::prelude::*;

use lasline_api::services::codes::{
    format_las_code, format_offer_number, format_production_number,
};
use lasline_api::storage::AttachmentStore;
use lasline_api::validation::{LAS_CODE_RE, OFFER_NUMBER_RE, PRODUCTION_NUMBER_RE};

fn family_code() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z0-9]{1,4}").unwrap()
}

proptest! {
    #[test]
    fn generated_las_codes_always_match_the_accepted_pattern(
        family in family_code(),
        sequence in 1u32..=9999,
    ) {
        let code = format_las_code(&family, sequence);
        prop_assert!(LAS_CODE_RE.is_match(&code), "{} must match", code);
    }

    #[test]
    fn las_codes_sort_with_their_sequence_inside_a_family(
        family in family_code(),
        a in 1u32..=9998,
    ) {
        let b = a + 1;
        prop_assert!(format_las_code(&family, a) < format_las_code(&family, b));
    }

    #[test]
    fn generated_offer_numbers_always_match_the_accepted_pattern(
        year in 2000i32..=2099,
        sequence in 1u32..=999,
    ) {
        let number = format_offer_number(year, sequence);
        prop_assert!(OFFER_NUMBER_RE.is_match(&number), "{} must match", number);
    }

    #[test]
    fn generated_production_numbers_always_match_the_accepted_pattern(
        year in 2000i32..=2099,
        sequence in 1u32..=9999,
    ) {
        let number = format_production_number(year, sequence);
        prop_assert!(PRODUCTION_NUMBER_RE.is_match(&number), "{} must match", number);
    }

    #[test]
    fn sanitized_filenames_never_escape_their_directory(
        name in "[a-zA-Z0-9._/-]{1,40}",
    ) {
        if let Ok(sanitized) = AttachmentStore::sanitize_filename(&name) {
            prop_assert!(!sanitized.contains('/'));
            prop_assert!(!sanitized.is_empty());
            prop_assert_ne!(sanitized.as_str(), "..");
        }
    }
}
