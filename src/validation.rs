//! Shared format patterns for business identifiers.
//!
//! These are referenced both by `validator` derive attributes on entity
//! models and by the sequential code generators, so the accepted formats
//! and the generated ones cannot drift apart.

use once_cell::sync::Lazy;
use regex::Regex;

/// Italian VAT number: exactly 11 digits.
pub static VAT_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{11}$").unwrap());

/// Italian postal code (CAP): exactly 5 digits.
pub static POSTAL_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}$").unwrap());

/// Province code: two uppercase letters.
pub static PROVINCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());

/// LAS article code: `LAS` + family code + 4-digit sequence.
pub static LAS_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^LAS[A-Z0-9]+\d{4}$").unwrap());

/// LAS family code used inside article codes.
pub static FAMILY_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{1,4}$").unwrap());

/// Offer number: `YYYY_NNN_NN_A`.
pub static OFFER_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}_\d{3}_\d{2}_[A-Z]$").unwrap());

/// Production order number: `YYYY.NNNN`.
pub static PRODUCTION_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}\.\d{4}$").unwrap());

/// Instruction code: type prefix + 4-digit sequence (e.g. `IC0012`).
pub static INSTRUCTION_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,3}\d{4}$").unwrap());

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("01234567890", true)]
    #[case("1234567890", false)]
    #[case("012345678901", false)]
    #[case("0123456789a", false)]
    fn vat_number_format(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(VAT_NUMBER_RE.is_match(input), valid);
    }

    #[rstest]
    #[case("LASAB0001", true)]
    #[case("LASX0042", true)]
    #[case("LAS0001", false)]
    #[case("ABX0001", false)]
    #[case("LASAB001", false)]
    fn las_code_format(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(LAS_CODE_RE.is_match(input), valid);
    }

    #[rstest]
    #[case("2025_001_01_A", true)]
    #[case("2025_12_01_A", false)]
    #[case("2025_001_01_a", false)]
    #[case("25_001_01_A", false)]
    fn offer_number_format(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(OFFER_NUMBER_RE.is_match(input), valid);
    }

    #[rstest]
    #[case("2025.0001", true)]
    #[case("2025.001", false)]
    #[case("2025_0001", false)]
    fn production_number_format(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(PRODUCTION_NUMBER_RE.is_match(input), valid);
    }
}
