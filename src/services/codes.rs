//! Sequential business-code generation.
//!
//! Every generator finds the highest numeric suffix among non-removed rows
//! sharing a prefix and returns prefix + (max + 1), zero-padded. Callers
//! that persist a generated code run the lookup and the insert inside one
//! transaction and retry once on a duplicate, so two concurrent creations
//! cannot both keep the same number.

use chrono::{Datelike, Utc};
use metrics::counter;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use tracing::instrument;

use crate::entities::{article, article_instruction, offer, production_order};
use crate::entities::article_instruction::InstructionKind;
use crate::errors::ServiceError;

/// Width of the numeric tail in LAS article codes and production numbers.
const SEQUENCE_WIDTH: usize = 4;
/// Width of the yearly block in offer numbers.
const OFFER_SEQUENCE_WIDTH: usize = 3;

/// Compose a LAS article code from its family code and sequence.
pub fn format_las_code(family_code: &str, sequence: u32) -> String {
    format!("LAS{}{:0width$}", family_code, sequence, width = SEQUENCE_WIDTH)
}

/// Compose an offer number: year, yearly sequence, revision block, letter.
pub fn format_offer_number(year: i32, sequence: u32) -> String {
    format!("{}_{:0width$}_01_A", year, sequence, width = OFFER_SEQUENCE_WIDTH)
}

/// Compose a production order number.
pub fn format_production_number(year: i32, sequence: u32) -> String {
    format!("{}.{:0width$}", year, sequence, width = SEQUENCE_WIDTH)
}

/// Compose an instruction code from its kind prefix and sequence.
pub fn format_instruction_code(kind: InstructionKind, sequence: u32) -> String {
    format!("{}{:0width$}", kind.code_prefix(), sequence, width = SEQUENCE_WIDTH)
}

/// Numeric tail of a code sharing `prefix`, if it parses cleanly.
fn numeric_suffix(code: &str, prefix: &str) -> Option<u32> {
    code.strip_prefix(prefix)?.parse().ok()
}

/// Highest numeric suffix in `codes` for `prefix`, zero when none match.
fn max_suffix<'a>(codes: impl Iterator<Item = &'a str>, prefix: &str) -> u32 {
    codes
        .filter_map(|code| numeric_suffix(code, prefix))
        .max()
        .unwrap_or(0)
}

/// Next LAS article code for a family, scanning non-removed articles only.
#[instrument(skip(db))]
pub async fn next_las_code<C: ConnectionTrait>(
    db: &C,
    family_code: &str,
) -> Result<String, ServiceError> {
    let prefix = format!("LAS{}", family_code);

    let codes: Vec<String> = article::Entity::find()
        .select_only()
        .column(article::Column::CodArticleLas)
        .filter(article::Column::CodArticleLas.like(format!("{}%", prefix)))
        .filter(article::Column::Removed.eq(false))
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

    let next = max_suffix(codes.iter().map(String::as_str), &prefix) + 1;
    counter!("lasline_codes.las_generated", 1);

    Ok(format_las_code(family_code, next))
}

/// Next offer number for the current year.
#[instrument(skip(db))]
pub async fn next_offer_number<C: ConnectionTrait>(db: &C) -> Result<String, ServiceError> {
    let year = Utc::now().year();
    let prefix = format!("{}_", year);

    let numbers: Vec<String> = offer::Entity::find()
        .select_only()
        .column(offer::Column::OfferNumber)
        .filter(offer::Column::OfferNumber.like(format!("{}%", prefix)))
        .filter(offer::Column::Removed.eq(false))
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

    // Only the yearly block (`NNN`) participates in the sequence; revision
    // block and letter restart at `01_A`.
    let max = numbers
        .iter()
        .filter_map(|number| {
            number
                .strip_prefix(&prefix)?
                .split('_')
                .next()?
                .parse::<u32>()
                .ok()
        })
        .max()
        .unwrap_or(0);

    counter!("lasline_codes.offer_generated", 1);

    Ok(format_offer_number(year, max + 1))
}

/// Next production order number for the current year.
#[instrument(skip(db))]
pub async fn next_production_number<C: ConnectionTrait>(db: &C) -> Result<String, ServiceError> {
    let year = Utc::now().year();
    let prefix = format!("{}.", year);

    let numbers: Vec<String> = production_order::Entity::find()
        .select_only()
        .column(production_order::Column::OrderProductionNumber)
        .filter(production_order::Column::OrderProductionNumber.like(format!("{}%", prefix)))
        .filter(production_order::Column::Removed.eq(false))
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

    let next = max_suffix(numbers.iter().map(String::as_str), &prefix) + 1;
    counter!("lasline_codes.production_generated", 1);

    Ok(format_production_number(year, next))
}

/// Next instruction code for a kind, scanning non-removed instructions only.
#[instrument(skip(db))]
pub async fn next_instruction_code<C: ConnectionTrait>(
    db: &C,
    kind: InstructionKind,
) -> Result<String, ServiceError> {
    let prefix = kind.code_prefix();

    let codes: Vec<String> = article_instruction::Entity::find()
        .select_only()
        .column(article_instruction::Column::Code)
        .filter(article_instruction::Column::Code.like(format!("{}%", prefix)))
        .filter(article_instruction::Column::Removed.eq(false))
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

    Ok(format_instruction_code(
        kind,
        max_suffix(codes.iter().map(String::as_str), prefix) + 1,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn las_code_is_zero_padded() {
        assert_eq!(format_las_code("AB", 1), "LASAB0001");
        assert_eq!(format_las_code("AB", 42), "LASAB0042");
        assert_eq!(format_las_code("X", 9999), "LASX9999");
    }

    #[test]
    fn offer_number_starts_revision_block() {
        assert_eq!(format_offer_number(2025, 7), "2025_007_01_A");
        assert!(crate::validation::OFFER_NUMBER_RE.is_match(&format_offer_number(2025, 7)));
    }

    #[test]
    fn production_number_matches_pattern() {
        assert_eq!(format_production_number(2025, 12), "2025.0012");
        assert!(
            crate::validation::PRODUCTION_NUMBER_RE.is_match(&format_production_number(2025, 12))
        );
    }

    #[test]
    fn suffix_parsing_ignores_foreign_prefixes() {
        let codes = ["LASAB0001", "LASAB0007", "LASXY0042", "LASAB12x"];
        assert_eq!(max_suffix(codes.into_iter(), "LASAB"), 7);
        assert_eq!(max_suffix(codes.into_iter(), "LASZZ"), 0);
    }

    #[test]
    fn generated_instruction_codes_match_pattern() {
        for kind in [
            InstructionKind::Ic,
            InstructionKind::Packaging,
            InstructionKind::Palletizing,
        ] {
            let code = format_instruction_code(kind, 3);
            assert!(
                crate::validation::INSTRUCTION_CODE_RE.is_match(&code),
                "{} should match",
                code
            );
        }
    }
}
