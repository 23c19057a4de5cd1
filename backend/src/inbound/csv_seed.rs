//! CSV seed files for the catalogue.
//!
//! Ingredients are headerless `name,measurement_unit` rows. Tags are
//! `name,color,slug` rows and may start with that header line.

use std::io;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::domain::{NewIngredient, NewTag};

const TAG_HEADER: [&str; 3] = ["name", "color", "slug"];

/// A seed file that could not be read or holds an invalid row.
#[derive(Debug, thiserror::Error)]
pub enum SeedFileError {
    #[error("line {line}: {message}")]
    InvalidRow { line: u64, message: String },
    #[error("failed to read CSV: {0}")]
    Read(#[from] csv::Error),
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

fn field<'r>(record: &'r StringRecord, index: usize, name: &str) -> Result<&'r str, SeedFileError> {
    record.get(index).ok_or_else(|| SeedFileError::InvalidRow {
        line: line_of(record),
        message: format!("missing {name} column"),
    })
}

fn records(reader: impl io::Read) -> impl Iterator<Item = Result<StringRecord, csv::Error>> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
        .into_records()
}

/// Parse an ingredients file.
///
/// # Errors
/// Stops at the first unreadable or invalid row.
pub fn parse_ingredients(reader: impl io::Read) -> Result<Vec<NewIngredient>, SeedFileError> {
    let mut parsed = Vec::new();
    for record in records(reader) {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let ingredient = NewIngredient::try_from_parts(
            field(&record, 0, "name")?,
            field(&record, 1, "measurement_unit")?,
        )
        .map_err(|err| SeedFileError::InvalidRow {
            line: line_of(&record),
            message: err.to_string(),
        })?;
        parsed.push(ingredient);
    }
    Ok(parsed)
}

/// Parse a tags file, skipping an optional header line.
///
/// # Errors
/// Stops at the first unreadable or invalid row.
pub fn parse_tags(reader: impl io::Read) -> Result<Vec<NewTag>, SeedFileError> {
    let mut parsed = Vec::new();
    for (index, record) in records(reader).enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        if index == 0 && record.iter().eq(TAG_HEADER) {
            continue;
        }
        let tag = NewTag::try_from_parts(
            field(&record, 0, "name")?,
            field(&record, 1, "color")?,
            field(&record, 2, "slug")?,
        )
        .map_err(|err| SeedFileError::InvalidRow {
            line: line_of(&record),
            message: err.to_string(),
        })?;
        parsed.push(tag);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn reads_headerless_ingredients() {
        let parsed = parse_ingredients("абрикосовое варенье,г\nsalt, g\n\n".as_bytes())
            .expect("valid file");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "абрикосовое варенье");
        assert_eq!(parsed[1].measurement_unit, "g");
    }

    #[rstest]
    #[case("name,color,slug\nBreakfast,#E26C2D,breakfast\n")]
    #[case("Breakfast,#E26C2D,breakfast\n")]
    fn tag_header_is_optional(#[case] contents: &str) {
        let parsed = parse_tags(contents.as_bytes()).expect("valid file");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].slug.as_ref(), "breakfast");
    }

    #[rstest]
    #[case("salt,g\npepper\n", 2)]
    #[case("salt,g\nsugar,g\n,g\n", 3)]
    fn reports_line_of_invalid_ingredient(#[case] contents: &str, #[case] line: u64) {
        let err = parse_ingredients(contents.as_bytes()).expect_err("invalid row");
        assert!(
            matches!(err, SeedFileError::InvalidRow { line: found, .. } if found == line),
            "{err}"
        );
    }

    #[rstest]
    fn shipped_seed_files_parse() {
        let ingredients = parse_ingredients(include_str!("../../data/ingredients.csv").as_bytes())
            .expect("ingredients");
        let tags = parse_tags(include_str!("../../data/tags.csv").as_bytes()).expect("tags");
        assert_eq!(ingredients.len(), 8);
        assert_eq!(tags.len(), 3);
    }

    #[rstest]
    fn reports_line_of_invalid_tag() {
        let err = parse_tags("name,color,slug\nLunch,green,lunch\n".as_bytes())
            .expect_err("invalid colour");
        assert!(err.to_string().starts_with("line 2:"), "{err}");
    }
}
