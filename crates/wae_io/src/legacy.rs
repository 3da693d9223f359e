//! Import of the legacy server's `data.csv`.
//!
//! The file starts with a header row naming the columns. List columns hold a
//! bracketed literal such as `"[1, 0]"` and timestamps are ISO-8601 without a
//! zone, which are read as UTC.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDateTime, Utc};
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_while};
use nom::character::complete::{char, line_ending, multispace0};
use nom::combinator::{all_consuming, eof, map, value};
use nom::multi::{fold_many0, separated_list0, separated_list1};
use nom::number::complete::double;
use nom::sequence::{delimited, pair, terminated};
use std::path::Path;
use tracing::{debug, warn};
use wae_common::limits::{MAX_DISTANCE, MIN_DISTANCE};
use wae_common::record::GameRecord;

use crate::store::short_uid;

const COLUMNS: [&str; 10] = [
    "uid",
    "timestamp",
    "name",
    "age",
    "grid_size",
    "error_probabilities",
    "successful_rounds_per_level",
    "rounds_per_level",
    "level_reached",
    "logical_errors",
];

/// Records recovered from a legacy file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyImport {
    pub records: Vec<GameRecord>,

    /// Data rows that could not be converted.
    pub skipped: usize,
}

/// Reads and converts a legacy CSV file.
pub fn load_legacy_csv<P: AsRef<Path>>(path: P) -> Result<LegacyImport> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_legacy_csv(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Converts the contents of a legacy CSV file.
///
/// Fails only when the header row is unreadable or missing a column. Data
/// lines that do not parse as CSV, and rows that do not convert, are logged
/// and counted in [`LegacyImport::skipped`].
pub fn parse_legacy_csv(input: &str) -> Result<LegacyImport> {
    let mut rows = csv_rows(input)
        .into_iter()
        .filter(|row| row.as_ref().map_or(true, |fields| !is_blank(fields)));

    let Some(header) = rows.next() else {
        return Ok(LegacyImport::default());
    };
    let layout = ColumnLayout::from_header(&header.context("malformed header row")?)?;

    let mut import = LegacyImport::default();
    // Row 1 is the header.
    for (row_no, row) in rows.enumerate().map(|(i, row)| (i + 2, row)) {
        match row.and_then(|fields| layout.record(&fields)) {
            Ok(record) => import.records.push(record),
            Err(e) => {
                warn!(row = row_no, error = %e, "skipping legacy row");
                import.skipped += 1;
            }
        }
    }

    debug!(
        records = import.records.len(),
        skipped = import.skipped,
        "parsed legacy csv"
    );
    Ok(import)
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|field| field.trim().is_empty())
}

/// Positions of the known columns within a row.
struct ColumnLayout {
    positions: [usize; COLUMNS.len()],
}

impl ColumnLayout {
    fn from_header(header: &[String]) -> Result<Self> {
        let mut positions = [0; COLUMNS.len()];
        for (slot, column) in positions.iter_mut().zip(COLUMNS) {
            *slot = header
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| anyhow!("header is missing column `{column}`"))?;
        }
        Ok(Self { positions })
    }

    fn field<'r>(&self, row: &'r [String], column: usize) -> &'r str {
        row.get(self.positions[column])
            .map(|f| f.trim())
            .unwrap_or_default()
    }

    fn record(&self, row: &[String]) -> Result<GameRecord> {
        let field = |column| self.field(row, column);

        let grid_size: usize = field(4)
            .parse()
            .with_context(|| format!("bad grid_size `{}`", field(4)))?;
        if !(MIN_DISTANCE..=MAX_DISTANCE).contains(&grid_size) {
            bail!("grid_size {grid_size} is outside {MIN_DISTANCE}..={MAX_DISTANCE}");
        }
        let successful_rounds_per_level = parse_list(field(6), nom::character::complete::u32)
            .with_context(|| format!("bad successful_rounds_per_level `{}`", field(6)))?;
        let timestamp = parse_timestamp(field(1))?;

        let uid = match field(0) {
            "" => short_uid(),
            uid => uid.to_string(),
        };
        let rounds_per_level = field(7)
            .parse()
            .unwrap_or(successful_rounds_per_level.len() as u32);

        Ok(GameRecord {
            uid,
            timestamp,
            name: field(2).to_string(),
            age: field(3).parse().ok(),
            grid_size,
            error_probabilities: parse_list(field(5), double).unwrap_or_default(),
            successful_rounds_per_level,
            rounds_per_level,
            level_reached: field(8).parse().unwrap_or(0),
            logical_errors: field(9).parse().unwrap_or(0),
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("bad timestamp `{s}`"))
}

/// Parses a bracketed list literal such as `[1, 0, 2]`.
fn parse_list<'a, T, F>(s: &'a str, item: F) -> Result<Vec<T>>
where
    F: FnMut(&'a str) -> IResult<&'a str, T>,
{
    let list = delimited(
        pair(char('['), multispace0),
        separated_list0(delimited(multispace0, char(','), multispace0), item),
        pair(multispace0, char(']')),
    );
    match all_consuming(list)(s) {
        Ok((_, items)) => Ok(items),
        Err(_) => bail!("not a list literal"),
    }
}

fn quoted_field(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((is_not("\""), value("\"", tag("\"\"")))),
            String::new,
            |mut acc, piece| {
                acc.push_str(piece);
                acc
            },
        ),
        char('"'),
    )(input)
}

fn bare_field(input: &str) -> IResult<&str, String> {
    map(
        take_while(|c| c != ',' && c != '\r' && c != '\n'),
        String::from,
    )(input)
}

fn csv_row(input: &str) -> IResult<&str, Vec<String>> {
    terminated(
        separated_list1(char(','), alt((quoted_field, bare_field))),
        alt((line_ending, eof)),
    )(input)
}

/// Splits `input` into rows. A line that breaks the CSV syntax yields an
/// error and parsing resumes after its line ending.
fn csv_rows(mut input: &str) -> Vec<Result<Vec<String>>> {
    let mut rows = Vec::new();
    while !input.is_empty() {
        match csv_row(input) {
            Ok((rest, row)) => {
                rows.push(Ok(row));
                input = rest;
            }
            Err(e) => {
                rows.push(Err(anyhow!("malformed csv: {e}")));
                input = input.find('\n').map_or("", |end| &input[end + 1..]);
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const HEADER: &str = "uid,timestamp,name,age,grid_size,error_probabilities,\
                          successful_rounds_per_level,rounds_per_level,level_reached,logical_errors";

    #[test]
    fn splits_quoted_and_bare_fields() {
        let rows: Vec<_> = csv_rows("a,\"[1, 0]\",\"say \"\"hi\"\"\"\r\n,x\n")
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a", "[1, 0]", "say \"hi\""]);
        assert_eq!(rows[1], vec!["", "x"]);
    }

    #[test]
    fn broken_line_does_not_end_the_file() {
        let rows = csv_rows("a,b\n\"b\"x,c\nd,e");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_ref().unwrap(), &vec!["a", "b"]);
        assert!(rows[1].is_err());
        assert_eq!(rows[2].as_ref().unwrap(), &vec!["d", "e"]);
    }

    #[test]
    fn parses_list_literals() {
        assert_eq!(
            parse_list("[1, 0, 12]", nom::character::complete::u32).unwrap(),
            vec![1, 0, 12]
        );
        assert_eq!(
            parse_list("[]", nom::character::complete::u32).unwrap(),
            Vec::<u32>::new()
        );
        assert_eq!(parse_list("[0.5,1.0]", double).unwrap(), vec![0.5, 1.0]);
        assert!(parse_list("[1, 0", nom::character::complete::u32).is_err());
        assert!(parse_list("1, 0", nom::character::complete::u32).is_err());
    }

    #[test]
    fn converts_rows() {
        let csv = format!(
            "{HEADER}\r\n\
             1a2b3c4d,2024-03-05T14:22:01.123456,Ada,12,3,\"[0.5, 1.0]\",\"[5, 2]\",5,2,1\r\n\
             deadbeef,2024-03-06T09:00:00,,,2,[],\"[1]\",x,1,0\r\n"
        );
        let import = parse_legacy_csv(&csv).unwrap();
        assert_eq!(import.skipped, 0);
        assert_eq!(import.records.len(), 2);

        let ada = &import.records[0];
        assert_eq!(ada.uid, "1a2b3c4d");
        assert_eq!(ada.name, "Ada");
        assert_eq!(ada.age, Some(12));
        assert_eq!(ada.grid_size, 3);
        assert_eq!(ada.error_probabilities, vec![0.5, 1.0]);
        assert_eq!(ada.successful_rounds_per_level, vec![5, 2]);
        assert_eq!(ada.rounds_per_level, 5);
        assert_eq!(ada.level_reached, 2);
        assert_eq!(ada.logical_errors, 1);
        assert_eq!(ada.timestamp.year(), 2024);
        assert_eq!(ada.timestamp.hour(), 14);

        let anon = &import.records[1];
        assert_eq!(anon.age, None);
        assert!(anon.name.is_empty());
        // Non-numeric rounds_per_level falls back to the list length.
        assert_eq!(anon.rounds_per_level, 1);
    }

    #[test]
    fn skips_malformed_rows() {
        let csv = format!(
            "{HEADER}\n\
             aaaaaaaa,2024-03-05T14:22:01,a,10,three,[],[1],5,1,0\n\
             bbbbbbbb,yesterday,b,10,3,[],[1],5,1,0\n\
             cccccccc,2024-03-05T14:22:01,c,10,3,[],1;2,5,1,0\n\
             dddddddd,2024-03-05T14:22:01,d,10,3,[],[1],5,1,0\n\n"
        );
        let import = parse_legacy_csv(&csv).unwrap();
        assert_eq!(import.skipped, 3);
        assert_eq!(import.records.len(), 1);
        assert_eq!(import.records[0].uid, "dddddddd");
    }

    #[test]
    fn skips_lines_that_break_csv_syntax() {
        let csv = format!(
            "{HEADER}\n\
             aaaaaaaa,2024-03-05T14:22:01,a,10,3,[],[1],5,1,0\n\
             bbbbbbbb,2024-03-05T14:22:01,\"b\"x,10,3,[],[1],5,1,0\n\
             cccccccc,2024-03-05T14:22:01,c,10,3,[],[1],5,1,0\n"
        );
        let import = parse_legacy_csv(&csv).unwrap();
        assert_eq!(import.skipped, 1);
        let uids: Vec<_> = import.records.iter().map(|r| r.uid.as_str()).collect();
        assert_eq!(uids, vec!["aaaaaaaa", "cccccccc"]);
    }

    #[test]
    fn skips_unsupported_grid_sizes() {
        let csv = format!(
            "{HEADER}\n\
             aaaaaaaa,2024-03-05T14:22:01,a,10,5000000000,[],[1],5,1,0\n\
             bbbbbbbb,2024-03-05T14:22:01,b,10,9,[],[1],5,1,0\n\
             cccccccc,2024-03-05T14:22:01,c,10,1,[],[1],5,1,0\n\
             dddddddd,2024-03-05T14:22:01,d,10,7,[],[1],5,1,0\n"
        );
        let import = parse_legacy_csv(&csv).unwrap();
        assert_eq!(import.skipped, 3);
        assert_eq!(import.records.len(), 1);
        assert_eq!(import.records[0].grid_size, 7);
    }

    #[test]
    fn unreadable_header_is_an_error() {
        assert!(parse_legacy_csv("uid,\"time\"stamp\n1,2\n").is_err());
    }

    #[test]
    fn header_must_name_every_column() {
        let err = parse_legacy_csv("uid,timestamp,name\n1,2,3\n").unwrap_err();
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn empty_input_has_no_records() {
        assert_eq!(parse_legacy_csv("").unwrap(), LegacyImport::default());
    }
}
