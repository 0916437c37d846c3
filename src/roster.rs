use crate::error::RosterError;
use crate::store::ClassRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fmt;

/// Columns every roster row must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    "COURSE_SUBJ_CODE",
    "COURSE_COURSE_CODE",
    "COURSE_TITLE",
    "COURSE_INSTRUCTOR",
];

const SECTION_COLUMN: &str = "COURSE_SECTION_NUMBER";

/// One validated course row from an imported roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRow {
    pub subject: String,
    pub course: String,
    pub title: String,
    pub instructor: String,
    pub section: Option<String>,
}

impl CourseRow {
    /// Name for the class role, e.g. `CS301 - Dr. Smith`.
    pub fn role_name(&self) -> String {
        format!("{}{} - {}", self.subject, self.course, self.instructor)
    }

    /// Name for the class channel, e.g. `CS301`. Discord normalizes the
    /// case on creation.
    pub fn channel_name(&self) -> String {
        format!("{}{}", self.subject, self.course)
    }

    /// Turn the row into a store record once its channel exists.
    pub fn into_record(self, channel: u64) -> ClassRecord {
        ClassRecord {
            channel,
            subject: self.subject,
            course: self.course,
            title: self.title,
            instructor: self.instructor,
            section: self.section,
        }
    }
}

/// Why a roster row was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssue {
    MissingColumn(String),
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::MissingColumn(name) => {
                write!(f, "missing required column {name}")
            }
        }
    }
}

/// Parse a CSV roster body into per-row outcomes.
///
/// Rows are independent: a rejected row never aborts the batch. Only a
/// CSV-level failure (or an empty roster) is an error.
pub fn parse_roster(body: &str) -> Result<Vec<Result<CourseRow, RowIssue>>, RosterError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| RosterError::Malformed { source })?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| RosterError::Malformed { source })?;
        rows.push(parse_row(&headers, &record));
    }

    if rows.is_empty() {
        return Err(RosterError::Empty);
    }
    Ok(rows)
}

fn parse_row(headers: &StringRecord, record: &StringRecord) -> Result<CourseRow, RowIssue> {
    let require = |name: &str| {
        column(headers, record, name)
            .map(str::to_string)
            .ok_or_else(|| RowIssue::MissingColumn(name.to_string()))
    };

    Ok(CourseRow {
        subject: require("COURSE_SUBJ_CODE")?,
        course: require("COURSE_COURSE_CODE")?,
        title: require("COURSE_TITLE")?,
        instructor: require("COURSE_INSTRUCTOR")?,
        section: column(headers, record, SECTION_COLUMN).map(str::to_string),
    })
}

/// Look up a named column in a row; absent or blank cells count as missing.
fn column<'a>(headers: &StringRecord, record: &'a StringRecord, name: &str) -> Option<&'a str> {
    let index = headers.iter().position(|h| h == name)?;
    record.get(index).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_example_roster() {
        let body = "COURSE_SUBJ_CODE,COURSE_COURSE_CODE,COURSE_TITLE,COURSE_INSTRUCTOR\nCS,301,Algorithms,Dr. Smith";
        let rows = parse_roster(body).unwrap();
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.subject, "CS");
        assert_eq!(row.course, "301");
        assert_eq!(row.title, "Algorithms");
        assert_eq!(row.instructor, "Dr. Smith");
        assert_eq!(row.section, None);
        assert_eq!(row.role_name(), "CS301 - Dr. Smith");
        assert_eq!(row.channel_name(), "CS301");
    }

    #[test]
    fn test_section_column_is_optional() {
        let body = "COURSE_SUBJ_CODE,COURSE_COURSE_CODE,COURSE_TITLE,COURSE_INSTRUCTOR,COURSE_SECTION_NUMBER\nCS,301,Algorithms,Dr. Smith,F01";
        let rows = parse_roster(body).unwrap();
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.section.as_deref(), Some("F01"));
    }

    #[test]
    fn test_missing_header_rejects_rows() {
        let body = "COURSE_SUBJ_CODE,COURSE_COURSE_CODE,COURSE_INSTRUCTOR\nCS,301,Dr. Smith";
        let rows = parse_roster(body).unwrap();
        assert_eq!(
            rows[0],
            Err(RowIssue::MissingColumn("COURSE_TITLE".to_string()))
        );
    }

    #[test]
    fn test_blank_cell_rejects_row() {
        let body = "COURSE_SUBJ_CODE,COURSE_COURSE_CODE,COURSE_TITLE,COURSE_INSTRUCTOR\nCS,301,,Dr. Smith";
        let rows = parse_roster(body).unwrap();
        assert_eq!(
            rows[0],
            Err(RowIssue::MissingColumn("COURSE_TITLE".to_string()))
        );
    }

    #[test]
    fn test_bad_row_does_not_abort_batch() {
        let body = "COURSE_SUBJ_CODE,COURSE_COURSE_CODE,COURSE_TITLE,COURSE_INSTRUCTOR\nCS,301,,Dr. Smith\nCS,311,Data Structures,Dr. Jones";
        let rows = parse_roster(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_err());
        assert_eq!(rows[1].as_ref().unwrap().course, "311");
    }

    #[test]
    fn test_empty_roster_is_an_error() {
        assert!(matches!(parse_roster(""), Err(RosterError::Empty)));
        assert!(matches!(
            parse_roster("COURSE_SUBJ_CODE,COURSE_COURSE_CODE,COURSE_TITLE,COURSE_INSTRUCTOR"),
            Err(RosterError::Empty)
        ));
    }

    #[test]
    fn test_into_record_keeps_fields() {
        let body = "COURSE_SUBJ_CODE,COURSE_COURSE_CODE,COURSE_TITLE,COURSE_INSTRUCTOR\nCS,301,Algorithms,Dr. Smith";
        let rows = parse_roster(body).unwrap();
        let record = rows[0].clone().unwrap().into_record(99);
        assert_eq!(record.channel, 99);
        assert_eq!(record.class_id(), "cs301");
    }
}
