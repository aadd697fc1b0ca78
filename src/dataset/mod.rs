pub mod loader;

use std::fmt;

use crate::factors::schema::{self, FieldKey};

pub use loader::{load_file, parse_bytes, Delimiter};

#[derive(Debug, Clone, PartialEq)]
pub enum UploadError {
    /// File extension is neither `.csv` nor `.txt`.
    UnsupportedExtension(String),
    /// The byte stream is not delimited text.
    Parse(String),
    /// A numeric column holds something that is not a number.
    InvalidValue { row: usize, column: &'static str, value: String },
    /// Required columns are absent from the header.
    Schema { missing: Vec<&'static str> },
    /// No data rows at all.
    Empty,
    /// A numeric column has no values to aggregate.
    NoValues(&'static str),
    /// Reading the file failed.
    Io(String),
}

impl UploadError {
    /// Schema-class errors are about the shape of an otherwise readable file.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. } | Self::Empty | Self::NoValues(_))
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedExtension(ext) => {
                write!(f, "unsupported file type '{ext}': choose a .csv or .txt file")
            }
            Self::Parse(msg) => write!(f, "could not parse file: {msg}"),
            Self::InvalidValue { row, column, value } => {
                write!(f, "could not parse file: row {row}, column '{column}': '{value}' is not a number")
            }
            Self::Schema { missing } => {
                write!(f, "file is missing required columns: {}", missing.join(", "))
            }
            Self::Empty => write!(f, "file has a header but no data rows"),
            Self::NoValues(column) => write!(f, "column '{column}' has no values"),
            Self::Io(msg) => write!(f, "could not read file: {msg}"),
        }
    }
}

impl std::error::Error for UploadError {}

/// Required factor values of one data row. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorRow {
    pub precipitation: Option<f64>,
    pub soil_type: Option<String>,
    pub slope_angle: Option<f64>,
    pub vegetation_cover: Option<f64>,
}

impl FactorRow {
    pub fn numeric(&self, key: FieldKey) -> Option<f64> {
        match key {
            FieldKey::Precipitation => self.precipitation,
            FieldKey::SlopeAngle => self.slope_angle,
            FieldKey::VegetationCover => self.vegetation_cover,
            FieldKey::SoilType => None,
        }
    }
}

/// A validated upload: every required column is present.
#[derive(Debug, Clone)]
pub struct UploadedDataset {
    headers: Vec<String>,
    raw_rows: Vec<Vec<String>>,
    rows: Vec<FactorRow>,
}

impl UploadedDataset {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[FactorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Non-missing values of a numeric column.
    pub fn values(&self, key: FieldKey) -> impl Iterator<Item = f64> + '_ {
        self.rows().iter().filter_map(move |row| row.numeric(key))
    }

    /// Plain-text table of the header and up to `limit` rows.
    pub fn preview(&self, limit: usize) -> String {
        let mut lines = Vec::with_capacity(limit.min(self.raw_rows.len()) + 2);
        lines.push(self.headers.join(" | "));
        for row in self.raw_rows.iter().take(limit) {
            lines.push(row.join(" | "));
        }
        if self.raw_rows.len() > limit {
            lines.push(format!("… ({} more rows)", self.raw_rows.len() - limit));
        }
        lines.join("\n")
    }

    pub fn column_name(key: FieldKey) -> &'static str {
        schema::field(key).name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UploadedDataset {
        parse_bytes(
            b"precipitation,soilType,slopeAngle,vegetationCover\n100,clay,20,60\n,sand,40,40\n300,loam,10,\n",
            Delimiter::Comma,
        )
        .unwrap()
    }

    #[test]
    fn test_values_skip_missing_cells() {
        let ds = sample();
        assert_eq!(ds.values(FieldKey::Precipitation).collect::<Vec<_>>(), vec![100.0, 300.0]);
        assert_eq!(ds.values(FieldKey::VegetationCover).collect::<Vec<_>>(), vec![60.0, 40.0]);
        assert_eq!(ds.values(FieldKey::SoilType).count(), 0);
    }

    #[test]
    fn test_preview_truncates() {
        let preview = sample().preview(1);
        let lines: Vec<&str> = preview.lines().collect();
        assert_eq!(lines[0], "precipitation | soilType | slopeAngle | vegetationCover");
        assert_eq!(lines[1], "100 | clay | 20 | 60");
        assert_eq!(lines[2], "… (2 more rows)");
    }

    #[test]
    fn test_schema_class() {
        assert!(UploadError::Schema { missing: vec!["soilType"] }.is_schema());
        assert!(UploadError::Empty.is_schema());
        assert!(!UploadError::Parse("x".into()).is_schema());
    }

    #[test]
    fn test_schema_message_lists_columns() {
        let err = UploadError::Schema { missing: vec!["soilType", "slopeAngle"] };
        assert_eq!(err.to_string(), "file is missing required columns: soilType, slopeAngle");
    }
}
