use std::path::Path;

use crate::factors::schema::{self, FieldKey, FieldKind, FieldSpec, REQUIRED_FIELDS};

use super::{FactorRow, UploadError, UploadedDataset};

/// Cell contents read as a missing value, the same set pandas treats as NaN.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || NA_TOKENS.contains(&cell)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// `.csv` is comma-delimited, `.txt` is tab-delimited.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Delimiter::Comma),
            "txt" => Ok(Delimiter::Tab),
            _ => Err(UploadError::UnsupportedExtension(ext)),
        }
    }

    fn byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

pub fn load_file(path: &Path) -> Result<UploadedDataset, UploadError> {
    let delimiter = Delimiter::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|e| UploadError::Io(e.to_string()))?;
    let dataset = parse_bytes(&bytes, delimiter)?;

    tracing::info!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.headers().len(),
        "loaded dataset"
    );

    Ok(dataset)
}

pub fn parse_bytes(bytes: &[u8], delimiter: Delimiter) -> Result<UploadedDataset, UploadError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| UploadError::Parse(format!("not valid UTF-8 text ({e})")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.trim().is_empty() {
        return Err(UploadError::Parse("no header row".into()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| UploadError::Parse(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let columns = schema::resolve_columns(&headers).map_err(|missing| UploadError::Schema { missing })?;

    let mut raw_rows = Vec::new();
    let mut rows = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| UploadError::Parse(e.to_string()))?;
        let row_number = i + 1;

        let mut numbers = [None; 4];
        let mut soil_type = None;
        for (spec, &idx) in REQUIRED_FIELDS.iter().zip(columns.iter()) {
            let Some(value) = record.get(idx).map(str::trim).filter(|v| !is_missing(v)) else {
                continue;
            };
            match spec.kind {
                FieldKind::Numeric => numbers[spec.key as usize] = Some(parse_number(value, row_number, spec)?),
                FieldKind::Categorical => soil_type = Some(value.to_string()),
            }
        }

        rows.push(FactorRow {
            precipitation: numbers[FieldKey::Precipitation as usize],
            soil_type,
            slope_angle: numbers[FieldKey::SlopeAngle as usize],
            vegetation_cover: numbers[FieldKey::VegetationCover as usize],
        });
        raw_rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(UploadError::Empty);
    }

    Ok(UploadedDataset {
        headers,
        raw_rows,
        rows,
    })
}

fn parse_number(value: &str, row: usize, spec: &FieldSpec) -> Result<f64, UploadError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| UploadError::InvalidValue {
            row,
            column: spec.name,
            value: value.to_string(),
        })
}
