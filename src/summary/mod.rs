pub mod templates;

use crate::config::Locale;
use crate::dataset::{UploadError, UploadedDataset};
use crate::factors::{schema, FieldKey, ManualFactors};

/// Column aggregates over an uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    pub rows: usize,
    pub mean_precipitation: f64,
    pub max_slope_angle: f64,
    pub mean_vegetation_cover: f64,
}

impl Aggregates {
    pub fn compute(dataset: &UploadedDataset) -> Result<Self, UploadError> {
        if dataset.is_empty() {
            return Err(UploadError::Empty);
        }

        let column = |key| UploadedDataset::column_name(key);
        let mean_precipitation = mean(dataset.values(FieldKey::Precipitation))
            .ok_or(UploadError::NoValues(column(FieldKey::Precipitation)))?;
        let max_slope_angle = max(dataset.values(FieldKey::SlopeAngle))
            .ok_or(UploadError::NoValues(column(FieldKey::SlopeAngle)))?;
        let mean_vegetation_cover = mean(dataset.values(FieldKey::VegetationCover))
            .ok_or(UploadError::NoValues(column(FieldKey::VegetationCover)))?;

        Ok(Self {
            rows: dataset.len(),
            mean_precipitation,
            max_slope_angle,
            mean_vegetation_cover,
        })
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.reduce(f64::max)
}

/// Two decimals at most, trailing zeros dropped: `150.0` -> `150`, `52.50` -> `52.5`.
pub fn format_number(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn unit(key: FieldKey, locale: Locale) -> &'static str {
    match key {
        FieldKey::SlopeAngle => templates::for_locale(locale).degrees,
        _ => schema::field(key).unit,
    }
}

/// Factor listing followed by the explanation sentence.
pub fn render_manual(factors: &ManualFactors, locale: Locale) -> String {
    let t = templates::for_locale(locale);
    let soil = factors.soil_type().label(locale);

    [
        t.manual_heading.to_string(),
        format!("{}: {} {}", t.precipitation, factors.precipitation(), unit(FieldKey::Precipitation, locale)),
        format!("{}: {}", t.soil_type, soil),
        format!("{}: {} {}", t.slope_angle, factors.slope_angle(), unit(FieldKey::SlopeAngle, locale)),
        format!("{}: {} {}", t.vegetation_cover, factors.vegetation_cover(), unit(FieldKey::VegetationCover, locale)),
        String::new(),
        t.explanation_heading.to_string(),
        manual_sentence(factors, locale),
    ]
    .join("\n")
}

pub fn manual_sentence(factors: &ManualFactors, locale: Locale) -> String {
    templates::manual_sentence(
        locale,
        &factors.precipitation().to_string(),
        &factors.slope_angle().to_string(),
        factors.soil_type().label(locale),
        &factors.vegetation_cover().to_string(),
    )
}

/// Aggregate listing followed by the explanation sentence.
pub fn render_upload(aggregates: &Aggregates, locale: Locale) -> String {
    let t = templates::for_locale(locale);

    [
        t.upload_heading.to_string(),
        format!(
            "{}: {} {}",
            t.mean_precipitation,
            format_number(aggregates.mean_precipitation),
            unit(FieldKey::Precipitation, locale)
        ),
        format!(
            "{}: {} {}",
            t.max_slope_angle,
            format_number(aggregates.max_slope_angle),
            unit(FieldKey::SlopeAngle, locale)
        ),
        format!(
            "{}: {} {}",
            t.mean_vegetation_cover,
            format_number(aggregates.mean_vegetation_cover),
            unit(FieldKey::VegetationCover, locale)
        ),
        String::new(),
        t.explanation_heading.to_string(),
        upload_sentence(aggregates, locale),
    ]
    .join("\n")
}

pub fn upload_sentence(aggregates: &Aggregates, locale: Locale) -> String {
    templates::upload_sentence(
        locale,
        &format_number(aggregates.mean_precipitation),
        &format_number(aggregates.max_slope_angle),
        &format_number(aggregates.mean_vegetation_cover),
    )
}
