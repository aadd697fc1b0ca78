/// Value kind of a required column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Precipitation,
    SoilType,
    SlopeAngle,
    VegetationCover,
}

/// One required column of an uploaded dataset.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub kind: FieldKind,
    pub unit: &'static str,
    /// Canonical English header.
    pub name: &'static str,
    /// Localized (Chinese) header.
    pub localized: &'static str,
}

impl FieldSpec {
    pub fn matches(&self, header: &str) -> bool {
        let header = header.trim().trim_start_matches('\u{feff}');
        header.eq_ignore_ascii_case(self.name) || header == self.localized
    }
}

/// Required columns, in display order.
pub const REQUIRED_FIELDS: [FieldSpec; 4] = [
    FieldSpec {
        key: FieldKey::Precipitation,
        kind: FieldKind::Numeric,
        unit: "mm",
        name: "precipitation",
        localized: "降雨量",
    },
    FieldSpec {
        key: FieldKey::SoilType,
        kind: FieldKind::Categorical,
        unit: "",
        name: "soilType",
        localized: "土壤类型",
    },
    FieldSpec {
        key: FieldKey::SlopeAngle,
        kind: FieldKind::Numeric,
        unit: "degrees",
        name: "slopeAngle",
        localized: "坡度角",
    },
    FieldSpec {
        key: FieldKey::VegetationCover,
        kind: FieldKind::Numeric,
        unit: "%",
        name: "vegetationCover",
        localized: "植被覆盖率",
    },
];

pub fn field(key: FieldKey) -> &'static FieldSpec {
    // REQUIRED_FIELDS is indexed in FieldKey declaration order
    &REQUIRED_FIELDS[key as usize]
}

/// Position of each required field in a header row, or the names of the ones absent.
pub fn resolve_columns(headers: &[String]) -> Result<[usize; 4], Vec<&'static str>> {
    let mut positions = [0usize; 4];
    let mut missing = Vec::new();

    for (slot, spec) in REQUIRED_FIELDS.iter().enumerate() {
        match headers.iter().position(|h| spec.matches(h)) {
            Some(idx) => positions[slot] = idx,
            None => missing.push(spec.name),
        }
    }

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(missing)
    }
}
