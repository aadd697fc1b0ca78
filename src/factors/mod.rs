pub mod schema;

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::config::Locale;

pub use schema::FieldKey;

pub const PRECIPITATION_MAX: u32 = 500;
pub const SLOPE_ANGLE_MAX: u32 = 90;
pub const VEGETATION_COVER_MAX: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoilType {
    #[default]
    Clay,
    Sand,
    Loam,
    Gravel,
}

impl SoilType {
    pub const ALL: [SoilType; 4] = [SoilType::Clay, SoilType::Sand, SoilType::Loam, SoilType::Gravel];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Clay => "clay",
            SoilType::Sand => "sand",
            SoilType::Loam => "loam",
            SoilType::Gravel => "gravel",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.as_str(),
            Locale::Zh => match self {
                SoilType::Clay => "粘土",
                SoilType::Sand => "砂土",
                SoilType::Loam => "壤土",
                SoilType::Gravel => "砾土",
            },
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SoilType::ALL
            .into_iter()
            .find(|soil| s.eq_ignore_ascii_case(soil.as_str()) || s == soil.label(Locale::Zh))
            .ok_or_else(|| format!("unknown soil type '{s}' (expected clay, sand, loam or gravel)"))
    }
}

/// Hand-set factor values. Every field is within its declared range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualFactors {
    precipitation: u32,
    soil_type: SoilType,
    slope_angle: u32,
    vegetation_cover: u32,
}

impl Default for ManualFactors {
    fn default() -> Self {
        Self {
            precipitation: 100,
            soil_type: SoilType::Clay,
            slope_angle: 30,
            vegetation_cover: 50,
        }
    }
}

impl ManualFactors {
    pub fn new(precipitation: u32, soil_type: SoilType, slope_angle: u32, vegetation_cover: u32) -> Self {
        Self {
            precipitation: precipitation.min(PRECIPITATION_MAX),
            soil_type,
            slope_angle: slope_angle.min(SLOPE_ANGLE_MAX),
            vegetation_cover: vegetation_cover.min(VEGETATION_COVER_MAX),
        }
    }

    pub fn precipitation(&self) -> u32 {
        self.precipitation
    }

    pub fn soil_type(&self) -> SoilType {
        self.soil_type
    }

    pub fn slope_angle(&self) -> u32 {
        self.slope_angle
    }

    pub fn vegetation_cover(&self) -> u32 {
        self.vegetation_cover
    }

    /// Update one factor from user text. Numbers out of range are clamped.
    pub fn set(&mut self, key: FieldKey, value: &str) -> Result<(), String> {
        let value = value.trim();
        let parse_number = || {
            match value.parse::<i64>() {
                Ok(n) => Ok(n.clamp(0, u32::MAX as i64) as u32),
                Err(e) => match e.kind() {
                    IntErrorKind::PosOverflow => Ok(u32::MAX),
                    IntErrorKind::NegOverflow => Ok(0),
                    _ => Err(format!("'{value}' is not a whole number")),
                },
            }
        };

        *self = match key {
            FieldKey::Precipitation => Self::new(parse_number()?, self.soil_type, self.slope_angle, self.vegetation_cover),
            FieldKey::SoilType => Self { soil_type: value.parse()?, ..*self },
            FieldKey::SlopeAngle => Self::new(self.precipitation, self.soil_type, parse_number()?, self.vegetation_cover),
            FieldKey::VegetationCover => Self::new(self.precipitation, self.soil_type, self.slope_angle, parse_number()?),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_initial_controls() {
        let f = ManualFactors::default();
        assert_eq!(f.precipitation(), 100);
        assert_eq!(f.soil_type(), SoilType::Clay);
        assert_eq!(f.slope_angle(), 30);
        assert_eq!(f.vegetation_cover(), 50);
    }

    #[test]
    fn test_new_clamps_to_range() {
        let f = ManualFactors::new(9000, SoilType::Sand, 91, 250);
        assert_eq!(f.precipitation(), 500);
        assert_eq!(f.slope_angle(), 90);
        assert_eq!(f.vegetation_cover(), 100);
    }

    #[test]
    fn test_set_clamps_negative_to_zero() {
        let mut f = ManualFactors::default();
        f.set(FieldKey::SlopeAngle, "-5").unwrap();
        assert_eq!(f.slope_angle(), 0);
    }

    #[test]
    fn test_set_clamps_overflowing_digits() {
        let mut f = ManualFactors::default();
        f.set(FieldKey::Precipitation, "99999999999999999999").unwrap();
        assert_eq!(f.precipitation(), PRECIPITATION_MAX);
        f.set(FieldKey::SlopeAngle, "-99999999999999999999").unwrap();
        assert_eq!(f.slope_angle(), 0);
    }

    #[test]
    fn test_set_rejects_non_numeric() {
        let mut f = ManualFactors::default();
        assert!(f.set(FieldKey::Precipitation, "lots").is_err());
        assert_eq!(f, ManualFactors::default());
    }

    #[test]
    fn test_soil_type_parses_both_languages() {
        assert_eq!("Gravel".parse::<SoilType>().unwrap(), SoilType::Gravel);
        assert_eq!("壤土".parse::<SoilType>().unwrap(), SoilType::Loam);
        assert!("peat".parse::<SoilType>().is_err());
    }

    #[test]
    fn test_soil_type_label() {
        assert_eq!(SoilType::Sand.label(Locale::En), "sand");
        assert_eq!(SoilType::Sand.label(Locale::Zh), "砂土");
    }
}
