//! Volume and material formulas behind every calculator page.
//!
//! Everything here is pure arithmetic: dimensions come in with a unit tag,
//! are normalized to feet, multiplied out, and the resulting cubic-feet
//! figure is reported in cubic yards and cubic meters as well.
//!
//! ## Units
//!
//! | Unit   | To feet        |
//! |--------|----------------|
//! | feet   | × 1            |
//! | inches | ÷ 12           |
//! | meters | × 3.28084      |
//!
//! No rounding is applied beyond floating-point precision; display rounding
//! is the caller's business.
//!
//! ## Input policy
//!
//! Negative and non-finite dimensions are rejected with [`CalcError`]. Zero
//! passes through and yields a zero volume, so a half-filled form renders a
//! `0` result instead of an error.
//!
//! ## Material ratios
//!
//! [`material_breakdown`] splits the waste-adjusted *wet* volume into cement,
//! sand and aggregate at 0.22 / 0.33 / 0.45. The split is a fixed estimation
//! ratio, not a mass balance, and it is applied without the
//! [`DRY_VOLUME_FACTOR`]; callers that want loose dry quantities use
//! [`dry_volume`] separately. The numbers match what the published
//! calculators have always shown.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const INCHES_PER_FOOT: f64 = 12.0;
pub const FEET_PER_METER: f64 = 3.28084;
pub const CUBIC_FEET_PER_CUBIC_YARD: f64 = 27.0;
pub const CUBIC_METERS_PER_CUBIC_FOOT: f64 = 0.0283168;

/// Multiplier from poured (wet) volume to the loose dry materials needed.
pub const DRY_VOLUME_FACTOR: f64 = 1.54;

pub const CEMENT_FRACTION: f64 = 0.22;
pub const SAND_FRACTION: f64 = 0.33;
pub const AGGREGATE_FRACTION: f64 = 0.45;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be a finite number")]
    NotFinite { name: &'static str },
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{name} is not a number: {raw:?}")]
    NotANumber { name: &'static str, raw: String },
    #[error("Unknown length unit: {0:?} (expected ft, in or m)")]
    UnknownUnit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Feet,
    Inches,
    Meters,
}

impl LengthUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Feet => "ft",
            LengthUnit::Inches => "in",
            LengthUnit::Meters => "m",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ft" | "foot" | "feet" => Ok(LengthUnit::Feet),
            "in" | "inch" | "inches" => Ok(LengthUnit::Inches),
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(LengthUnit::Meters),
            _ => Err(CalcError::UnknownUnit(s.to_string())),
        }
    }
}

/// Convert a length in `unit` to feet.
pub fn to_feet(value: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Feet => value,
        LengthUnit::Inches => value / INCHES_PER_FOOT,
        LengthUnit::Meters => value * FEET_PER_METER,
    }
}

/// Convert a length in feet to `unit`.
pub fn from_feet(value: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Feet => value,
        LengthUnit::Inches => value * INCHES_PER_FOOT,
        LengthUnit::Meters => value / FEET_PER_METER,
    }
}

pub fn convert(value: f64, from: LengthUnit, to: LengthUnit) -> f64 {
    if from == to {
        return value;
    }
    from_feet(to_feet(value, from), to)
}

/// A single measured dimension with its unit tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimension {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Dimension {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub fn feet(value: f64) -> Self {
        Self::new(value, LengthUnit::Feet)
    }

    pub fn inches(value: f64) -> Self {
        Self::new(value, LengthUnit::Inches)
    }

    pub fn meters(value: f64) -> Self {
        Self::new(value, LengthUnit::Meters)
    }

    /// Validate and normalize to feet. `name` labels the error.
    fn checked_feet(&self, name: &'static str) -> Result<f64, CalcError> {
        check_non_negative(name, self.value)?;
        Ok(to_feet(self.value, self.unit))
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<f64, CalcError> {
    if !value.is_finite() {
        return Err(CalcError::NotFinite { name });
    }
    if value < 0.0 {
        return Err(CalcError::Negative { name, value });
    }
    Ok(value)
}

/// `L × W × D` in cubic feet. Covers slabs, beams, footings and walls.
pub fn rectangular_volume_cubic_feet(
    length: Dimension,
    width: Dimension,
    depth: Dimension,
) -> Result<f64, CalcError> {
    let l = length.checked_feet("length")?;
    let w = width.checked_feet("width")?;
    let d = depth.checked_feet("depth")?;
    Ok(l * w * d)
}

/// Cross-section of a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnSection {
    Circular { diameter: Dimension },
    Rectangular { length: Dimension, width: Dimension },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Column {
    pub section: ColumnSection,
    pub height: Dimension,
}

impl Column {
    pub fn is_circular(&self) -> bool {
        matches!(self.section, ColumnSection::Circular { .. })
    }
}

/// Column volume in cubic feet: `π r² h` for round columns, `L × W × H`
/// for rectangular ones.
pub fn column_volume_cubic_feet(column: &Column) -> Result<f64, CalcError> {
    let h = column.height.checked_feet("height")?;
    match column.section {
        ColumnSection::Circular { diameter } => {
            let r = diameter.checked_feet("diameter")? / 2.0;
            Ok(std::f64::consts::PI * r * r * h)
        }
        ColumnSection::Rectangular { length, width } => {
            let l = length.checked_feet("length")?;
            let w = width.checked_feet("width")?;
            Ok(l * w * h)
        }
    }
}

pub fn cubic_feet_to_yards(cubic_feet: f64) -> f64 {
    cubic_feet / CUBIC_FEET_PER_CUBIC_YARD
}

pub fn cubic_feet_to_meters(cubic_feet: f64) -> f64 {
    cubic_feet * CUBIC_METERS_PER_CUBIC_FOOT
}

/// One volume expressed in all three unit systems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeSummary {
    pub cubic_feet: f64,
    pub cubic_yards: f64,
    pub cubic_meters: f64,
}

impl VolumeSummary {
    pub fn from_cubic_feet(cubic_feet: f64) -> Self {
        Self {
            cubic_feet,
            cubic_yards: cubic_feet_to_yards(cubic_feet),
            cubic_meters: cubic_feet_to_meters(cubic_feet),
        }
    }
}

/// Cement / sand / aggregate split of a waste-adjusted volume.
///
/// All quantities share the unit of the input volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialBreakdown {
    pub volume: f64,
    pub waste_percent: f64,
    pub total_with_waste: f64,
    pub cement: f64,
    pub sand: f64,
    pub aggregate: f64,
}

pub fn material_breakdown(volume: f64, waste_percent: f64) -> Result<MaterialBreakdown, CalcError> {
    check_non_negative("volume", volume)?;
    check_non_negative("waste", waste_percent)?;
    let total_with_waste = volume * (1.0 + waste_percent / 100.0);
    Ok(MaterialBreakdown {
        volume,
        waste_percent,
        total_with_waste,
        cement: total_with_waste * CEMENT_FRACTION,
        sand: total_with_waste * SAND_FRACTION,
        aggregate: total_with_waste * AGGREGATE_FRACTION,
    })
}

/// Loose dry-material volume needed to pour `wet_volume`.
pub fn dry_volume(wet_volume: f64) -> f64 {
    wet_volume * DRY_VOLUME_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // =========================================================================
    // Unit conversion
    // =========================================================================

    #[test]
    fn inches_to_feet() {
        assert!(approx(to_feet(6.0, LengthUnit::Inches), 0.5));
    }

    #[test]
    fn meters_to_feet() {
        assert!(approx(to_feet(2.0, LengthUnit::Meters), 6.56168));
    }

    #[test]
    fn feet_back_to_meters() {
        assert!(approx(from_feet(3.28084, LengthUnit::Meters), 1.0));
    }

    #[test]
    fn convert_inches_to_meters_goes_through_feet() {
        let m = convert(12.0, LengthUnit::Inches, LengthUnit::Meters);
        assert!(approx(m, 1.0 / FEET_PER_METER));
    }

    #[test]
    fn convert_same_unit_is_identity() {
        assert_eq!(convert(7.25, LengthUnit::Meters, LengthUnit::Meters), 7.25);
    }

    #[test]
    fn parse_unit_aliases() {
        assert_eq!("ft".parse::<LengthUnit>().unwrap(), LengthUnit::Feet);
        assert_eq!("Inches".parse::<LengthUnit>().unwrap(), LengthUnit::Inches);
        assert_eq!(" metres ".parse::<LengthUnit>().unwrap(), LengthUnit::Meters);
    }

    #[test]
    fn parse_unknown_unit_is_error() {
        assert!(matches!(
            "cubits".parse::<LengthUnit>(),
            Err(CalcError::UnknownUnit(_))
        ));
    }

    // =========================================================================
    // Volumes
    // =========================================================================

    #[test]
    fn slab_ten_by_ten_by_four_inches() {
        let cf = rectangular_volume_cubic_feet(
            Dimension::feet(10.0),
            Dimension::feet(10.0),
            Dimension::inches(4.0),
        )
        .unwrap();
        assert!(approx(cf, 100.0 / 3.0));
        assert!(approx(cubic_feet_to_yards(cf), 100.0 / 81.0));
    }

    #[test]
    fn mixed_units_normalize_to_feet() {
        let cf = rectangular_volume_cubic_feet(
            Dimension::meters(1.0),
            Dimension::feet(1.0),
            Dimension::inches(12.0),
        )
        .unwrap();
        assert!(approx(cf, FEET_PER_METER));
    }

    #[test]
    fn zero_dimension_gives_zero_volume() {
        let cf = rectangular_volume_cubic_feet(
            Dimension::feet(0.0),
            Dimension::feet(4.0),
            Dimension::feet(1.0),
        )
        .unwrap();
        assert_eq!(cf, 0.0);
    }

    #[test]
    fn negative_dimension_rejected() {
        let err = rectangular_volume_cubic_feet(
            Dimension::feet(10.0),
            Dimension::feet(-2.0),
            Dimension::feet(1.0),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CalcError::Negative {
                name: "width",
                value: -2.0
            }
        );
    }

    #[test]
    fn nan_dimension_rejected() {
        let err = rectangular_volume_cubic_feet(
            Dimension::feet(f64::NAN),
            Dimension::feet(1.0),
            Dimension::feet(1.0),
        )
        .unwrap_err();
        assert_eq!(err, CalcError::NotFinite { name: "length" });
    }

    #[test]
    fn circular_column_uses_half_diameter() {
        let column = Column {
            section: ColumnSection::Circular {
                diameter: Dimension::feet(2.0),
            },
            height: Dimension::feet(10.0),
        };
        assert!(column.is_circular());
        let cf = column_volume_cubic_feet(&column).unwrap();
        assert!(approx(cf, std::f64::consts::PI * 10.0));
    }

    #[test]
    fn rectangular_column_is_lwh() {
        let column = Column {
            section: ColumnSection::Rectangular {
                length: Dimension::inches(12.0),
                width: Dimension::inches(18.0),
            },
            height: Dimension::feet(8.0),
        };
        assert!(!column.is_circular());
        assert!(approx(column_volume_cubic_feet(&column).unwrap(), 12.0));
    }

    #[test]
    fn volume_summary_conversions() {
        let s = VolumeSummary::from_cubic_feet(27.0);
        assert!(approx(s.cubic_yards, 1.0));
        assert!(approx(s.cubic_meters, 27.0 * 0.0283168));
    }

    // =========================================================================
    // Materials
    // =========================================================================

    #[test]
    fn material_breakdown_applies_waste_then_ratios() {
        let m = material_breakdown(10.0, 10.0).unwrap();
        assert!(approx(m.total_with_waste, 11.0));
        assert!(approx(m.cement, 2.42));
        assert!(approx(m.sand, 3.63));
        assert!(approx(m.aggregate, 4.95));
    }

    #[test]
    fn material_split_is_of_wet_volume() {
        // No dry-volume factor is applied: parts add back up to the
        // waste-adjusted wet volume.
        let m = material_breakdown(4.0, 0.0).unwrap();
        assert!(approx(m.cement + m.sand + m.aggregate, 4.0));
    }

    #[test]
    fn zero_waste_leaves_volume_unchanged() {
        let m = material_breakdown(3.5, 0.0).unwrap();
        assert_eq!(m.total_with_waste, 3.5);
    }

    #[test]
    fn negative_waste_rejected() {
        assert!(matches!(
            material_breakdown(1.0, -5.0),
            Err(CalcError::Negative { name: "waste", .. })
        ));
    }

    #[test]
    fn dry_volume_factor() {
        assert!(approx(dry_volume(2.0), 3.08));
    }
}
