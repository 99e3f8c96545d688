//! The calculator catalog and form handling.
//!
//! Each calculator page is a fixed entry in [`CALCULATORS`]: a slug, copy for
//! the page, the shape it measures, and FAQ entries that also feed the
//! page's `FAQPage` JSON-LD.
//!
//! Form values arrive as query parameters:
//!
//! | Key          | Meaning                                              |
//! |--------------|------------------------------------------------------|
//! | `length`     | long side                                            |
//! | `width`      | short side (wall height on the wall calculator)      |
//! | `depth`      | thickness or depth; `height` on columns              |
//! | `height`     | alias for `depth`                                    |
//! | `diameter`   | round columns only                                   |
//! | `unit`       | unit for length, width and column height (`ft`)     |
//! | `depth_unit` | unit for depth and column cross-section              |
//! | `waste`      | waste allowance in percent                           |
//!
//! Parsing ([`CalculatorInput::from_query`]) only checks that values are
//! numbers and units are known. Which dimensions are required, and whether
//! they are in range, is decided by [`evaluate`] for the specific
//! calculator.

use crate::calc::{
    self, CalcError, Column, ColumnSection, Dimension, LengthUnit, MaterialBreakdown,
    VolumeSummary,
};
use serde::Serialize;

/// What a calculator measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    /// Length × width × depth.
    Rectangular,
    RoundColumn,
    SquareColumn,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Calculator {
    pub slug: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
    pub shape: Shape,
    /// Form labels for the `length`, `width` and `depth` fields.
    pub labels: [&'static str; 3],
    pub default_depth_unit: LengthUnit,
    pub faqs: &'static [Faq],
}

impl Calculator {
    pub fn path(&self) -> String {
        format!("/calculators/{}", self.slug)
    }

    /// Form fields shown for this calculator, as `(query key, label)`.
    pub fn fields(&self) -> Vec<(&'static str, &'static str)> {
        let [length, width, depth] = self.labels;
        match self.shape {
            Shape::Rectangular | Shape::SquareColumn => {
                vec![("length", length), ("width", width), ("depth", depth)]
            }
            Shape::RoundColumn => vec![("diameter", length), ("depth", depth)],
        }
    }
}

pub static CALCULATORS: &[Calculator] = &[
    Calculator {
        slug: "slab",
        name: "Concrete Slab Calculator",
        summary: "Patios, driveways, shed bases and garage floors.",
        shape: Shape::Rectangular,
        labels: ["Length", "Width", "Thickness"],
        default_depth_unit: LengthUnit::Inches,
        faqs: &[
            Faq {
                question: "How thick should a concrete slab be?",
                answer: "Four inches for patios and walkways, five to six inches for driveways that see trucks.",
            },
            Faq {
                question: "How much extra concrete should I order?",
                answer: "Add 5 to 10 percent for spillage, uneven subgrade and over-excavation.",
            },
        ],
    },
    Calculator {
        slug: "footing",
        name: "Footing Calculator",
        summary: "Continuous strip footings under walls.",
        shape: Shape::Rectangular,
        labels: ["Length", "Width", "Depth"],
        default_depth_unit: LengthUnit::Inches,
        faqs: &[Faq {
            question: "How wide should a footing be?",
            answer: "A common rule is twice the width of the wall it supports, and never less than 12 inches.",
        }],
    },
    Calculator {
        slug: "wall",
        name: "Concrete Wall Calculator",
        summary: "Poured foundation and retaining walls.",
        shape: Shape::Rectangular,
        labels: ["Length", "Height", "Thickness"],
        default_depth_unit: LengthUnit::Inches,
        faqs: &[Faq {
            question: "How thick are poured foundation walls?",
            answer: "Eight inches is typical for residential basements; ten inches for deeper or taller walls.",
        }],
    },
    Calculator {
        slug: "beam",
        name: "Concrete Beam Calculator",
        summary: "Grade beams and lintels with a rectangular section.",
        shape: Shape::Rectangular,
        labels: ["Length", "Width", "Depth"],
        default_depth_unit: LengthUnit::Inches,
        faqs: &[Faq {
            question: "Does rebar reduce the concrete volume?",
            answer: "Slightly, but the difference is well inside the waste allowance, so it is ignored.",
        }],
    },
    Calculator {
        slug: "round-column",
        name: "Round Column Calculator",
        summary: "Sonotube piers and round columns.",
        shape: Shape::RoundColumn,
        labels: ["Diameter", "", "Height"],
        default_depth_unit: LengthUnit::Inches,
        faqs: &[Faq {
            question: "How many bags for a 12 inch tube?",
            answer: "A 12 inch tube 4 feet tall holds about 3.1 cubic feet, roughly five 60 lb bags.",
        }],
    },
    Calculator {
        slug: "square-column",
        name: "Square Column Calculator",
        summary: "Square and rectangular columns and piers.",
        shape: Shape::SquareColumn,
        labels: ["Length", "Width", "Height"],
        default_depth_unit: LengthUnit::Inches,
        faqs: &[Faq {
            question: "Which units should I use for a column?",
            answer: "Enter the cross-section in inches and the height in feet; both can be changed on the form.",
        }],
    },
];

pub fn find_calculator(slug: &str) -> Option<&'static Calculator> {
    CALCULATORS.iter().find(|c| c.slug == slug)
}

/// Raw form values. Dimensions are optional until [`evaluate`] decides
/// which ones the calculator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorInput {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub diameter: Option<f64>,
    pub unit: LengthUnit,
    /// `None` means the calculator's default.
    pub depth_unit: Option<LengthUnit>,
    pub waste_percent: f64,
}

impl CalculatorInput {
    /// Read form values from decoded query pairs. Empty values count as
    /// absent; the first occurrence of a key wins.
    pub fn from_query(
        query: &[(String, String)],
        default_waste_percent: f64,
    ) -> Result<Self, CalcError> {
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, v)| k == key && !v.trim().is_empty())
                .map(|(_, v)| v.trim())
        };

        let depth = match get("depth") {
            Some(raw) => Some(parse_number("depth", raw)?),
            None => get("height")
                .map(|raw| parse_number("height", raw))
                .transpose()?,
        };

        Ok(Self {
            length: get("length").map(|r| parse_number("length", r)).transpose()?,
            width: get("width").map(|r| parse_number("width", r)).transpose()?,
            depth,
            diameter: get("diameter")
                .map(|r| parse_number("diameter", r))
                .transpose()?,
            unit: get("unit")
                .map(str::parse::<LengthUnit>)
                .transpose()?
                .unwrap_or(LengthUnit::Feet),
            depth_unit: get("depth_unit").map(str::parse::<LengthUnit>).transpose()?,
            waste_percent: get("waste")
                .map(|r| parse_number("waste", r))
                .transpose()?
                .unwrap_or(default_waste_percent),
        })
    }

    /// True when no dimension was entered, i.e. the form was not submitted.
    pub fn is_blank(&self) -> bool {
        self.length.is_none()
            && self.width.is_none()
            && self.depth.is_none()
            && self.diameter.is_none()
    }
}

fn parse_number(name: &'static str, raw: &str) -> Result<f64, CalcError> {
    raw.parse::<f64>().map_err(|_| CalcError::NotANumber {
        name,
        raw: raw.to_string(),
    })
}

fn required(name: &'static str, value: Option<f64>) -> Result<f64, CalcError> {
    value.ok_or(CalcError::Missing(name))
}

/// Result of one calculation. Material quantities are in cubic feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub volume: VolumeSummary,
    pub materials: MaterialBreakdown,
    /// Loose dry materials for the waste-adjusted volume.
    pub dry_volume: VolumeSummary,
}

pub fn evaluate(calculator: &Calculator, input: &CalculatorInput) -> Result<Estimate, CalcError> {
    let unit = input.unit;
    let depth_unit = input.depth_unit.unwrap_or(calculator.default_depth_unit);

    let cubic_feet = match calculator.shape {
        Shape::Rectangular => calc::rectangular_volume_cubic_feet(
            Dimension::new(required("length", input.length)?, unit),
            Dimension::new(required("width", input.width)?, unit),
            Dimension::new(required("depth", input.depth)?, depth_unit),
        )?,
        Shape::RoundColumn => calc::column_volume_cubic_feet(&Column {
            section: ColumnSection::Circular {
                diameter: Dimension::new(required("diameter", input.diameter)?, depth_unit),
            },
            height: Dimension::new(required("height", input.depth)?, unit),
        })?,
        Shape::SquareColumn => calc::column_volume_cubic_feet(&Column {
            section: ColumnSection::Rectangular {
                length: Dimension::new(required("length", input.length)?, depth_unit),
                width: Dimension::new(required("width", input.width)?, depth_unit),
            },
            height: Dimension::new(required("height", input.depth)?, unit),
        })?,
    };

    let materials = calc::material_breakdown(cubic_feet, input.waste_percent)?;
    Ok(Estimate {
        volume: VolumeSummary::from_cubic_feet(cubic_feet),
        dry_volume: VolumeSummary::from_cubic_feet(calc::dry_volume(materials.total_with_waste)),
        materials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    #[test]
    fn slugs_are_unique() {
        let mut slugs: Vec<&str> = CALCULATORS.iter().map(|c| c.slug).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), CALCULATORS.len());
    }

    #[test]
    fn every_calculator_has_faqs() {
        assert!(CALCULATORS.iter().all(|c| !c.faqs.is_empty()));
    }

    #[test]
    fn find_by_slug() {
        assert_eq!(find_calculator("slab").unwrap().name, "Concrete Slab Calculator");
        assert!(find_calculator("roof").is_none());
    }

    #[test]
    fn round_column_has_two_fields() {
        let calc = find_calculator("round-column").unwrap();
        assert_eq!(calc.fields(), vec![("diameter", "Diameter"), ("depth", "Height")]);
    }

    // =========================================================================
    // Query parsing
    // =========================================================================

    #[test]
    fn empty_query_is_blank_with_defaults() {
        let input = CalculatorInput::from_query(&[], 10.0).unwrap();
        assert!(input.is_blank());
        assert_eq!(input.unit, LengthUnit::Feet);
        assert_eq!(input.depth_unit, None);
        assert_eq!(input.waste_percent, 10.0);
    }

    #[test]
    fn blank_values_count_as_absent() {
        let input =
            CalculatorInput::from_query(&query(&[("length", " "), ("waste", "")]), 5.0).unwrap();
        assert!(input.is_blank());
        assert_eq!(input.waste_percent, 5.0);
    }

    #[test]
    fn height_is_alias_for_depth() {
        let input = CalculatorInput::from_query(&query(&[("height", "8")]), 0.0).unwrap();
        assert_eq!(input.depth, Some(8.0));
    }

    #[test]
    fn non_numeric_value_is_error() {
        let err = CalculatorInput::from_query(&query(&[("width", "ten")]), 0.0).unwrap_err();
        assert_eq!(
            err,
            CalcError::NotANumber {
                name: "width",
                raw: "ten".into()
            }
        );
    }

    #[test]
    fn unknown_unit_is_error() {
        let err = CalculatorInput::from_query(&query(&[("unit", "furlong")]), 0.0).unwrap_err();
        assert!(matches!(err, CalcError::UnknownUnit(_)));
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    #[test]
    fn slab_ten_by_ten_by_four_inches() {
        let calc = find_calculator("slab").unwrap();
        let input = CalculatorInput::from_query(
            &query(&[("length", "10"), ("width", "10"), ("depth", "4")]),
            0.0,
        )
        .unwrap();
        let estimate = evaluate(calc, &input).unwrap();
        assert!(approx(estimate.volume.cubic_feet, 100.0 / 3.0));
        assert!(approx(estimate.volume.cubic_yards, 100.0 / 81.0));
        assert!(approx(estimate.materials.total_with_waste, 100.0 / 3.0));
    }

    #[test]
    fn waste_and_dry_volume_applied() {
        let calc = find_calculator("footing").unwrap();
        let input = CalculatorInput::from_query(
            &query(&[
                ("length", "10"),
                ("width", "2"),
                ("depth", "1"),
                ("depth_unit", "ft"),
                ("waste", "10"),
            ]),
            0.0,
        )
        .unwrap();
        let estimate = evaluate(calc, &input).unwrap();
        assert!(approx(estimate.volume.cubic_feet, 20.0));
        assert!(approx(estimate.materials.total_with_waste, 22.0));
        assert!(approx(estimate.materials.cement, 22.0 * 0.22));
        assert!(approx(estimate.dry_volume.cubic_feet, 22.0 * 1.54));
    }

    #[test]
    fn round_column_uses_diameter_and_height() {
        let calc = find_calculator("round-column").unwrap();
        let input = CalculatorInput::from_query(
            &query(&[("diameter", "12"), ("height", "4")]),
            0.0,
        )
        .unwrap();
        let estimate = evaluate(calc, &input).unwrap();
        assert!(approx(estimate.volume.cubic_feet, std::f64::consts::PI * 0.25 * 4.0));
    }

    #[test]
    fn square_column_in_meters() {
        let calc = find_calculator("square-column").unwrap();
        let input = CalculatorInput::from_query(
            &query(&[
                ("length", "1"),
                ("width", "1"),
                ("height", "1"),
                ("unit", "m"),
                ("depth_unit", "m"),
            ]),
            0.0,
        )
        .unwrap();
        let estimate = evaluate(calc, &input).unwrap();
        assert!((estimate.volume.cubic_meters - 1.0).abs() < 1e-4);
    }

    #[test]
    fn missing_dimension_names_the_field() {
        let calc = find_calculator("slab").unwrap();
        let input =
            CalculatorInput::from_query(&query(&[("length", "10"), ("depth", "4")]), 0.0).unwrap();
        assert_eq!(evaluate(calc, &input).unwrap_err(), CalcError::Missing("width"));
    }

    #[test]
    fn negative_dimension_rejected() {
        let calc = find_calculator("wall").unwrap();
        let input = CalculatorInput::from_query(
            &query(&[("length", "-3"), ("width", "8"), ("depth", "8")]),
            0.0,
        )
        .unwrap();
        assert!(matches!(
            evaluate(calc, &input).unwrap_err(),
            CalcError::Negative { name: "length", .. }
        ));
    }

    #[test]
    fn zero_dimension_gives_zero_volume() {
        let calc = find_calculator("beam").unwrap();
        let input = CalculatorInput::from_query(
            &query(&[("length", "0"), ("width", "8"), ("depth", "8")]),
            10.0,
        )
        .unwrap();
        let estimate = evaluate(calc, &input).unwrap();
        assert_eq!(estimate.volume.cubic_feet, 0.0);
        assert_eq!(estimate.materials.total_with_waste, 0.0);
    }
}
