//! Numeric rescaling of reported fact values.
//!
//! XBRL facts declare a `decimals` attribute describing the rounding
//! precision of the reported number. A negative value means the figure
//! was rounded to a coarser unit (-6 is "rounded to the nearest
//! million"), so displaying it in that unit divides by the matching
//! power of ten. Zero or positive decimals describe values that are
//! already in natural units (per-share figures, ratios) and are never
//! scaled, as is the `INF` exact-precision sentinel or a missing
//! attribute.

use serde::{Deserialize, Serialize};

/// Declared rounding precision of a reported fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decimals {
    /// The `INF` sentinel: the value is exact
    Exact,
    /// Signed rounding precision; negative means rounded to 10^(-n)
    Digits(i32),
}

impl Decimals {
    /// Parse a `decimals` attribute value.
    ///
    /// Returns `None` for text that is neither the `INF` sentinel nor
    /// an integer; downstream treats that the same as an absent
    /// attribute (exact, no scaling).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("INF") {
            return Some(Self::Exact);
        }
        trimmed.parse::<i32>().ok().map(Self::Digits)
    }
}

/// Result of rescaling one raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedValue {
    /// Scaled numeric value; `None` when the raw text is not a number
    pub magnitude: Option<f64>,

    /// Human-readable unit multiplier actually applied
    pub scale_label: String,

    /// False when the raw value could not be parsed as a number;
    /// callers display the raw text instead and never do arithmetic on it
    pub is_numeric: bool,
}

/// Rescale a raw fact value according to its declared precision.
///
/// Non-numeric input passes through untouched with `is_numeric =
/// false`. Numeric input is divided by `10^(-decimals)` only when
/// `decimals` is negative; zero or positive decimals, the exact
/// sentinel, and a missing attribute all leave the value unscaled
/// with label "units".
pub fn normalize(raw_value: &str, decimals: Option<Decimals>) -> NormalizedValue {
    let cleaned = raw_value.trim().replace(',', "");
    let Ok(value) = cleaned.parse::<f64>() else {
        return NormalizedValue {
            magnitude: None,
            scale_label: "units".to_string(),
            is_numeric: false,
        };
    };

    let exponent = match decimals {
        Some(Decimals::Digits(d)) if d < 0 => -d,
        _ => 0,
    };

    NormalizedValue {
        magnitude: Some(value / 10f64.powi(exponent)),
        scale_label: scale_label(exponent),
        is_numeric: true,
    }
}

fn scale_label(exponent: i32) -> String {
    match exponent {
        0 => "units".to_string(),
        3 => "thousands".to_string(),
        6 => "millions".to_string(),
        9 => "billions".to_string(),
        n => format!("1e{}", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_rounded_to_millions() {
        let n = normalize("17765000000", Some(Decimals::Digits(-6)));
        assert!(n.is_numeric);
        assert_eq!(n.magnitude, Some(17765.0));
        assert_eq!(n.scale_label, "millions");
    }

    #[test]
    fn test_positive_decimals_unscaled() {
        let n = normalize("42", Some(Decimals::Digits(2)));
        assert!(n.is_numeric);
        assert_eq!(n.magnitude, Some(42.0));
        assert_eq!(n.scale_label, "units");
    }

    #[test]
    fn test_non_numeric_passthrough() {
        let n = normalize("n/a", Some(Decimals::Digits(0)));
        assert!(!n.is_numeric);
        assert_eq!(n.magnitude, None);
    }

    #[rstest]
    #[case::exact(Some(Decimals::Exact))]
    #[case::absent(None)]
    #[case::zero(Some(Decimals::Digits(0)))]
    fn test_no_scaling_cases(#[case] decimals: Option<Decimals>) {
        let n = normalize("123456", decimals);
        assert_eq!(n.magnitude, Some(123456.0));
        assert_eq!(n.scale_label, "units");
    }

    #[rstest]
    #[case(-3, "thousands", 1234567.0)]
    #[case(-9, "billions", 1.234567)]
    fn test_scale_labels(#[case] decimals: i32, #[case] label: &str, #[case] expected: f64) {
        let n = normalize("1234567000", Some(Decimals::Digits(decimals)));
        assert_eq!(n.scale_label, label);
        assert!((n.magnitude.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unusual_negative_exponent_label() {
        let n = normalize("12000", Some(Decimals::Digits(-4)));
        assert_eq!(n.scale_label, "1e4");
        assert_eq!(n.magnitude, Some(1.2));
    }

    #[test]
    fn test_negative_value_scaled() {
        let n = normalize("-1259000000", Some(Decimals::Digits(-6)));
        assert_eq!(n.magnitude, Some(-1259.0));
    }

    #[test]
    fn test_decimals_parse() {
        assert_eq!(Decimals::parse("-6"), Some(Decimals::Digits(-6)));
        assert_eq!(Decimals::parse(" 2 "), Some(Decimals::Digits(2)));
        assert_eq!(Decimals::parse("INF"), Some(Decimals::Exact));
        assert_eq!(Decimals::parse("inf"), Some(Decimals::Exact));
        assert_eq!(Decimals::parse("many"), None);
        assert_eq!(Decimals::parse(""), None);
    }
}
