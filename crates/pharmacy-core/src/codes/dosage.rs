//! Free-text dosage parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Unit used when a dosage has no unit or cannot be parsed.
pub const DEFAULT_DOSAGE_UNIT: &str = "unit";

/// Whole-string grammar: `<number>[ws]<unit letters or slash>?`. ASCII digits
/// and whitespace only.
static DOSAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]+)?)(?-u:\s)*([A-Za-z/]+)?$").unwrap()
});

/// First `<number><letters>` pair anywhere in the text.
static DOSAGE_FALLBACK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)(?-u:\s)*([A-Za-z]+)").unwrap());

/// A parsed strength and its unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dosage {
    pub strength: f64,
    pub unit: String,
}

impl Dosage {
    fn unknown() -> Self {
        Self {
            strength: 0.0,
            unit: DEFAULT_DOSAGE_UNIT.to_string(),
        }
    }
}

/// Parse a dosage such as `"5mg"`, `"2.5 mL"` or `"500"`.
///
/// Compound strengths fall through to the fallback grammar, which keeps only
/// the first number and unit: `"10mg/5ml"` parses as `10 mg`, dropping the
/// denominator. Unparseable text yields `0 unit`.
pub fn parse_dosage(text: &str) -> Dosage {
    let trimmed = text.trim();

    if let Some(caps) = DOSAGE_PATTERN.captures(trimmed) {
        if let Ok(strength) = caps[1].parse::<f64>() {
            let unit = caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_DOSAGE_UNIT.to_string());
            return Dosage { strength, unit };
        }
    }

    DOSAGE_FALLBACK_PATTERN
        .captures(trimmed)
        .and_then(|caps| {
            let strength = caps[1].parse::<f64>().ok()?;
            Some(Dosage {
                strength,
                unit: caps[2].to_string(),
            })
        })
        .unwrap_or_else(Dosage::unknown)
}
