//! Search query normalization.

use crate::codes::normalize_ndc;

/// Queries shorter than this (after trimming) return no results.
pub const MIN_QUERY_LEN: usize = 2;

/// A trimmed query in the forms the engine matches against.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Trimmed raw text
    pub text: String,
    /// Lowercased text for name matching
    pub text_lower: String,
    /// Digits-only form for NDC matching; empty when the query has no digits
    pub ndc_digits: String,
}

impl SearchQuery {
    /// Normalize a query, or `None` if it is too short to search.
    pub fn parse(query: &str) -> Option<Self> {
        let text = query.trim();
        if text.chars().count() < MIN_QUERY_LEN {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            text_lower: text.to_lowercase(),
            ndc_digits: normalize_ndc(text),
        })
    }

    /// Pattern for the catalog NDC column: the digits, or the raw text when
    /// the query has none.
    pub fn catalog_ndc_pattern(&self) -> &str {
        if self.ndc_digits.is_empty() {
            &self.text
        } else {
            &self.ndc_digits
        }
    }

    /// Whether a normalized NDC contains the query digits.
    ///
    /// A query without digits never matches by NDC.
    pub fn matches_ndc(&self, normalized_ndc: &str) -> bool {
        !self.ndc_digits.is_empty() && normalized_ndc.contains(&self.ndc_digits)
    }
}
