//! Locale-aware scalar parsing shared by every extractor.
//!
//! Grouping separator is `,`, decimal separator is `.`; amounts are parsed as
//! exact decimals.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use useme_core::NEGOTIABLE;

use crate::error::{ExtractError, Result};
use crate::labels::NEGOTIABLE_PHRASES;

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d,]+\.?\d*)\s*([A-Z]{3})").expect("valid price regex"));
static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid integer regex"));

/// Budget fields derived from the raw budget text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BudgetInfo {
    pub negotiable: bool,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
}

/// Maps either language's "no price" phrase onto the canonical token.
pub fn canonical_budget(raw: &str) -> String {
    let raw = raw.trim();
    if NEGOTIABLE_PHRASES.matches_exact(raw) {
        NEGOTIABLE.to_string()
    } else {
        raw.to_string()
    }
}

pub fn parse_budget(raw: &str) -> BudgetInfo {
    let budget = canonical_budget(raw);
    if budget == NEGOTIABLE {
        return BudgetInfo {
            negotiable: true,
            ..BudgetInfo::default()
        };
    }

    let Some(caps) = PRICE_RE.captures(&budget) else {
        return BudgetInfo::default();
    };
    let digits = caps[1].replace(',', "");
    match Decimal::from_str(&digits) {
        Ok(amount) => BudgetInfo {
            negotiable: false,
            amount: Some(amount),
            currency: Some(caps[2].to_string()),
        },
        Err(_) => BudgetInfo::default(),
    }
}

/// First run of digits in `text`, if any fits in a `u32`.
pub fn first_integer(text: &str) -> Option<u32> {
    INTEGER_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Strict count parse: the whole trimmed text must be an integer.
pub fn parse_count(field: &'static str, text: &str) -> Result<u32> {
    let trimmed = text.trim();
    trimmed.parse().map_err(|_| ExtractError::InvalidNumber {
        field,
        text: trimmed.to_string(),
    })
}

/// Count embedded in running text ("Opinions (12)"). No digits means zero;
/// digits that overflow are an error.
pub fn embedded_count(field: &'static str, text: &str) -> Result<u32> {
    match INTEGER_RE.find(text) {
        Some(m) => parse_count(field, m.as_str()),
        None => Ok(0),
    }
}

/// Drops a leading "on" / "w dniu" connector from a review date.
pub fn strip_date_connector(text: &str) -> String {
    let text = text.trim();
    ["on ", "w dniu "]
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text)
        .trim()
        .to_string()
}
