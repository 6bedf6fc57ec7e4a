//! List validation rules
//!
//! A [`ValidationRule`] is the normalized form of a `dataValidation` entry of
//! type `list`. Two formula shapes are understood: a literal range reference
//! (a direct rule) and `INDIRECT(...)` (an indirect, cascading rule). Anything
//! else passes through untouched and is later dropped by the resolver.

use lazy_regex::regex_captures;

/// Whether a rule reads a literal range or depends on another cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleKind {
    /// `formula1` is a range reference
    Direct,
    /// `formula1` contains `INDIRECT`
    Indirect,
}

/// A list-type data validation rule
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationRule {
    /// Cell ranges the rule applies to (space separated when several)
    pub sqref: String,
    /// Source formula, possibly simplified
    pub formula1: String,
}

impl ValidationRule {
    /// Create a rule as written, without simplification
    pub fn new<S: Into<String>, F: Into<String>>(sqref: S, formula1: F) -> Self {
        Self {
            sqref: sqref.into(),
            formula1: formula1.into(),
        }
    }

    /// Create a rule with its formula simplified
    pub fn simplified<S: Into<String>>(sqref: S, formula1: &str) -> Self {
        Self {
            sqref: sqref.into(),
            formula1: simplify_formula(formula1),
        }
    }

    /// Classify the rule
    pub fn kind(&self) -> RuleKind {
        if self.formula1.to_ascii_lowercase().contains("indirect") {
            RuleKind::Indirect
        } else {
            RuleKind::Direct
        }
    }
}

/// Rewrite `INDIRECT(VLOOKUP(key, ...))` to `INDIRECT(key)`.
///
/// Matching is case-insensitive. Other formulas are returned unchanged.
///
/// ```
/// use audit_sheets_core::validation::simplify_formula;
///
/// assert_eq!(
///     simplify_formula("INDIRECT(VLOOKUP(A2,Sheet2!A:B,2,FALSE))"),
///     "INDIRECT(A2)"
/// );
/// ```
pub fn simplify_formula(formula: &str) -> String {
    match regex_captures!(
        r"(?i)^\s*=?\s*INDIRECT\s*\(\s*VLOOKUP\s*\(\s*([^,()]+?)\s*,.*\)\s*\)\s*$",
        formula
    ) {
        Some((_, key)) => format!("INDIRECT({})", key),
        None => formula.to_string(),
    }
}

/// Stable partition: direct rules first, then indirect rules, each group in
/// its original order.
pub fn order_rules(rules: Vec<ValidationRule>) -> Vec<ValidationRule> {
    let (mut direct, indirect): (Vec<_>, Vec<_>) = rules
        .into_iter()
        .partition(|r| r.kind() == RuleKind::Direct);
    direct.extend(indirect);
    direct
}
