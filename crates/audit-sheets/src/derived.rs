//! Derived fields
//!
//! A [`DerivedRule`] recomputes one numeric column from two others whenever
//! its guard column holds something. Each rule names every column it reads
//! and the single column it writes, and does nothing on sheets missing any
//! of them.

use serde::{Deserialize, Serialize};

use crate::rows::RowRecord;
use audit_sheets_core::{ColumnSet, FieldValue};

/// How the output is computed from the two inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Derivation {
    /// `left + right`
    Sum,
    /// `left - right`
    Difference,
}

/// One recomputation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedRule {
    /// Column that must be non-blank for the rule to fire
    pub guard: String,
    /// First operand
    pub left: String,
    /// Second operand
    pub right: String,
    /// Column written
    pub output: String,
    /// Operation
    pub derivation: Derivation,
}

impl DerivedRule {
    /// Error count: incorrect plus missed segments, once a response is entered
    pub fn segment_errors() -> Self {
        Self {
            guard: "Audit Response".into(),
            left: "# of Incorrect Segment".into(),
            right: "# of Missed Segment".into(),
            output: "# Segment Error".into(),
            derivation: Derivation::Sum,
        }
    }

    /// Correct count: keypoints minus incorrect segments, once a source id is set
    pub fn correct_segments() -> Self {
        Self {
            guard: "source_id".into(),
            left: "keypoint_count".into(),
            right: "# of Incorrect Segment".into(),
            output: "Correct segments".into(),
            derivation: Derivation::Difference,
        }
    }

    /// The rules applied when none are configured
    pub fn defaults() -> Vec<Self> {
        vec![Self::segment_errors(), Self::correct_segments()]
    }

    /// Columns this rule reads
    pub fn reads(&self) -> [&str; 3] {
        [&self.guard, &self.left, &self.right]
    }

    /// Whether every referenced column exists
    pub fn applies_to(&self, columns: &ColumnSet) -> bool {
        self.reads().iter().all(|c| columns.contains(c)) && columns.contains(&self.output)
    }

    /// Recompute the output for a record. Returns true if the record changed.
    pub fn apply(&self, record: &mut RowRecord, columns: &ColumnSet) -> bool {
        if !self.applies_to(columns) {
            return false;
        }
        let guarded = record.get(&self.guard).is_some_and(|v| !v.is_blank_trimmed());
        if !guarded {
            return false;
        }

        let left = record.get(&self.left).map_or(0, lenient_int);
        let right = record.get(&self.right).map_or(0, lenient_int);
        let value = match self.derivation {
            Derivation::Sum => left.saturating_add(right),
            Derivation::Difference => left.saturating_sub(right),
        };
        let value = FieldValue::Number(value as f64);

        if record.get(&self.output) == Some(&value) {
            return false;
        }
        log::trace!("{} = {} ({:?})", self.output, value, self.derivation);
        record.set(self.output.as_str(), value);
        true
    }
}

/// Integer reading of a field: leading digits of text, truncated numbers,
/// zero for anything else.
pub fn lenient_int(value: &FieldValue) -> i64 {
    match value {
        FieldValue::Number(n) if n.is_finite() => n.trunc() as i64,
        FieldValue::Number(_) => 0,
        FieldValue::Text(s) => {
            let s = s.trim_start();
            let (sign, digits) = match s.as_bytes().first() {
                Some(b'-') => (-1, &s[1..]),
                Some(b'+') => (1, &s[1..]),
                _ => (1, s),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().map_or(0, |n| sign * n)
        }
    }
}

/// Apply every rule in order. Returns the columns written.
pub fn apply_all(
    rules: &[DerivedRule],
    record: &mut RowRecord,
    columns: &ColumnSet,
) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| rule.apply(record, columns))
        .map(|rule| rule.output.clone())
        .collect()
}
