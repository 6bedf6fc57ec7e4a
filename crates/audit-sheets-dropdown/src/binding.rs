//! Dropdown bindings

use std::fmt;

use audit_sheets_core::{column_letter_of, ColumnType};

/// Whether a binding's options are read directly or looked up by a parent
/// column's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Options are the values of the source range
    Direct,
    /// Options depend on the selected value of a parent column
    Indirect,
}

impl BindingKind {
    /// Column type a target column takes on when bound
    pub fn column_type(&self) -> ColumnType {
        match self {
            BindingKind::Direct => ColumnType::DirectList,
            BindingKind::Indirect => ColumnType::CascadingList,
        }
    }
}

/// The resolved (sheet, column, range) a dropdown column reads its options from.
///
/// An indirect binding shares the source of its parent's direct binding: the
/// range holds the parent's key domain, and the dependent options are looked
/// up elsewhere on the same sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownBinding {
    /// Column the dropdown applies to, on the active sheet
    pub target_column_index: u16,
    /// Display name of the target column
    pub target_column: String,
    /// Sheet the options are read from
    pub source_sheet: String,
    /// Column of the source range
    pub source_column_index: u16,
    /// First row of the source range (1-based, inclusive)
    pub range_start: u32,
    /// Last row of the source range (1-based, inclusive)
    pub range_end: u32,
    /// Direct or indirect
    pub kind: BindingKind,
}

impl DropdownBinding {
    /// Whether this is a direct binding
    pub fn is_direct(&self) -> bool {
        self.kind == BindingKind::Direct
    }

    /// Source range in A1 notation, e.g. `Lookup!$B$2:$B$5`
    pub fn source_range(&self) -> String {
        let col = column_letter_of(self.source_column_index);
        format!(
            "{}!${}${}:${}${}",
            self.source_sheet, col, self.range_start, col, self.range_end
        )
    }
}

impl fmt::Display for DropdownBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BindingKind::Direct => "direct",
            BindingKind::Indirect => "indirect",
        };
        write!(
            f,
            "{} ({}) <- {} [{}]",
            self.target_column,
            column_letter_of(self.target_column_index),
            self.source_range(),
            kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let binding = DropdownBinding {
            target_column_index: 2,
            target_column: "Region".into(),
            source_sheet: "Lookup".into(),
            source_column_index: 1,
            range_start: 2,
            range_end: 5,
            kind: BindingKind::Direct,
        };
        assert_eq!(binding.source_range(), "Lookup!$B$2:$B$5");
        assert_eq!(binding.to_string(), "Region (C) <- Lookup!$B$2:$B$5 [direct]");
        assert_eq!(binding.kind.column_type(), ColumnType::DirectList);
    }
}
