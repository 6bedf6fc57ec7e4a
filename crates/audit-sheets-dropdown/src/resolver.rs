//! Turning validation rules into dropdown bindings
//!
//! Rules must arrive direct-first (see [`audit_sheets_core::order_rules`]):
//! an indirect rule cascades from a direct binding resolved before it.

use lazy_regex::regex_captures;

use crate::binding::{BindingKind, DropdownBinding};
use crate::error::{DropdownError, DropdownResult};
use crate::links::LinkGraph;
use audit_sheets_core::{
    column_index_of, split_range, strip_row_digits, ColumnSet, RuleKind, ValidationRule,
};

/// Where a direct rule reads its options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectSource {
    /// Source sheet name, unquoted
    pub sheet: String,
    /// Source column index
    pub column_index: u16,
    /// First row (1-based)
    pub start: u32,
    /// Last row (1-based)
    pub end: u32,
}

/// Output of [`resolve_bindings`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Bindings in rule order
    pub bindings: Vec<DropdownBinding>,
    /// Parent/dependent links
    pub links: LinkGraph,
}

impl Resolution {
    /// The binding for a target column name
    pub fn binding_for(&self, column: &str) -> Option<&DropdownBinding> {
        self.bindings.iter().rev().find(|b| b.target_column == column)
    }
}

fn strip_equals(formula: &str) -> &str {
    let trimmed = formula.trim();
    trimmed.strip_prefix('=').unwrap_or(trimmed)
}

/// Column index a rule applies to: the last `:` component of `sqref`, row
/// digits removed.
pub fn target_column_index(sqref: &str) -> DropdownResult<u16> {
    let last = sqref.rsplit(':').next().unwrap_or(sqref).trim();
    // A multi-range sqref ends in a space separated list; keep the final piece
    let last = last.rsplit(' ').next().unwrap_or(last);
    let letters = strip_row_digits(last).trim_start_matches('$');
    column_index_of(letters)
        .map_err(|e| DropdownError::MalformedFormula(format!("sqref '{}': {}", sqref, e)))
}

/// Parse a direct formula: `[Sheet!]$COL$ROW:$COL$ROW`.
///
/// An unqualified range reads from `active_sheet`.
pub fn parse_direct_source(formula: &str, active_sheet: &str) -> DropdownResult<DirectSource> {
    let formula = strip_equals(formula);

    let (sheet, range) = match formula.split_once('!') {
        Some((sheet, range)) => (unquote_sheet(sheet), range),
        None => (active_sheet.to_string(), formula),
    };

    let (start_ref, end_ref) = split_range(range.trim());
    let start_parts: Vec<&str> = start_ref.split('$').collect();
    let end_parts: Vec<&str> = end_ref.split('$').collect();

    let malformed = || DropdownError::MalformedRange(range.to_string());

    let column_letters = start_parts.get(1).copied().ok_or_else(malformed)?;
    let start = start_parts
        .get(2)
        .and_then(|s| s.trim().parse::<u32>().ok())
        .ok_or_else(malformed)?;
    let end = end_parts
        .get(2)
        .and_then(|s| s.trim().parse::<u32>().ok())
        .ok_or_else(malformed)?;
    let column_index = column_index_of(column_letters).map_err(|_| malformed())?;

    Ok(DirectSource {
        sheet,
        column_index,
        start,
        end,
    })
}

/// Strip surrounding single quotes; `''` inside a quoted name is one quote.
fn unquote_sheet(sheet: &str) -> String {
    let sheet = sheet.trim();
    if sheet.len() >= 2 && sheet.starts_with('\'') && sheet.ends_with('\'') {
        sheet[1..sheet.len() - 1].replace("''", "'")
    } else {
        sheet.to_string()
    }
}

/// Column an indirect formula takes its key from.
///
/// The letters right after the first `$` name it (`INDIRECT($A$2)` is column
/// A). Without a `$`, the leading letters of the `INDIRECT` argument are used.
pub fn parse_indirect_dependency(formula: &str) -> DropdownResult<u16> {
    let formula = strip_equals(formula);

    let letters: String = match formula.find('$') {
        Some(pos) => formula[pos + 1..]
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect(),
        None => match regex_captures!(r"(?i)INDIRECT\s*\(\s*([A-Z]+)\d", formula) {
            Some((_, letters)) => letters.to_string(),
            None => String::new(),
        },
    };

    if letters.is_empty() {
        return Err(DropdownError::MalformedFormula(formula.to_string()));
    }
    column_index_of(&letters).map_err(|_| DropdownError::MalformedFormula(formula.to_string()))
}

/// Find the direct binding an indirect rule cascades from.
///
/// Bindings resolved in this pass win over prior ones; within each, the
/// latest match wins.
fn find_parent<'a>(
    resolved: &'a [DropdownBinding],
    prior: &'a [DropdownBinding],
    dependency_column: u16,
) -> Option<&'a DropdownBinding> {
    let matches = |b: &&DropdownBinding| b.is_direct() && b.source_column_index == dependency_column;
    resolved
        .iter()
        .rev()
        .find(matches)
        .or_else(|| prior.iter().rev().find(matches))
}

/// Resolve one rule against what has been resolved so far.
fn resolve_rule(
    rule: &ValidationRule,
    active_sheet: &str,
    columns: &ColumnSet,
    resolved: &[DropdownBinding],
    prior: &[DropdownBinding],
) -> DropdownResult<DropdownBinding> {
    let target_column_index = target_column_index(&rule.sqref)?;
    let target_column = columns
        .name_at(target_column_index)
        .ok_or(DropdownError::UnknownColumn(target_column_index))?
        .to_string();

    match rule.kind() {
        RuleKind::Direct => {
            let source = parse_direct_source(&rule.formula1, active_sheet)?;
            Ok(DropdownBinding {
                target_column_index,
                target_column,
                source_sheet: source.sheet,
                source_column_index: source.column_index,
                range_start: source.start,
                range_end: source.end,
                kind: BindingKind::Direct,
            })
        }
        RuleKind::Indirect => {
            let dependency = parse_indirect_dependency(&rule.formula1)?;
            let parent = find_parent(resolved, prior, dependency)
                .ok_or(DropdownError::MissingParent(dependency))?;
            Ok(DropdownBinding {
                target_column_index,
                target_column,
                source_sheet: parent.source_sheet.clone(),
                source_column_index: parent.source_column_index,
                range_start: parent.range_start,
                range_end: parent.range_end,
                kind: BindingKind::Indirect,
            })
        }
    }
}

/// Resolve every rule into a binding and build the link graph.
///
/// Each resolved binding retypes its target column in `columns`. A rule that
/// cannot be resolved is logged and dropped; the rest still resolve.
pub fn resolve_bindings(
    rules: &[ValidationRule],
    active_sheet: &str,
    columns: &mut ColumnSet,
    prior: &[DropdownBinding],
) -> Resolution {
    let mut resolution = Resolution::default();

    for rule in rules {
        let binding = match resolve_rule(rule, active_sheet, columns, &resolution.bindings, prior) {
            Ok(binding) => binding,
            Err(DropdownError::MissingParent(col)) => {
                log::warn!(
                    "dropping cascading rule on '{}' ({}): no direct binding on source column {}",
                    rule.sqref,
                    rule.formula1,
                    col
                );
                continue;
            }
            Err(e) => {
                log::debug!("skipping rule on '{}' ({}): {}", rule.sqref, rule.formula1, e);
                continue;
            }
        };

        match binding.kind {
            BindingKind::Direct => resolution
                .links
                .record_option_ref(binding.source_column_index, binding.target_column.as_str()),
            BindingKind::Indirect => resolution
                .links
                .record_dependent(binding.source_column_index, binding.target_column.as_str()),
        }
        columns.set_type(&binding.target_column, binding.kind.column_type());
        log::debug!("resolved binding {}", binding);
        resolution.bindings.push(binding);
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_sheets_core::{order_rules, ColumnType};
    use pretty_assertions::assert_eq;

    fn columns() -> ColumnSet {
        let mut set = ColumnSet::new();
        set.insert("Region", 0, ColumnType::Text);
        set.insert("City", 1, ColumnType::Text);
        set.insert("Status", 2, ColumnType::Text);
        set.insert("Score", 3, ColumnType::Number);
        set
    }

    #[test]
    fn test_target_column_index() {
        assert_eq!(target_column_index("C2:C100").unwrap(), 2);
        assert_eq!(target_column_index("AB7").unwrap(), 27);
        assert_eq!(target_column_index("A2:A9 D2:D9").unwrap(), 3);
        assert!(target_column_index("").is_err());
        assert!(target_column_index("123").is_err());
    }

    #[test]
    fn test_parse_direct_source() {
        assert_eq!(
            parse_direct_source("Lookup!$B$2:$B$5", "Audit").unwrap(),
            DirectSource {
                sheet: "Lookup".into(),
                column_index: 1,
                start: 2,
                end: 5
            }
        );
        assert_eq!(
            parse_direct_source("='Lookup Data'!$AA$10:$AA$12", "Audit").unwrap(),
            DirectSource {
                sheet: "Lookup Data".into(),
                column_index: 26,
                start: 10,
                end: 12
            }
        );
        let local = parse_direct_source("$C$3:$C$4", "Audit").unwrap();
        assert_eq!(local.sheet, "Audit");
        assert_eq!((local.column_index, local.start, local.end), (2, 3, 4));
    }

    #[test]
    fn test_parse_direct_source_rejects_malformed() {
        for formula in ["B2:B5", "\"Yes,No\"", "Lookup!", "$B$x:$B$5", "$2$2:$2$5", ""] {
            assert!(
                matches!(
                    parse_direct_source(formula, "Audit"),
                    Err(DropdownError::MalformedRange(_))
                ),
                "{} should be malformed",
                formula
            );
        }
    }

    #[test]
    fn test_parse_indirect_dependency() {
        assert_eq!(parse_indirect_dependency("INDIRECT($A$2)").unwrap(), 0);
        assert_eq!(parse_indirect_dependency("=INDIRECT($BC2)").unwrap(), 54);
        assert_eq!(parse_indirect_dependency("INDIRECT(B2)").unwrap(), 1);
        assert!(parse_indirect_dependency("INDIRECT(\"x\")").is_err());
    }

    #[test]
    fn test_direct_binding() {
        let mut cols = columns();
        let rules = vec![ValidationRule::new("A2:A50", "Lookup!$B$2:$B$5")];
        let resolution = resolve_bindings(&rules, "Audit", &mut cols, &[]);

        assert_eq!(
            resolution.bindings,
            vec![DropdownBinding {
                target_column_index: 0,
                target_column: "Region".into(),
                source_sheet: "Lookup".into(),
                source_column_index: 1,
                range_start: 2,
                range_end: 5,
                kind: BindingKind::Direct,
            }]
        );
        assert_eq!(cols.type_of("Region"), Some(ColumnType::DirectList));
        assert_eq!(resolution.links.key_column(1), Some("Region"));
    }

    #[test]
    fn test_indirect_inherits_parent_source() {
        let mut cols = columns();
        let rules = vec![
            ValidationRule::new("A2:A50", "Lookup!$A$2:$A$4"),
            ValidationRule::simplified("B2:B50", "INDIRECT(VLOOKUP($A$2,Lookup!$A:$B,2,FALSE))"),
        ];
        let resolution = resolve_bindings(&rules, "Audit", &mut cols, &[]);

        assert_eq!(resolution.bindings.len(), 2);
        let city = resolution.binding_for("City").unwrap();
        assert_eq!(city.kind, BindingKind::Indirect);
        assert_eq!(city.source_sheet, "Lookup");
        assert_eq!(city.source_column_index, 0);
        assert_eq!((city.range_start, city.range_end), (2, 4));
        assert_eq!(cols.type_of("City"), Some(ColumnType::CascadingList));
        assert_eq!(resolution.links.dependents_of("Region"), vec!["City"]);
    }

    #[test]
    fn test_reordered_rules_let_indirect_resolve() {
        // Document order puts the indirect rule first
        let document_order = vec![
            ValidationRule::new("B2:B50", "INDIRECT($A$2)"),
            ValidationRule::new("A2:A50", "Lookup!$A$2:$A$4"),
        ];

        let mut cols = columns();
        let unordered = resolve_bindings(&document_order, "Audit", &mut cols, &[]);
        assert_eq!(unordered.bindings.len(), 1);

        let mut cols = columns();
        let ordered = resolve_bindings(&order_rules(document_order), "Audit", &mut cols, &[]);
        assert_eq!(ordered.bindings.len(), 2);
        assert_eq!(cols.type_of("City"), Some(ColumnType::CascadingList));
    }

    #[test]
    fn test_missing_parent_dropped() {
        let mut cols = columns();
        let rules = vec![ValidationRule::new("B2:B50", "INDIRECT($D$2)")];
        let resolution = resolve_bindings(&rules, "Audit", &mut cols, &[]);
        assert!(resolution.bindings.is_empty());
        assert_eq!(cols.type_of("City"), Some(ColumnType::Text));
    }

    #[test]
    fn test_parent_from_prior_bindings() {
        let prior = vec![DropdownBinding {
            target_column_index: 0,
            target_column: "Region".into(),
            source_sheet: "Lookup".into(),
            source_column_index: 0,
            range_start: 2,
            range_end: 4,
            kind: BindingKind::Direct,
        }];
        let mut cols = columns();
        let rules = vec![ValidationRule::new("B2:B50", "INDIRECT($A$2)")];
        let resolution = resolve_bindings(&rules, "Audit", &mut cols, &prior);
        assert_eq!(resolution.bindings.len(), 1);
        assert_eq!(resolution.bindings[0].source_sheet, "Lookup");
    }

    #[test]
    fn test_malformed_rules_skipped_others_kept() {
        let mut cols = columns();
        let rules = vec![
            ValidationRule::new("C2:C9", "\"Open,Closed\""),
            ValidationRule::new("Z2:Z9", "Lookup!$A$2:$A$4"),
            ValidationRule::new("A2:A9", "Lookup!$A$2:$A$4"),
        ];
        let resolution = resolve_bindings(&rules, "Audit", &mut cols, &[]);
        assert_eq!(resolution.bindings.len(), 1);
        assert_eq!(resolution.bindings[0].target_column, "Region");
        assert_eq!(cols.type_of("Status"), Some(ColumnType::Text));
    }
}
