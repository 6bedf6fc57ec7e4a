//! # audit-sheets-dropdown
//!
//! Dropdown resolution for audit-sheets.
//!
//! - [`resolver`] turns ordered validation rules into [`DropdownBinding`]s and
//!   a [`LinkGraph`] of parent/dependent columns
//! - [`options`] reads the cell values behind a binding
//! - [`Dropdowns`] keeps the live options of the selected sheet, relinking
//!   cascading columns when a parent value changes
//!
//! ## Example
//!
//! ```rust
//! use audit_sheets_core::{ColumnSet, ColumnType, ValidationRule, Workbook, Worksheet};
//! use audit_sheets_dropdown::Dropdowns;
//!
//! let mut lookup = Worksheet::new("Lookup");
//! lookup.set_cell_value("B2", "Yes").unwrap();
//! lookup.set_cell_value("B3", "No").unwrap();
//! let mut workbook = Workbook::empty();
//! workbook.add_existing_worksheet(lookup).unwrap();
//!
//! let mut columns = ColumnSet::new();
//! columns.insert("Approved", 0, ColumnType::Text);
//!
//! let rules = vec![ValidationRule::new("A2:A10", "Lookup!$B$2:$B$3")];
//! let dropdowns = Dropdowns::build(&rules, &workbook, "Audit", &mut columns, &[], "No options");
//!
//! assert_eq!(columns.type_of("Approved"), Some(ColumnType::DirectList));
//! assert_eq!(dropdowns.options("Approved").unwrap(), ["Yes", "No"]);
//! ```

pub mod binding;
pub mod error;
pub mod links;
pub mod options;
pub mod resolver;
pub mod state;

pub use binding::{BindingKind, DropdownBinding};
pub use error::{DropdownError, DropdownResult};
pub use links::LinkGraph;
pub use options::{
    build_indirect_index, materialize_direct, materialize_options, IndirectOptionsIndex,
    MaterializedOptions, OptionsTable,
};
pub use resolver::{
    parse_direct_source, parse_indirect_dependency, resolve_bindings, target_column_index,
    DirectSource, Resolution,
};
pub use state::Dropdowns;
