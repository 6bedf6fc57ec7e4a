//! Audit Sheets CLI - inspect dropdowns and review rows of a workbook

use anyhow::{bail, Context, Result};
use audit_sheets::prelude::*;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "audit-sheets")]
#[command(
    author,
    version,
    about = "Review spreadsheet rows using the workbook's own dropdowns"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand that opens a sheet
#[derive(Args, Debug, Clone)]
struct SheetArgs {
    /// Input workbook (xlsx)
    input: PathBuf,

    /// Sheet to select (default: first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// JSON file with session options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only show rows whose identity column equals this value
    #[arg(short, long)]
    identity: Option<String>,

    /// Reject workbooks larger than this many bytes
    #[arg(long)]
    max_upload_bytes: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets in a workbook
    Sheets {
        /// Input workbook (xlsx)
        input: PathBuf,
    },

    /// Show each column of a sheet with its type tag
    Columns {
        #[command(flatten)]
        args: SheetArgs,
    },

    /// Show dropdown bindings, cascading links and current options
    Dropdowns {
        #[command(flatten)]
        args: SheetArgs,
    },

    /// Show the form fields of one row
    Row {
        /// Row number (1 is the first data row)
        row: u32,

        #[command(flatten)]
        args: SheetArgs,

        /// Only show these columns (default: all)
        #[arg(short, long)]
        columns: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the visible row numbers
    Rows {
        #[command(flatten)]
        args: SheetArgs,
    },

    /// Apply edits to a row and write the dated export archive
    Export {
        #[command(flatten)]
        args: SheetArgs,

        /// Row to edit
        #[arg(short, long, default_value = "1")]
        row: u32,

        /// Field assignments, COLUMN=VALUE
        #[arg(long = "set", value_name = "COLUMN=VALUE")]
        assignments: Vec<String>,

        /// Directory to write the archive to (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Columns { args } => show_columns(&args),
        Commands::Dropdowns { args } => show_dropdowns(&args),
        Commands::Row {
            row,
            args,
            columns,
            json,
        } => show_row(&args, row, &columns, json),
        Commands::Rows { args } => list_rows(&args),
        Commands::Export {
            args,
            row,
            assignments,
            output,
        } => export(&args, row, &assignments, output.as_deref()),
    }
}

fn load_options(args: &SheetArgs) -> Result<SessionOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            SessionOptions::from_json(&json)
                .with_context(|| format!("Invalid options in '{}'", path.display()))?
        }
        None => SessionOptions::default(),
    };
    if let Some(limit) = args.max_upload_bytes {
        options.max_upload_bytes = limit;
    }
    Ok(options)
}

fn open_workbook(path: &Path, options: SessionOptions) -> Result<Session> {
    Session::open_file(path, options).with_context(|| format!("Failed to open '{}'", path.display()))
}

/// Open the workbook, select the sheet and apply the identity filter
fn open_sheet(args: &SheetArgs) -> Result<Session> {
    let mut session = open_workbook(&args.input, load_options(args)?)?;

    let sheet = match &args.sheet {
        Some(name) => name.clone(),
        None => session
            .sheets()
            .first()
            .map(|s| s.to_string())
            .context("Workbook has no sheets")?,
    };
    session
        .select_sheet(&sheet)
        .with_context(|| format!("Failed to select sheet '{}'", sheet))?;

    if let Some(identity) = &args.identity {
        session.set_identity_filter(identity.as_str())?;
    }
    Ok(session)
}

fn list_sheets(input: &Path) -> Result<()> {
    let session = open_workbook(input, SessionOptions::default())?;
    for (idx, name) in session.sheets().iter().enumerate() {
        println!("{}: {}", idx, name);
    }
    Ok(())
}

fn show_columns(args: &SheetArgs) -> Result<()> {
    let session = open_sheet(args)?;
    for spec in session.columns()?.iter() {
        if spec.column_type == spec.inferred_type {
            println!("{}\t{}", spec.column_type, spec.name);
        } else {
            println!(
                "{}\t{} (inferred {})",
                spec.column_type, spec.name, spec.inferred_type
            );
        }
    }
    Ok(())
}

fn show_dropdowns(args: &SheetArgs) -> Result<()> {
    let session = open_sheet(args)?;
    let dropdowns = session.dropdowns()?;

    if dropdowns.bindings().is_empty() {
        eprintln!("No dropdowns on this sheet");
        return Ok(());
    }

    println!("Bindings:");
    for binding in dropdowns.bindings() {
        println!("  {}", binding);
    }

    let pairs = dropdowns.links().pairs();
    if !pairs.is_empty() {
        println!("Cascades:");
        for (parent, dependent) in pairs {
            println!("  {} -> {}", parent, dependent);
        }
    }

    println!("Options:");
    for (column, options) in dropdowns.table().iter() {
        println!("  {}: {}", column, options.join(", "));
    }
    Ok(())
}

fn show_row(args: &SheetArgs, row: u32, columns: &[String], json: bool) -> Result<()> {
    let mut session = open_sheet(args)?;
    if row == 0 {
        bail!("Row 0 is the header; data rows start at 1");
    }
    select_columns(&mut session, columns)?;

    let views = session.field_views(row)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for view in &views {
        match &view.options {
            Some(options) => println!(
                "{} [{}] = {}  ({})",
                view.name,
                view.column_type,
                view.value,
                options.join(" | ")
            ),
            None => println!("{} [{}] = {}", view.name, view.column_type, view.value),
        }
    }
    Ok(())
}

fn select_columns(session: &mut Session, columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        session.select_all_columns()?;
        return Ok(());
    }
    for column in columns {
        if !session.toggle_column(column)? {
            eprintln!("Warning: no column named '{}'", column);
        }
    }
    Ok(())
}

fn list_rows(args: &SheetArgs) -> Result<()> {
    let session = open_sheet(args)?;
    let rows: Vec<String> = session
        .visible_rows()?
        .into_iter()
        .filter(|r| *r > 0)
        .map(|r| r.to_string())
        .collect();
    if rows.is_empty() {
        eprintln!("No visible rows");
    } else {
        println!("{}", rows.join(" "));
    }
    Ok(())
}

/// Split `COLUMN=VALUE` at the first `=`
fn parse_assignment(assignment: &str) -> Result<(&str, &str)> {
    match assignment.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => Ok((column.trim(), value)),
        _ => bail!("Expected COLUMN=VALUE, got '{}'", assignment),
    }
}

fn export(args: &SheetArgs, row: u32, assignments: &[String], output: Option<&Path>) -> Result<()> {
    let mut session = open_sheet(args)?;
    let sheet = session
        .active_sheet()
        .map(str::to_string)
        .context("No sheet selected")?;

    session.go_to_row(row)?;
    for assignment in assignments {
        let (column, value) = parse_assignment(assignment)?;
        session
            .set_field(&sheet, row, column, FieldValue::text(value))
            .with_context(|| format!("Failed to set '{}'", column))?;
    }

    let bundle = session
        .export(chrono::Local::now().date_naive())
        .context("Failed to build export")?;
    let dir = output.unwrap_or_else(|| Path::new("."));
    let path = bundle
        .write_to_dir(dir)
        .with_context(|| format!("Failed to write export to '{}'", dir.display()))?;
    eprintln!("Wrote '{}' ({})", path.display(), bundle.entry_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("City=Reno").unwrap(), ("City", "Reno"));
        assert_eq!(parse_assignment(" Note =a=b").unwrap(), ("Note", "a=b"));
        assert_eq!(parse_assignment("Note=").unwrap(), ("Note", ""));
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("City").is_err());
    }

    #[test]
    fn test_cli_parses_shared_args() {
        let cli = Cli::try_parse_from([
            "audit-sheets",
            "row",
            "3",
            "audit.xlsx",
            "--sheet",
            "Audit",
            "--identity",
            "alice",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Row { row, args, json, .. } => {
                assert_eq!(row, 3);
                assert_eq!(args.sheet.as_deref(), Some("Audit"));
                assert_eq!(args.identity.as_deref(), Some("alice"));
                assert!(json);
            }
            _ => panic!("expected the row subcommand"),
        }
    }

    #[test]
    fn test_config_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("options.json");
        fs::write(&config, r#"{"identity_column": "Reviewer", "max_upload_bytes": 10}"#).unwrap();

        let args = SheetArgs {
            input: dir.path().join("audit.xlsx"),
            sheet: None,
            config: Some(config),
            identity: None,
            max_upload_bytes: Some(2048),
        };
        let options = load_options(&args).unwrap();
        assert_eq!(options.identity_column, "Reviewer");
        assert_eq!(options.max_upload_bytes, 2048);
    }

    #[test]
    fn test_missing_input_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.xlsx");
        let err = open_workbook(&missing, SessionOptions::default()).unwrap_err();
        assert!(err.to_string().contains("missing.xlsx"));
    }
}
