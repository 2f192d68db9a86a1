//! # cardgrid-cli
//!
//! Command-line interface for cardgrid: import a marketplace template,
//! inspect the header decision, edit single fields and export CSV.

use anyhow::{Context, Result};
use cardgrid_normalize::{HeaderSource, ImportOptions, Normalized, Normalizer, ScanConfig};
use cardgrid_sheet::{
    export_file_name, save_table, table_to_csv, CsvExportOptions, Delimiter, SourceFormat, Table,
    Workbook, PREVIEW_COLS, PREVIEW_ROWS,
};
use clap::Parser;
use colored::Colorize;
use prettytable::{format, Cell, Row, Table as TextTable};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// cardgrid - find the real header of marketplace templates and export clean CSV
#[derive(Parser)]
#[command(name = "cardgrid")]
#[command(author, version, long_about = None)]
#[command(about = "Header-row inference for CSV/XLSX templates")]
struct Cli {
    /// CSV, TSV or workbook file to import
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Workbook sheet to read (0-based)
    #[arg(short, long, default_value_t = 0)]
    sheet: usize,

    /// Use this row as the header instead of locating it (0-based)
    #[arg(short = 'r', long = "header-row", value_name = "ROW")]
    header_row: Option<usize>,

    /// List the sheets of a workbook and exit
    #[arg(long)]
    list_sheets: bool,

    /// Rows shown in the preview
    #[arg(long, default_value_t = PREVIEW_ROWS)]
    rows: usize,

    /// Columns shown in the preview
    #[arg(long, default_value_t = PREVIEW_COLS)]
    cols: usize,

    /// Preview format (table, csv, json)
    #[arg(short = 'f', long = "format", default_value = "table")]
    format: OutputFormat,

    /// Replace one value before export (0-based row)
    #[arg(short = 'e', long = "edit", value_name = "ROW:COLUMN=VALUE")]
    edits: Vec<String>,

    /// Write the table to <FILE stem>.export.csv
    #[arg(long)]
    export: bool,

    /// Write the table to this path (implies --export)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Export delimiter
    #[arg(short, long, default_value = "semicolon")]
    delimiter: DelimiterArg,

    /// Do not start the export with a UTF-8 byte-order mark
    #[arg(long)]
    no_bom: bool,

    /// Scan configuration (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for the preview.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Pretty table output (default)
    #[default]
    Table,
}

/// Export delimiter names accepted on the command line.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum DelimiterArg {
    #[default]
    Semicolon,
    Comma,
    Tab,
}

impl From<DelimiterArg> for Delimiter {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Semicolon => Delimiter::Semicolon,
            DelimiterArg::Comma => Delimiter::Comma,
            DelimiterArg::Tab => Delimiter::Tab,
        }
    }
}

/// A single-field edit parsed from `ROW:COLUMN=VALUE`
#[derive(Debug, PartialEq, Eq)]
struct FieldEdit {
    row: usize,
    column: String,
    value: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.list_sheets {
        return list_sheets(&cli.file);
    }

    let config = match &cli.config {
        Some(path) => ScanConfig::from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ScanConfig::default(),
    };
    let normalizer = Normalizer::new(&config)?;

    let mut options = ImportOptions::default().with_sheet(cli.sheet);
    options.header_row = cli.header_row;

    let imported = normalizer
        .import_file(&cli.file, &options)
        .with_context(|| format!("Failed to import {}", cli.file.display()))?;

    if let Some(selection) = &imported.workbook {
        eprintln!(
            "{} {} ({} of {})",
            "Sheet:".cyan().bold(),
            selection.sheet_name().unwrap_or_default(),
            selection.sheet_index + 1,
            selection.sheet_names.len()
        );
    }
    print_decision(&imported.normalized);

    let mut table = imported.normalized.table.clone();
    for edit in &cli.edits {
        let edit = parse_edit(edit)?;
        tracing::debug!(row = edit.row, column = %edit.column, "applying edit");
        table = table
            .with_value(edit.row, &edit.column, edit.value)
            .with_context(|| format!("Cannot edit row {} column '{}'", edit.row, edit.column))?;
    }

    print_preview(&imported.normalized, &table, cli)?;

    if cli.export || cli.output.is_some() {
        let path = cli
            .output
            .clone()
            .unwrap_or_else(|| export_file_name(&cli.file));
        let export_options = CsvExportOptions::default()
            .with_delimiter(cli.delimiter.into())
            .with_bom(!cli.no_bom);

        save_table(&table, &path, &export_options)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!(
            "{} {} rows to {}",
            "Exported".green().bold(),
            table.row_count(),
            path.display()
        );
    }

    Ok(())
}

/// Print workbook sheet names with their indexes.
fn list_sheets(path: &Path) -> Result<()> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Workbook => {
            let workbook = Workbook::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            for (index, name) in workbook.sheet_names().iter().enumerate() {
                println!("{index}\t{name}");
            }
        }
        SourceFormat::Delimited { .. } => {
            println!("0\t{}", path.file_stem().and_then(|s| s.to_str()).unwrap_or_default());
        }
    }
    Ok(())
}

/// Parse `ROW:COLUMN=VALUE`; the value may contain further `=` and `:`.
fn parse_edit(arg: &str) -> Result<FieldEdit> {
    let (target, value) = arg
        .split_once('=')
        .with_context(|| format!("Invalid edit: '{arg}'. Expected ROW:COLUMN=VALUE format"))?;
    let (row, column) = target
        .split_once(':')
        .with_context(|| format!("Invalid edit: '{arg}'. Expected ROW:COLUMN=VALUE format"))?;
    let row = row
        .trim()
        .parse::<usize>()
        .with_context(|| format!("Invalid row in edit '{arg}'"))?;

    Ok(FieldEdit {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Describe how the header was chosen.
fn print_decision(normalized: &Normalized) {
    let header = &normalized.header;
    let row = header
        .row_index
        .map_or_else(|| "-".to_string(), |r| r.to_string());
    let score = header.score.map_or_else(|| "-".to_string(), |s| s.to_string());

    let source = match header.source {
        HeaderSource::Explicit => "chosen row",
        HeaderSource::Located => "located",
        HeaderSource::Fallback => "first row (no confident match)",
        HeaderSource::Rescanned => "found in data",
        HeaderSource::Kept => "kept",
    };
    eprintln!(
        "{} row {row}, score {score}, {source}",
        "Header:".cyan().bold()
    );

    if normalized.is_fallback() {
        eprintln!(
            "{} no row scored high enough; pass --header-row to pick one",
            "warning:".yellow().bold()
        );
    }
    if normalized.is_low_confidence() {
        eprintln!(
            "{} only {} named column(s); the header row may be wrong",
            "warning:".yellow().bold(),
            normalized.table.named_column_count()
        );
    }
}

/// Print the windowed preview in the selected format.
fn print_preview(normalized: &Normalized, table: &Table, cli: &Cli) -> Result<()> {
    let preview = table.preview(cli.rows, cli.cols);

    match cli.format {
        OutputFormat::Table => {
            if table.is_empty() {
                println!("(no data rows)");
            }
            render_table(&preview).printstd();
            if preview.row_count() < table.row_count() || preview.col_count() < table.col_count() {
                println!(
                    "{}",
                    format!(
                        "showing {} of {} rows, {} of {} columns",
                        preview.row_count(),
                        table.row_count(),
                        preview.col_count(),
                        table.col_count()
                    )
                    .dimmed()
                );
            }
        }
        OutputFormat::Csv => {
            let options = CsvExportOptions::default()
                .with_delimiter(cli.delimiter.into())
                .with_bom(false);
            print!("{}", table_to_csv(&preview, &options)?);
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "header": normalized.header,
                "low_confidence": normalized.is_low_confidence(),
                "total_rows": table.row_count(),
                "table": preview,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}

/// Lay out a table for the terminal, one line per row.
fn render_table(table: &Table) -> TextTable {
    let mut out = TextTable::new();
    out.set_format(*format::consts::FORMAT_BOX_CHARS);
    out.set_titles(Row::new(
        table
            .headers()
            .iter()
            .map(|h| Cell::new(&display_value(h)).style_spec("bFg"))
            .collect(),
    ));
    for row in table.rows() {
        out.add_row(Row::new(row.iter().map(|v| Cell::new(&display_value(v))).collect()));
    }
    out
}

/// Keep multi-line cells on one preview line.
fn display_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardgrid_sheet::Column;

    // ========================================================================
    // parse_edit tests
    // ========================================================================

    #[test]
    fn test_parse_edit() {
        let edit = parse_edit("2:Цена=1 500").unwrap();
        assert_eq!(
            edit,
            FieldEdit {
                row: 2,
                column: "Цена".to_string(),
                value: "1 500".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_edit_value_with_separators() {
        let edit = parse_edit("0:Description=a=b:c").unwrap();
        assert_eq!(edit.column, "Description");
        assert_eq!(edit.value, "a=b:c");

        let edit = parse_edit("1:Note=").unwrap();
        assert_eq!(edit.value, "");
    }

    #[test]
    fn test_parse_edit_invalid() {
        assert!(parse_edit("no separator").is_err());
        assert!(parse_edit("Name=x").is_err());
        assert!(parse_edit("first:Name=x").is_err());
    }

    // ========================================================================
    // Rendering tests
    // ========================================================================

    #[test]
    fn test_render_table() {
        let table = Table::new(
            vec![Column::named("SKU", 0), Column::generated(1)],
            vec![vec!["A1".to_string(), "two\nlines".to_string()]],
        );

        let rendered = render_table(&table);
        assert_eq!(rendered.len(), 1);

        let text = rendered.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.iter().any(|l| l.contains("SKU") && l.contains("Column 2")));
        assert!(lines.iter().any(|l| l.contains("A1") && l.contains("two lines")));
        assert!(!text.contains("two\nlines"));
    }

    #[test]
    fn test_delimiter_arg() {
        assert_eq!(Delimiter::from(DelimiterArg::Tab), Delimiter::Tab);
        assert_eq!(Delimiter::from(DelimiterArg::default()), Delimiter::Semicolon);
    }

    // ========================================================================
    // CLI argument parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parse_file() {
        let cli = Cli::parse_from(["cardgrid", "template.xlsx"]);
        assert_eq!(cli.file, PathBuf::from("template.xlsx"));
        assert_eq!(cli.sheet, 0);
        assert!(cli.header_row.is_none());
        assert_eq!(cli.rows, PREVIEW_ROWS);
        assert_eq!(cli.cols, PREVIEW_COLS);
        assert!(matches!(cli.format, OutputFormat::Table));
        assert!(!cli.export);
    }

    #[test]
    fn test_cli_parse_overrides() {
        let cli = Cli::parse_from([
            "cardgrid",
            "template.xlsx",
            "--sheet",
            "1",
            "--header-row",
            "3",
            "-e",
            "0:SKU=A1",
            "-e",
            "1:SKU=B2",
            "-o",
            "out.csv",
            "--delimiter",
            "tab",
            "--no-bom",
        ]);
        assert_eq!(cli.sheet, 1);
        assert_eq!(cli.header_row, Some(3));
        assert_eq!(cli.edits, vec!["0:SKU=A1".to_string(), "1:SKU=B2".to_string()]);
        assert_eq!(cli.output, Some(PathBuf::from("out.csv")));
        assert!(matches!(cli.delimiter, DelimiterArg::Tab));
        assert!(cli.no_bom);
    }

    #[test]
    fn test_cli_parse_format() {
        let cli = Cli::parse_from(["cardgrid", "-f", "json", "cards.csv"]);
        assert!(matches!(cli.format, OutputFormat::Json));

        let cli = Cli::parse_from(["cardgrid", "--format", "csv", "cards.csv"]);
        assert!(matches!(cli.format, OutputFormat::Csv));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["cardgrid", "-v", "cards.csv"]);
        assert!(cli.verbose);
    }

    // ========================================================================
    // Integration tests
    // ========================================================================

    #[test]
    fn test_run_exports_edited_table() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cards.csv");
        std::fs::write(&source, "Group;;\nSKU;Name;Price\nA1;Widget;9.99\n").unwrap();

        let cli = Cli::parse_from([
            "cardgrid",
            source.to_str().unwrap(),
            "--export",
            "--no-bom",
            "-e",
            "0:Price=10.50",
            "-f",
            "csv",
        ]);
        run(&cli).unwrap();

        let exported = std::fs::read_to_string(dir.path().join("cards.export.csv")).unwrap();
        assert_eq!(exported, "SKU;Name;Price\r\nA1;Widget;10.50\r\n");
    }

    #[test]
    fn test_run_rejects_unknown_column() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cards.csv");
        std::fs::write(&source, "SKU;Name;Price\nA1;Widget;9.99\n").unwrap();

        let cli = Cli::parse_from(["cardgrid", source.to_str().unwrap(), "-e", "0:Weight=1"]);
        let err = run(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("Column not found"));
    }

    #[test]
    fn test_run_unsupported_file() {
        let cli = Cli::parse_from(["cardgrid", "notes.pdf"]);
        assert!(run(&cli).is_err());
    }
}
