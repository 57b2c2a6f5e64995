// tabgrid CLI - headless batch edits on tab-delimited files

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use tabgrid_cli::parse;
use tabgrid_config::Settings;
use tabgrid_engine::document::{normalize_path, Document};
use tabgrid_io::tsv;

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tabgrid")]
#[command(about = "Tab-delimited grid editor (headless batch mode)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print table dimensions and column headers
    Info {
        file: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Apply batch edits, optionally undo the tail of them, then save
    #[command(after_help = "\
Examples:
  tabgrid edit data.tsv --set 1:2=42
  tabgrid edit data.tsv --add-rows 2 --remove-col 1
  tabgrid edit data.tsv --math add:5 --cells 1:0,2:0
  tabgrid edit data.tsv --set 1:0=x --undo 1 --dry-run")]
    Edit(EditArgs),
}

#[derive(Args)]
struct EditArgs {
    file: PathBuf,

    /// Cell write as ROW:COL=VALUE (repeatable)
    #[arg(long = "set", value_name = "R:C=VALUE")]
    sets: Vec<String>,

    /// Append blank rows
    #[arg(long, value_name = "N")]
    add_rows: Option<usize>,

    /// Append blank columns
    #[arg(long, value_name = "N")]
    add_cols: Option<usize>,

    /// Delete a row by position (repeatable)
    #[arg(long = "remove-row", value_name = "POS")]
    remove_rows: Vec<usize>,

    /// Delete a column by index (repeatable)
    #[arg(long = "remove-col", value_name = "IDX")]
    remove_cols: Vec<usize>,

    /// Arithmetic over --cells, as OP:OPERAND (add, sub, mul, div)
    #[arg(long, value_name = "OP:N", requires = "cells")]
    math: Option<String>,

    /// Target cells for --math, ROW:COL pairs joined by commas
    #[arg(long, value_name = "R:C,...")]
    cells: Option<String>,

    /// Undo the last K applied operations before saving
    #[arg(long, value_name = "K")]
    undo: Option<usize>,

    /// Report the result without writing the file
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Info { file, json } => run_info(&file, json),
        Commands::Edit(args) => run_edit(&args),
    };
    ExitCode::from(code)
}

#[derive(Serialize)]
struct InfoOutput {
    rows: usize,
    cols: usize,
    headers: Vec<String>,
}

fn run_info(file: &Path, json: bool) -> u8 {
    let store = match tsv::load(file) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_IO;
        }
    };

    let info = InfoOutput {
        rows: store.row_count(),
        cols: store.column_count(),
        headers: store.columns().iter().map(|c| c.header().to_string()).collect(),
    };

    if json {
        match serde_json::to_string_pretty(&info) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("error: {e}");
                return EXIT_ERROR;
            }
        }
    } else {
        println!("{} row(s), {} column(s)", info.rows, info.cols);
        println!("headers: {}", info.headers.join(", "));
    }
    EXIT_SUCCESS
}

fn run_edit(args: &EditArgs) -> u8 {
    let settings = Settings::load();

    let store = match tsv::load(&args.file) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_IO;
        }
    };
    let mut doc = Document::new(normalize_path(&args.file), store, settings.undo_limit);

    if let Err(code) = apply_edits(&mut doc, args) {
        return code;
    }

    if let Some(k) = args.undo {
        for _ in 0..k {
            match doc.undo() {
                Some(label) => println!("undid: {label}"),
                None => break,
            }
        }
    }

    if args.dry_run {
        println!(
            "dry run: {} row(s), {} column(s), {}",
            doc.store.row_count(),
            doc.store.column_count(),
            if doc.is_dirty() { "modified" } else { "unchanged" },
        );
        return EXIT_SUCCESS;
    }

    if let Err(e) = tsv::save(&doc.store, &args.file, settings.backup_count) {
        eprintln!("error: {e}");
        return EXIT_IO;
    }
    doc.mark_saved();
    println!(
        "saved: {} row(s), {} column(s)",
        doc.store.row_count(),
        doc.store.column_count(),
    );
    EXIT_SUCCESS
}

/// Apply the batch in a fixed order: cell writes, appends, removals, math.
fn apply_edits(doc: &mut Document, args: &EditArgs) -> Result<(), u8> {
    for spec in &args.sets {
        let (row, col, value) = parse_set_or_usage(spec)?;
        command(doc.edit_cell(row, col, &value))?;
    }

    if let Some(n) = args.add_rows {
        command(doc.add_rows(n))?;
    }
    if let Some(n) = args.add_cols {
        command(doc.add_columns(n))?;
    }

    if !args.remove_rows.is_empty() {
        command(doc.remove_rows(&args.remove_rows))?;
    }
    if !args.remove_cols.is_empty() {
        command(doc.remove_columns(&args.remove_cols))?;
    }

    if let (Some(math), Some(cells)) = (&args.math, &args.cells) {
        let (op, operand) = parse_math_or_usage(math)?;
        let targets = match parse::parse_cells(cells) {
            Ok(targets) => targets,
            Err(e) => {
                eprintln!("error: {e}");
                return Err(EXIT_USAGE);
            }
        };
        command(doc.apply_math(op, operand, &targets))?;
    }

    Ok(())
}

fn parse_set_or_usage(spec: &str) -> Result<(usize, usize, String), u8> {
    parse::parse_set(spec).map_err(|e| {
        eprintln!("error: {e}");
        EXIT_USAGE
    })
}

fn parse_math_or_usage(spec: &str) -> Result<(tabgrid_engine::commands::MathOp, f64), u8> {
    parse::parse_math(spec).map_err(|e| {
        eprintln!("error: {e}");
        EXIT_USAGE
    })
}

fn command(result: Result<(), String>) -> Result<(), u8> {
    result.map_err(|e| {
        eprintln!("error: {e}");
        EXIT_ERROR
    })
}
