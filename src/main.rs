//! Wipkit CLI - Command-line tool for WITec Project files.
//!
//! This is the main entry point for the wipkit command-line application.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use wipkit::prelude::*;
use wipkit::tag::AnnotationFields;

/// Wipkit - WITec Project file decoding tool
#[derive(Parser)]
#[command(name = "wipkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// How to decode the legacy numeric codes 2, 3 and 5
    #[arg(long, value_enum, global = true, default_value_t = Numeric::Strict)]
    numeric: Numeric,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the decoded tag tree
    Dump {
        /// Path to the project file
        #[arg(short, long, env = "WIPKIT_INPUT")]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = DumpFormat::Tree)]
        format: DumpFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the first annotation as rich-text bytes
        #[arg(long)]
        raw_annotation: bool,
    },

    /// Print the annotation of a data entry
    Info {
        /// Path to the project file
        #[arg(short, long, env = "WIPKIT_INPUT")]
        input: PathBuf,

        /// Data entry number
        #[arg(short, long, default_value_t = 1)]
        number: usize,
    },

    /// Extract annotation fields from project files as JSON
    Metadata {
        /// Project files or directories to search for .wip files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Numeric {
    /// Raw signed bytes
    Strict,
    /// Little-endian f64, f32 and i32
    Reinterpreted,
}

impl From<Numeric> for NumericMode {
    fn from(numeric: Numeric) -> Self {
        match numeric {
            Numeric::Strict => NumericMode::Strict,
            Numeric::Reinterpreted => NumericMode::Reinterpreted,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    /// Indented listing
    Tree,
    /// Pretty-printed JSON
    Json,
}

/// Arrays longer than this are summarized in tree listings.
const PREVIEW_LEN: usize = 16;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = DecodeOptions::default().numeric_mode(cli.numeric.into());

    match cli.command {
        Commands::Dump {
            input,
            format,
            output,
            raw_annotation,
        } => {
            let options = options.annotation_fixup(!raw_annotation);
            cmd_dump(&input, format, output.as_deref(), &options)?;
        }
        Commands::Info { input, number } => {
            cmd_info(&input, number, &options)?;
        }
        Commands::Metadata { inputs, output } => {
            cmd_metadata(&inputs, output.as_deref(), &options)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "wipkit=debug" } else { "wipkit=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_project(path: &Path, options: &DecodeOptions) -> Result<Project> {
    Project::open_with(path, options, &mut TracingSink)
        .with_context(|| format!("Failed to decode {}", path.display()))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}

fn cmd_dump(
    input: &Path,
    format: DumpFormat,
    output: Option<&Path>,
    options: &DecodeOptions,
) -> Result<()> {
    let start = Instant::now();
    let project = open_project(input, options)?;
    tracing::info!(
        file_type = project.file_type(),
        nodes = project.contents().node_count(),
        "Loaded {} in {:?}",
        input.display(),
        start.elapsed()
    );

    let mut out = open_output(output)?;
    match format {
        DumpFormat::Json => {
            serde_json::to_writer_pretty(&mut out, project.contents())
                .context("Failed to write JSON")?;
            writeln!(out)?;
        }
        DumpFormat::Tree => write_tree(&mut out, project.contents(), 0)?,
    }
    out.flush()?;

    Ok(())
}

fn write_tree(out: &mut dyn Write, tree: &TagTree, depth: usize) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    for (name, value) in tree {
        match value {
            TagValue::Tree(child) => {
                writeln!(out, "{}{}/", indent, name)?;
                write_tree(out, child, depth + 1)?;
            }
            TagValue::Array(array) if array.len() > PREVIEW_LEN => {
                writeln!(
                    out,
                    "{}{}: {} = <{} values>",
                    indent,
                    name,
                    array.type_name(),
                    array.len()
                )?;
            }
            _ => writeln!(out, "{}{}: {} = {}", indent, name, value.type_name(), value)?,
        }
    }
    Ok(())
}

fn cmd_info(input: &Path, number: usize, options: &DecodeOptions) -> Result<()> {
    let project = open_project(input, options)?;
    let text = project
        .info_by_number(number)
        .with_context(|| format!("No annotation for Data {}", number))?;

    println!("{}", text);

    Ok(())
}

fn cmd_metadata(inputs: &[PathBuf], output: Option<&Path>, options: &DecodeOptions) -> Result<()> {
    let files = collect_projects(inputs);
    tracing::info!("Extracting metadata from {} files...", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let results: Vec<(&PathBuf, Result<IndexMap<String, AnnotationFields>>)> = files
        .par_iter()
        .map(|path| {
            let metadata = open_project(path, options)
                .and_then(|project| project.metadata().context("Failed to read annotations"));
            pb.inc(1);
            (path, metadata)
        })
        .collect();
    pb.finish_and_clear();

    let mut collected = IndexMap::new();
    let mut errors = 0;
    for (path, metadata) in results {
        match metadata {
            Ok(metadata) => {
                collected.insert(path.display().to_string(), metadata);
            }
            Err(e) => {
                tracing::error!("{:#}", e);
                errors += 1;
            }
        }
    }

    let mut out = open_output(output)?;
    serde_json::to_writer_pretty(&mut out, &collected).context("Failed to write JSON")?;
    writeln!(out)?;
    out.flush()?;

    tracing::info!(
        "Processed {} files in {:?} ({} errors)",
        collected.len() + errors,
        start.elapsed(),
        errors
    );

    Ok(())
}

/// Expand directories into the project files below them, in path order.
fn collect_projects(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(
                WalkDir::new(input)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file() && is_project(e.path()))
                    .map(|e| e.into_path()),
            );
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn is_project(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wip"))
}
