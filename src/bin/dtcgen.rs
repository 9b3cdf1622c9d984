//! Generate a C decision tree classifier from a scikit-learn dump.
//!
//! Usage:
//!   dtcgen model.json -o firmware/dtc/dtc_model.c --max-depth 8
//!   dtcgen model.json --sanitize-names --show-weights --print
//!
//! Set `RUST_LOG=debug` for details or `RUST_LOG=warn` to see truncated
//! branches.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use dtcgen::codegen::{generate_sections, BlockType, GeneratorConfig, Provenance};
use dtcgen::compat::sklearn;

#[derive(Debug, Parser)]
#[command(name = "dtcgen", version, about = "Transpile a decision tree classifier to C")]
struct Cli {
    /// JSON dump of a fitted DecisionTreeClassifier.
    model: PathBuf,

    /// Output C file.
    #[arg(short, long, default_value = "dtc_model.c")]
    output: PathBuf,

    /// Spaces per nesting level.
    #[arg(long, default_value_t = 4)]
    indent_width: usize,

    /// Fractional digits of thresholds and weights.
    #[arg(long, default_value_t = 6)]
    decimal_places: usize,

    /// Split depth emitted before branches are truncated.
    #[arg(long, default_value_t = 10)]
    max_depth: usize,

    /// Emit each leaf's class weights as a comment.
    #[arg(long)]
    show_weights: bool,

    /// Window size recorded in the header (overrides the dump).
    #[arg(long)]
    block_size: Option<usize>,

    /// Window type recorded in the header (overrides the dump).
    #[arg(long, value_enum)]
    block_type: Option<CliBlockType>,

    /// Name of the generated function.
    #[arg(long, default_value = "dtc")]
    function_name: String,

    /// Name of the generated label type.
    #[arg(long, default_value = "dtc_t")]
    type_name: String,

    /// Rewrite feature names and class labels into C identifiers.
    #[arg(long)]
    sanitize_names: bool,

    /// Also print the generated source to stdout.
    #[arg(long)]
    print: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliBlockType {
    Block,
    Sliding,
}

impl From<CliBlockType> for BlockType {
    fn from(value: CliBlockType) -> Self {
        match value {
            CliBlockType::Block => BlockType::Block,
            CliBlockType::Sliding => BlockType::Sliding,
        }
    }
}

impl Cli {
    /// Dump provenance with any command-line overrides applied.
    fn provenance(&self, from_dump: Option<Provenance>) -> Provenance {
        let base = from_dump.unwrap_or_default();
        Provenance {
            block_size: self.block_size.unwrap_or(base.block_size),
            block_type: self.block_type.map(BlockType::from).unwrap_or(base.block_type),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli, &mut io::stdout().lock())
}

/// Load, convert, generate and write; user-facing messages go to `out`.
fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let model = sklearn::load_json(&cli.model)
        .with_context(|| format!("loading {}", cli.model.display()))?;

    let (tree, features, labels) = if cli.sanitize_names {
        model.to_parts_sanitized()
    } else {
        model.to_parts()
    }
    .context("converting model (try --sanitize-names for arbitrary names)")?;

    let config = GeneratorConfig::builder()
        .indent_width(cli.indent_width)
        .decimal_places(cli.decimal_places)
        .max_depth(cli.max_depth)
        .include_class_weights(cli.show_weights)
        .provenance(cli.provenance(model.provenance))
        .function_name(cli.function_name.as_str())
        .type_name(cli.type_name.as_str())
        .build()
        .context("invalid generator options")?;

    let source = generate_sections(&tree, &features, &labels, &config)
        .context("generating C source")?;
    if source.is_truncated() {
        eprintln!(
            "warning: {} branch(es) deeper than --max-depth {} were replaced by #warning",
            source.truncations.len(),
            cli.max_depth
        );
    }
    let text = source.to_string();
    write_source(&cli.output, &text)?;

    if cli.print {
        write!(out, "{text}")?;
    }
    writeln!(out, "File written:")?;
    writeln!(out, "{}", cli.output.display())?;
    Ok(())
}

/// Write `text` to `path`, creating missing parent directories.
fn write_source(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}
