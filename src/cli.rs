use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    combine::{Alignment, DEFAULT_KEY_COLUMN},
    rows::RowCodec,
    scanner::DEFAULT_SECTION,
    transform::Preset,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Rotate, invert, and merge particle columns in STAR files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply numeric angle transforms to columns of one section
    Transform(TransformArgs),
    /// Apply a built-in re-orientation plan
    Preset(PresetArgs),
    /// Sort a source file by key and append its columns to a target file
    Combine(CombineArgs),
    /// List the declared columns of a section
    Columns(ColumnsArgs),
}

#[derive(Debug, Args)]
pub struct IoArgs {
    /// Input STAR file (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output STAR file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding for the output file/stdout (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct TransformArgs {
    #[command(flatten)]
    pub io: IoArgs,
    /// Operations of the form `COLUMN=KIND[:AMOUNT]` where KIND is offset,
    /// rotate, invert-offset, or invert (e.g. `_rlnAngleRot=rotate:180`)
    #[arg(long = "op", action = clap::ArgAction::Append)]
    pub ops: Vec<String>,
    /// YAML plan file describing the operations
    #[arg(long)]
    pub plan: Option<PathBuf>,
    /// Section to transform (overrides the plan; defaults to data_particles)
    #[arg(long)]
    pub section: Option<String>,
    /// How rewritten rows are re-encoded (rejoin or preserve)
    #[arg(long, value_parser = parse_codec)]
    pub codec: Option<RowCodec>,
    /// Skip operations whose column is not declared instead of aborting
    #[arg(long = "lenient-columns")]
    pub lenient_columns: bool,
}

#[derive(Debug, Args)]
pub struct PresetArgs {
    /// Preset to apply
    #[arg(value_enum)]
    pub preset: Preset,
    #[command(flatten)]
    pub io: IoArgs,
    /// Section to transform (defaults to data_particles)
    #[arg(long)]
    pub section: Option<String>,
}

#[derive(Debug, Args)]
pub struct CombineArgs {
    /// Source STAR file whose rows are sorted and whose columns are copied
    #[arg(long)]
    pub source: PathBuf,
    /// Target STAR file that receives the new columns
    #[arg(long)]
    pub target: PathBuf,
    /// Output file for the extended target (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Optional file receiving the sorted source document
    #[arg(long = "sorted-output")]
    pub sorted_output: Option<PathBuf>,
    /// Column whose `_<digits>` suffix orders the source rows
    #[arg(long = "key-column", default_value = DEFAULT_KEY_COLUMN)]
    pub key_column: String,
    /// Comma-separated source columns to append (defaults to helical tube ID and tilt/psi priors)
    #[arg(short = 'C', long = "columns", action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
    /// Section read from the source file
    #[arg(long = "source-section", default_value = DEFAULT_SECTION)]
    pub source_section: String,
    /// Section extended in the target file
    #[arg(long = "target-section", default_value = DEFAULT_SECTION)]
    pub target_section: String,
    /// Row-count check between the sorted source and the target
    #[arg(long, value_enum, default_value = "warn")]
    pub alignment: Alignment,
    /// Value written for columns a short source row cannot provide
    #[arg(long, default_value = "")]
    pub placeholder: String,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding for the output files (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Input STAR file (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Section whose loop declarations are listed
    #[arg(long, default_value = DEFAULT_SECTION)]
    pub section: String,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_codec(value: &str) -> Result<RowCodec, String> {
    value.parse::<RowCodec>().map_err(|err| err.to_string())
}
