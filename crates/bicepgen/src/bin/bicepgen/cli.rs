//! bicepgen cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; bicepgen ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a manifest as bicep
    ///
    /// Reads the manifest from stdin unless --input-file is given
    Render(RenderCommand),

    /// Print the identifiers generated for seeds
    #[command(alias = "id")]
    Identifier(IdentifierCommand),
}

#[derive(Parser, Debug)]
pub struct RenderCommand {
    /// Load the manifest from a file
    #[clap(short = 'f', long = "input-file")]
    pub input_file: Option<PathBuf>,

    /// Write the template to a file instead of stdout
    #[clap(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct IdentifierCommand {
    #[clap(flatten)]
    pub output: OutputArgs,

    /// Seeds to derive identifiers from
    #[arg(required = true)]
    pub seeds: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}
