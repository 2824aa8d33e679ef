use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "quadsync",
    version,
    about = "Write quads to a relational store and a SPARQL index under one API"
)]
pub struct Cli {
    /// Custom config file (.toml), merged over config.toml
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dataset (index namespace) to write to
    #[arg(short, long, default_value = "kb")]
    pub dataset: String,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Apply one SPARQL UPDATE request, read from FILE or stdin
    Update {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Request text given inline
        #[arg(short = 'e', long, conflicts_with = "file")]
        expression: Option<String>,
    },
    /// Insert the quads of an N-Quads file
    Add {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Delete the quads of an N-Quads file
    Remove {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Count stored quads
    Count {
        /// Graph IRI, or "default" for the default graph
        #[arg(long)]
        graph: Option<String>,
    },
}
