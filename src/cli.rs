use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(version, about = "A small Lisp with value-copying closures")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a source file and print its result
    Run {
        /// Path to the source file
        file: PathBuf,
    },

    /// Parse a source file and print its syntax tree as JSON
    Check {
        /// Path to the source file to check
        file: PathBuf,

        /// Collapse each node's span into a single "line:col:line:col" entry
        #[arg(long)]
        compact: bool,
    },

    /// Start an interactive REPL session
    Repl,
}
