//! keyrx_compiler — compiles keyd-style text configurations to `.krx` binary files.

use clap::{Parser as ClapParser, Subcommand};
use std::path::PathBuf;
use std::process;

mod cli;
mod error;
mod parser;
mod serialize;

#[derive(ClapParser)]
#[command(name = "keyrx_compiler")]
#[command(version, about = "Compile keyd-style text configurations to .krx binary files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a text configuration to a .krx binary file.
    Compile {
        /// Input configuration file.
        input: PathBuf,

        /// Output .krx binary file (defaults to input file with .krx extension).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract and display the SHA256 hash from a .krx file.
    Hash {
        /// .krx binary file.
        file: PathBuf,

        /// Verify hash matches computed hash of the data section.
        #[arg(long)]
        verify: bool,
    },

    /// Parse a configuration file and display the resulting structure.
    Parse {
        /// Input configuration file.
        input: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Render the layers and bindings of a configuration file as text.
    View {
        /// Input configuration file.
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile { input, output } => {
            let output_path = output.unwrap_or_else(|| {
                let mut path = input.clone();
                path.set_extension("krx");
                path
            });
            cli::compile::handle_compile(&input, &output_path).map_err(|e| e.to_string())
        }
        Commands::Hash { file, verify } => {
            cli::hash::handle_hash(&file, verify).map_err(|e| e.to_string())
        }
        Commands::Parse { input, json } => {
            cli::parse::handle_parse(&input, json).map_err(|e| e.to_string())
        }
        Commands::View { input } => cli::view::handle_view(&input).map_err(|e| e.to_string()),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
