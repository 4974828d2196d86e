// CLI module - User-facing command-line interface

mod output;

use crate::descriptor::DescriptorSet;
use crate::error::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Supfile - load, validate, and inspect process supervision descriptors
#[derive(Parser)]
#[command(name = "supfile")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a descriptor file and list the processes it declares
    Check {
        /// Path to the descriptor file (.json or .toml)
        file: PathBuf,
    },

    /// Display the descriptors in a file as a table
    Show {
        /// Path to the descriptor file (.json or .toml)
        file: PathBuf,
    },

    /// Load a descriptor file and re-serialize it to stdout
    Export {
        /// Path to the descriptor file (.json or .toml)
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Toml,
}

impl Cli {
    /// Run the CLI application
    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        let result = cli.execute();
        if let Err(ref e) = result {
            output::print_error(&e.to_string());
        }
        result
    }

    /// Execute the parsed command
    fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Check { file } => {
                let set = DescriptorSet::load(file)?;
                output::print_check_report(file, &set);
                Ok(())
            }

            Commands::Show { file } => {
                let set = DescriptorSet::load(file)?;
                output::print_descriptor_table(&set);
                Ok(())
            }

            Commands::Export { file, format } => {
                let set = DescriptorSet::load(file)?;
                let rendered = match format {
                    ExportFormat::Json => set.to_json_string()?,
                    ExportFormat::Toml => set.to_toml_string()?,
                };
                println!("{}", rendered);
                Ok(())
            }
        }
    }
}
