//! Command-line interface for inspecting and converting mask files

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::io::configuration::DEFAULT_SEED;
use crate::io::error::Result;
use crate::io::format::{self, ByteOrder};
use crate::symmetry::{Symmetry, SymmetrySettings};

#[derive(Parser, Debug)]
#[command(name = "terramask")]
#[command(author, version, about = "Inspect and convert symmetric terrain mask files")]
/// Command-line arguments for the mask inspection tool
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Symmetry used for spawn, team and terrain axes
    #[arg(short = 'y', long, default_value_t = Symmetry::None, global = true)]
    pub symmetry: Symmetry,

    /// Byte order of scalar mask files
    #[arg(short, long, value_enum, default_value_t = ByteOrder::Big, global = true)]
    pub byte_order: ByteOrder,

    /// Seed given to loaded masks
    #[arg(short, long, default_value_t = DEFAULT_SEED, global = true)]
    pub seed: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Subcommands of the inspection tool
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the side length and canonical hash of a mask file
    Hash {
        /// Mask file to hash
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Cell kind stored in the file
        #[arg(short, long, value_enum, default_value_t = MaskKind::Binary)]
        kind: MaskKind,
    },
    /// Convert a binary mask file into its scalar distance field
    Distance {
        /// Binary mask to read
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Scalar mask to write
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// Print summary statistics of a mask file
    Stats {
        /// Mask file to summarise
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Cell kind stored in the file
        #[arg(short, long, value_enum, default_value_t = MaskKind::Binary)]
        kind: MaskKind,
    },
}

/// Cell kind of a mask file
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MaskKind {
    /// One byte per cell
    Binary,
    /// Four bytes per cell
    Scalar,
}

impl Cli {
    /// Symmetry settings applied to loaded masks
    pub const fn symmetry_settings(&self) -> SymmetrySettings {
        SymmetrySettings::uniform(self.symmetry)
    }
}

/// Runs one CLI command against mask files
pub struct MaskInspector {
    cli: Cli,
}

impl MaskInspector {
    /// Create an inspector for the given arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the command and print its report
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, decoded or written
    pub fn run(&self) -> Result<()> {
        let report = self.report()?;
        // Reports are the tool's output
        #[allow(clippy::print_stdout)]
        {
            println!("{report}");
        }
        Ok(())
    }

    /// Run the command and return its report line
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, decoded or written
    pub fn report(&self) -> Result<String> {
        let symmetry = self.cli.symmetry_settings();
        let seed = self.cli.seed;
        let order = self.cli.byte_order;

        match &self.cli.command {
            Command::Hash { path, kind } => {
                let (size, hash) = match kind {
                    MaskKind::Binary => {
                        let mask = format::read_binary(path, seed, symmetry)?;
                        (mask.size(), mask.to_hash())
                    }
                    MaskKind::Scalar => {
                        let mask = format::read_scalar(path, order, seed, symmetry)?;
                        (mask.size(), mask.to_hash())
                    }
                };
                Ok(format!("{size} {hash}"))
            }
            Command::Distance { input, output } => {
                let mut mask = format::read_binary(input, seed, symmetry)?;
                let field = mask.distance_field();
                format::write_scalar(&field, output, order)?;
                info!(input = %input.display(), output = %output.display(), "Wrote distance field");
                Ok(format!(
                    "{} min={} max={}",
                    field.size(),
                    field.min(),
                    field.max()
                ))
            }
            Command::Stats { path, kind } => match kind {
                MaskKind::Binary => {
                    let mask = format::read_binary(path, seed, symmetry)?;
                    Ok(format!("{} true={}", mask.size(), mask.count()))
                }
                MaskKind::Scalar => {
                    let mask = format::read_scalar(path, order, seed, symmetry)?;
                    Ok(format!(
                        "{} min={} max={} avg={}",
                        mask.size(),
                        mask.min(),
                        mask.max(),
                        mask.avg()
                    ))
                }
            },
        }
    }
}
