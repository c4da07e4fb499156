//! CLI entry point for inspecting and converting terrain mask files

use clap::Parser;
use terramask::io::cli::{Cli, MaskInspector};
use terramask::io::logging::init_logging;

fn main() -> terramask::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    MaskInspector::new(cli).run()
}
