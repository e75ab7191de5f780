// src/bin/cli.rs
use cerberus::cli::{self, Cli};
use clap::Parser;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    cli::run(Cli::parse())
}
