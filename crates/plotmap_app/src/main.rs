use clap::Parser;
use plotmap_app::{run_app, Cli};

fn main() -> anyhow::Result<()> {
    run_app(Cli::parse())
}
