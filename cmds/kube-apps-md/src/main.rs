use anyhow::Result;
use clap::Parser;
use kube_apps_md::{cli::Cli, pipeline, telemetry};

fn main() -> Result<()> {
	let cli = Cli::parse();
	telemetry::init(cli.log_level)?;

	let config = cli.into_config()?;
	pipeline::run(&config)
}
