//! Discovery and aggregation wired together.
//!
//! A producer thread runs [`Discovery`] and sends every match over a channel;
//! a consumer thread folds the channel into [`Clusters`]. The producer owns
//! the only sender, so the consumer stops once discovery finishes or fails.

use std::{sync::mpsc, thread};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::{
	aggregate::{aggregate, Clusters},
	config::Config,
	discover::Discovery,
	matcher::Match,
	render,
};

/// Discover and aggregate every app under the configured roots.
pub fn collect(config: &Config) -> Result<Clusters> {
	let (tx, rx) = mpsc::channel::<Match>();

	thread::scope(|s| -> Result<Clusters> {
		let producer = s.spawn(move || {
			Discovery::new(config).run(|found| {
				tx.send(found)
					.map_err(|_| anyhow!("aggregator stopped receiving matches"))
			})
		});
		let consumer = s.spawn(move || aggregate(rx, config));

		let produced = producer
			.join()
			.map_err(|_| anyhow!("discovery thread panicked"))?;
		let clusters = consumer
			.join()
			.map_err(|_| anyhow!("aggregation thread panicked"))?;

		let emitted = produced?;
		debug!(emitted, "Discovery finished");
		Ok(clusters)
	})
}

/// Full run: discover, aggregate and rewrite the output file.
pub fn run(config: &Config) -> Result<()> {
	let clusters = collect(config)?;

	render::update_output(config, &clusters)
		.with_context(|| format!("rendering apps into {}", config.output.display()))?;

	let namespaces: usize = clusters.values().map(|c| c.namespaces.len()).sum();
	let apps: usize = clusters
		.values()
		.flat_map(|c| c.namespaces.values())
		.map(|ns| ns.len())
		.sum();
	info!(
		clusters = clusters.len(),
		namespaces,
		apps,
		"Rendered apps into {}",
		config.output.display()
	);
	Ok(())
}
