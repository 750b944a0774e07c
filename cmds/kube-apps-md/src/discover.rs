//! discover - Find app manifests in directory trees
//!
//! Discovery runs in two passes over every configured root:
//!
//! 1. Every `kustomization.yaml` is read and the files listed in its
//!    `resources` are matched with the Kustomization's cluster/namespace
//!    context. Those files are then claimed so the second pass skips them.
//! 2. Every other `.yaml`/`.yml` file is matched on its own.
//!
//! Matches are handed to a sink as they are found. Both passes run on the
//! caller's thread, one after the other.

use std::{
	collections::HashSet,
	fs, io,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_yaml::Value;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::{
	config::Config,
	matcher::{match_documents, Match},
	path_matcher,
	paths,
	yaml::{self, Probe},
};

/// File name that marks a Kustomization
pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";

const KUSTOMIZE_API_GROUP: &str = "kustomize.config.k8s.io";

/// Walks the configured roots, remembering which files Kustomizations claimed.
pub struct Discovery<'a> {
	config: &'a Config,
	/// Absolute, cleaned paths already matched through a Kustomization
	claimed: HashSet<PathBuf>,
}

impl<'a> Discovery<'a> {
	pub fn new(config: &'a Config) -> Self {
		Self {
			config,
			claimed: HashSet::new(),
		}
	}

	/// Run both passes, handing every match to `sink`. Returns the number of
	/// matches emitted.
	pub fn run<F>(&mut self, mut sink: F) -> Result<usize>
	where
		F: FnMut(Match) -> Result<()>,
	{
		let config = self.config;
		let mut emitted = 0;
		let mut emit = |m: Match| -> Result<()> {
			emitted += 1;
			sink(m)
		};

		for dir in &config.dirs {
			debug!("Resolving kustomizations in {}", dir.display());
			for entry in self.walk(dir) {
				let entry = entry?;
				if entry.file_type().is_dir() || entry.file_name() != KUSTOMIZATION_FILE {
					continue;
				}
				self.resolve_kustomization(entry.path(), &mut emit)?;
			}
		}
		trace!(claimed = self.claimed.len(), "Kustomization pass finished");

		for dir in &config.dirs {
			debug!("Searching manifests in {}", dir.display());
			for entry in self.walk(dir) {
				let entry = entry?;
				let path = entry.path();
				if entry.file_type().is_dir() || !paths::is_yaml(path) {
					continue;
				}
				if self.claimed.contains(&paths::absolute(path)?) {
					trace!("Skipping {}, claimed by a kustomization", path.display());
					continue;
				}
				self.match_file(path, &Match::default(), &mut emit)?;
			}
		}

		Ok(emitted)
	}

	/// Files and directories below `dir`, pruning hidden entries when asked to.
	/// The root itself is never treated as hidden.
	fn walk(&self, dir: &Path) -> impl Iterator<Item = Result<DirEntry>> {
		let exclude_hidden = self.config.exclude_hidden;
		let root = dir.display().to_string();
		WalkDir::new(dir)
			.into_iter()
			.filter_entry(move |e| {
				!(exclude_hidden && e.depth() > 0 && paths::is_hidden_name(e.file_name()))
			})
			.map(move |entry| entry.with_context(|| format!("failed to walk {root}")))
	}

	fn resolve_kustomization<F>(&mut self, path: &Path, emit: &mut F) -> Result<()>
	where
		F: FnMut(Match) -> Result<()>,
	{
		let path = paths::clean(path);
		let base_dir = path.parent().unwrap_or(Path::new(""));
		let overrides =
			path_matcher::classify(self.config.path_matcher.as_ref(), &path.to_string_lossy());

		for doc in yaml::decode_all(&path)? {
			if !is_kustomization(&doc) {
				continue;
			}

			let namespace = if overrides.namespace.is_empty() {
				doc.probe_str(&["namespace"]).to_string()
			} else {
				overrides.namespace.clone()
			};
			let seed = Match::seed(overrides.cluster.clone(), namespace, overrides.name.clone());
			debug!(
				cluster = %seed.cluster,
				namespace = %seed.namespace,
				"Resolving {}",
				path.display()
			);

			for resource in doc.probe_strings(&["resources"]) {
				let resource_path = paths::clean(&base_dir.join(resource));
				let metadata = match fs::metadata(&resource_path) {
					Ok(metadata) => metadata,
					Err(e) if e.kind() == io::ErrorKind::NotFound => {
						trace!("Skipping missing resource {}", resource_path.display());
						continue;
					}
					Err(e) => {
						return Err(e).with_context(|| {
							format!("failed to stat {}", resource_path.display())
						})
					}
				};
				if metadata.is_dir() {
					continue;
				}

				self.match_file(&resource_path, &seed, emit)?;
				self.claimed.insert(paths::absolute(&resource_path)?);
			}
		}

		Ok(())
	}

	fn match_file<F>(&self, path: &Path, seed: &Match, emit: &mut F) -> Result<()>
	where
		F: FnMut(Match) -> Result<()>,
	{
		let path = paths::clean(path);
		let documents = yaml::decode_all(&path)?;
		for found in match_documents(&documents, &path, seed, self.config)? {
			emit(found)?;
		}
		Ok(())
	}

	/// Paths claimed by Kustomizations so far.
	pub fn claimed(&self) -> &HashSet<PathBuf> {
		&self.claimed
	}
}

fn is_kustomization(doc: &Value) -> bool {
	doc.probe_str(&["apiVersion"]).starts_with(KUSTOMIZE_API_GROUP)
		&& doc.probe_str(&["kind"]) == "Kustomization"
}

/// Collect every match under the configured roots.
pub fn discover(config: &Config) -> Result<Vec<Match>> {
	let mut matches = Vec::new();
	Discovery::new(config).run(|m| {
		matches.push(m);
		Ok(())
	})?;
	Ok(matches)
}
