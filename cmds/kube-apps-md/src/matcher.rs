//! Resource matcher - decide which manifests describe an app.
//!
//! A manifest counts when its `apiVersion`/`kind` pair is one of [`RULES`] and
//! its name is not excluded. Each accepted document becomes a [`Match`] whose
//! cluster, namespace and name are resolved in priority order:
//!
//! 1. the value seeded by the caller (Kustomization context),
//! 2. a capture from the `--paths-re` expression,
//! 3. the manifest's own metadata.

use std::path::Path;

use anyhow::Result;
use serde_yaml::Value;
use tracing::{debug, trace};

use crate::{
	config::Config,
	path_matcher,
	paths,
	yaml::Probe,
};

/// A manifest recognised as an app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
	pub kind: String,
	/// Link target: a path relative to the output file, or a repository URL
	pub path: String,
	pub name: String,
	pub cluster: String,
	pub namespace: String,
}

impl Match {
	/// Seed carrying only context fields, used for Kustomization resources.
	pub fn seed(cluster: String, namespace: String, name: String) -> Self {
		Self {
			cluster,
			namespace,
			name,
			..Default::default()
		}
	}
}

enum ApiVersion {
	Exact(&'static str),
	Prefix(&'static str),
}

impl ApiVersion {
	fn matches(&self, api_version: &str) -> bool {
		match self {
			Self::Exact(expected) => api_version == *expected,
			Self::Prefix(prefix) => api_version.starts_with(*prefix),
		}
	}
}

/// A tracked `apiVersion`/`kind` pair.
pub struct Rule {
	api_version: ApiVersion,
	kind: &'static str,
}

const GIT_REPOSITORY: &str = "GitRepository";

/// Flux's own source repository is infrastructure, not an app
const FLUX_SYSTEM: &str = "flux-system";

/// Tracked kinds, checked in order.
pub const RULES: &[Rule] = &[
	Rule {
		api_version: ApiVersion::Exact("apps/v1"),
		kind: "Deployment",
	},
	Rule {
		api_version: ApiVersion::Exact("apps/v1"),
		kind: "StatefulSet",
	},
	Rule {
		api_version: ApiVersion::Exact("apps/v1"),
		kind: "DaemonSet",
	},
	Rule {
		api_version: ApiVersion::Exact("batch/v1"),
		kind: "CronJob",
	},
	Rule {
		api_version: ApiVersion::Prefix("helm.toolkit.fluxcd.io"),
		kind: "HelmRelease",
	},
	Rule {
		api_version: ApiVersion::Prefix("source.toolkit.fluxcd.io"),
		kind: GIT_REPOSITORY,
	},
	Rule {
		api_version: ApiVersion::Exact("postgresql.cnpg.io/v1"),
		kind: "Cluster",
	},
];

/// Whether a document with these identity fields is tracked.
pub fn is_tracked(api_version: &str, kind: &str, name: &str) -> bool {
	RULES.iter().any(|rule| {
		rule.kind == kind
			&& rule.api_version.matches(api_version)
			&& !(kind == GIT_REPOSITORY && name == FLUX_SYSTEM)
	})
}

/// Turn a GitRepository URL into a browsable link.
pub fn repository_link(url: &str) -> String {
	let url = url.strip_suffix(".git").unwrap_or(url);
	match url.strip_prefix("ssh://git@") {
		Some(rest) => format!("https://{rest}"),
		None => url.to_string(),
	}
}

fn first_non_empty<'a>(candidates: impl IntoIterator<Item = &'a str>) -> String {
	candidates
		.into_iter()
		.find(|s| !s.is_empty())
		.unwrap_or_default()
		.to_string()
}

/// Match every document decoded from the file at `path`.
///
/// `seed` carries context already known for the file (empty fields mean
/// unknown). Documents that are not mappings, are excluded, or are of an
/// untracked kind produce nothing.
pub fn match_documents(
	documents: &[Value],
	path: &Path,
	seed: &Match,
	config: &Config,
) -> Result<Vec<Match>> {
	let display_path = path.to_string_lossy();
	let overrides = path_matcher::classify(config.path_matcher.as_ref(), &display_path);
	let mut matches = Vec::new();

	for doc in documents {
		if !doc.is_mapping() {
			continue;
		}

		let api_version = doc.probe_str(&["apiVersion"]);
		let kind = doc.probe_str(&["kind"]);
		let name = doc.probe_str(&["metadata", "name"]);
		let namespace = doc.probe_str(&["metadata", "namespace"]);

		if config.excluded_services.iter().any(|s| s == name) {
			trace!(service = name, path = %display_path, "Skipping excluded service");
			continue;
		}
		if !is_tracked(api_version, kind, name) {
			continue;
		}

		let link = if kind == GIT_REPOSITORY {
			let Some(url) = doc.probe(&["spec", "url"]).and_then(Value::as_str) else {
				debug!(service = name, path = %display_path, "GitRepository without spec.url");
				continue;
			};
			repository_link(url)
		} else {
			paths::relative_to_output(path, &config.output)?
				.to_string_lossy()
				.into_owned()
		};

		let found = Match {
			kind: kind.to_string(),
			path: link,
			name: first_non_empty([seed.name.as_str(), overrides.name.as_str(), name]),
			cluster: first_non_empty([seed.cluster.as_str(), overrides.cluster.as_str()]),
			namespace: first_non_empty([
				seed.namespace.as_str(),
				overrides.namespace.as_str(),
				namespace,
			]),
		};
		debug!(
			kind = %found.kind,
			name = %found.name,
			cluster = %found.cluster,
			namespace = %found.namespace,
			"Matched resource"
		);
		matches.push(found);
	}

	Ok(matches)
}
