//! Fold a stream of matches into clusters and namespaces.

use std::collections::BTreeMap;

use crate::{config::Config, matcher::Match};

/// Apps of one cluster, keyed by cluster name ("" when unknown).
pub type Clusters = BTreeMap<String, Cluster>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
	pub name: String,
	pub namespaces: BTreeMap<String, Namespace>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
	pub name: String,
	pub services: BTreeMap<String, Match>,
	pub supporting: BTreeMap<String, Match>,
}

impl Namespace {
	pub fn len(&self) -> usize {
		self.services.len() + self.supporting.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Consume `matches` until exhausted. A later match with the same name in the
/// same cluster and namespace replaces the earlier one.
pub fn aggregate(matches: impl IntoIterator<Item = Match>, config: &Config) -> Clusters {
	let mut clusters = Clusters::new();

	for found in matches {
		let cluster = clusters
			.entry(found.cluster.clone())
			.or_insert_with(|| Cluster {
				name: found.cluster.clone(),
				..Default::default()
			});
		let namespace = cluster
			.namespaces
			.entry(found.namespace.clone())
			.or_insert_with(|| Namespace {
				name: found.namespace.clone(),
				..Default::default()
			});

		let bucket = if config.is_supporting(&found.name) {
			&mut namespace.supporting
		} else {
			&mut namespace.services
		};
		bucket.insert(found.name.clone(), found);
	}

	clusters
}
