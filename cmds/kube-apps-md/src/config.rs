//! Run configuration.
//!
//! Built once from the command line (see [`crate::cli`]) and passed by
//! reference to every stage of the pipeline.

use std::path::PathBuf;

use crate::path_matcher::PathMatcher;

pub const DEFAULT_OUTPUT: &str = "README.md";
pub const DEFAULT_DIR: &str = ".";
pub const DEFAULT_START_TAG: &str = "<!-- Begin apps section -->";
pub const DEFAULT_END_TAG: &str = "<!-- End apps section -->";

/// Backing services listed apart from the apps that use them
pub const DEFAULT_SUPPORTING_SERVICES: [&str; 4] = ["postgresql", "redis", "mariadb", "mongodb"];

/// Flux controllers are not apps
pub const DEFAULT_EXCLUDED_SERVICES: [&str; 4] = [
	"helm-controller",
	"kustomize-controller",
	"notification-controller",
	"source-controller",
];

#[derive(Debug, Clone)]
pub struct Config {
	/// Markdown file holding the tagged apps section
	pub output: PathBuf,
	/// Roots to search for manifests
	pub dirs: Vec<PathBuf>,
	pub start_tag: String,
	pub end_tag: String,
	pub supporting_services: Vec<String>,
	pub excluded_services: Vec<String>,
	/// Overrides cluster/namespace/name from the manifest path
	pub path_matcher: Option<PathMatcher>,
	/// Skip files and directories whose name starts with a dot
	pub exclude_hidden: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			output: PathBuf::from(DEFAULT_OUTPUT),
			dirs: vec![PathBuf::from(DEFAULT_DIR)],
			start_tag: DEFAULT_START_TAG.to_string(),
			end_tag: DEFAULT_END_TAG.to_string(),
			supporting_services: DEFAULT_SUPPORTING_SERVICES.map(String::from).to_vec(),
			excluded_services: DEFAULT_EXCLUDED_SERVICES.map(String::from).to_vec(),
			path_matcher: None,
			exclude_hidden: false,
		}
	}
}

impl Config {
	pub fn is_supporting(&self, name: &str) -> bool {
		self.supporting_services.iter().any(|s| s == name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = Config::default();
		assert_eq!(config.output, PathBuf::from("README.md"));
		assert_eq!(config.dirs, vec![PathBuf::from(".")]);
		assert_eq!(config.start_tag, "<!-- Begin apps section -->");
		assert_eq!(config.end_tag, "<!-- End apps section -->");
		assert!(config.path_matcher.is_none());
		assert!(!config.exclude_hidden);
		assert!(config.excluded_services.contains(&"helm-controller".to_string()));
	}

	#[test]
	fn test_is_supporting_is_case_sensitive() {
		let config = Config::default();
		assert!(config.is_supporting("redis"));
		assert!(!config.is_supporting("Redis"));
		assert!(!config.is_supporting("redis-ha"));
	}
}
