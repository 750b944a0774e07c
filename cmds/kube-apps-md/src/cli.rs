//! Command line surface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use crate::{
	config::{
		Config, DEFAULT_DIR, DEFAULT_END_TAG, DEFAULT_EXCLUDED_SERVICES, DEFAULT_OUTPUT,
		DEFAULT_START_TAG, DEFAULT_SUPPORTING_SERVICES,
	},
	path_matcher::PathMatcher,
};

#[derive(Parser, Debug)]
#[command(name = "kube-apps-md")]
#[command(about = "Template a table of Kubernetes apps into a markdown file", long_about = None)]
#[command(version = env!("KUBE_APPS_MD_VERSION"))]
pub struct Cli {
	/// Output filename
	#[arg(long, env = "KUBE_APPS_MD_OUTPUT", default_value = DEFAULT_OUTPUT)]
	pub output: PathBuf,

	/// Comma-separated list of directories to template
	#[arg(
		long,
		env = "KUBE_APPS_MD_DIRS",
		value_delimiter = ',',
		default_value = DEFAULT_DIR
	)]
	pub dirs: Vec<PathBuf>,

	/// Regexp to override certain values. Valid capture groups: cluster, namespace, name
	#[arg(long, env = "KUBE_APPS_MD_PATHS_RE")]
	pub paths_re: Option<String>,

	/// Markdown tag that begins replacement
	#[arg(long, env = "KUBE_APPS_MD_START_TAG", default_value = DEFAULT_START_TAG)]
	pub start_tag: String,

	/// Markdown tag that ends replacement
	#[arg(long, env = "KUBE_APPS_MD_END_TAG", default_value = DEFAULT_END_TAG)]
	pub end_tag: String,

	/// Comma-separated list of supporting service names
	#[arg(
		long,
		env = "KUBE_APPS_MD_SUPPORTING_SERVICES",
		value_delimiter = ',',
		default_values_t = DEFAULT_SUPPORTING_SERVICES.map(String::from)
	)]
	pub supporting_services: Vec<String>,

	/// Comma-separated list of service names to exclude
	#[arg(
		long,
		env = "KUBE_APPS_MD_EXCLUDED_SERVICES",
		value_delimiter = ',',
		default_values_t = DEFAULT_EXCLUDED_SERVICES.map(String::from)
	)]
	pub excluded_services: Vec<String>,

	/// Excludes hidden files
	#[arg(long, env = "KUBE_APPS_MD_EXCLUDE_HIDDEN")]
	pub exclude_hidden: bool,

	/// Log level (trace, debug, info, warn, error). Defaults to RUST_LOG, then info
	#[arg(long, env = "KUBE_APPS_MD_LOG_LEVEL")]
	pub log_level: Option<Level>,
}

impl Cli {
	/// Validate the arguments and build the run configuration.
	pub fn into_config(self) -> Result<Config> {
		let path_matcher = self
			.paths_re
			.as_deref()
			.filter(|re| !re.is_empty())
			.map(PathMatcher::new)
			.transpose()
			.context("invalid --paths-re expression")?;

		Ok(Config {
			output: self.output,
			dirs: self.dirs,
			start_tag: self.start_tag,
			end_tag: self.end_tag,
			supporting_services: self.supporting_services,
			excluded_services: self.excluded_services,
			path_matcher,
			exclude_hidden: self.exclude_hidden,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Cli {
		Cli::try_parse_from(std::iter::once("kube-apps-md").chain(args.iter().copied())).unwrap()
	}

	#[test]
	fn test_defaults_match_config() {
		let config = parse(&[]).into_config().unwrap();
		let defaults = Config::default();

		assert_eq!(config.output, defaults.output);
		assert_eq!(config.dirs, defaults.dirs);
		assert_eq!(config.start_tag, defaults.start_tag);
		assert_eq!(config.end_tag, defaults.end_tag);
		assert_eq!(config.supporting_services, defaults.supporting_services);
		assert_eq!(config.excluded_services, defaults.excluded_services);
		assert!(config.path_matcher.is_none());
		assert!(!config.exclude_hidden);
	}

	#[test]
	fn test_lists_split_on_commas() {
		let config = parse(&[
			"--dirs",
			"clusters,apps",
			"--supporting-services",
			"redis,valkey",
			"--excluded-services",
			"helm-controller",
			"--exclude-hidden",
		])
		.into_config()
		.unwrap();

		assert_eq!(config.dirs, vec![PathBuf::from("clusters"), PathBuf::from("apps")]);
		assert_eq!(config.supporting_services, vec!["redis", "valkey"]);
		assert_eq!(config.excluded_services, vec!["helm-controller"]);
		assert!(config.exclude_hidden);
	}

	#[test]
	fn test_paths_re_compiled() {
		let config = parse(&["--paths-re", r"clusters/(?P<cluster>[^/]+)/"])
			.into_config()
			.unwrap();
		assert!(config.path_matcher.is_some());
	}

	#[test]
	fn test_invalid_paths_re() {
		let err = parse(&["--paths-re", "(?P<cluster>["]).into_config().unwrap_err();
		assert!(format!("{err}").contains("--paths-re"), "{err}");
	}

	#[test]
	fn test_log_level() {
		assert_eq!(parse(&["--log-level", "debug"]).log_level, Some(Level::DEBUG));
		assert!(Cli::try_parse_from(["kube-apps-md", "--log-level", "loud"]).is_err());
	}
}
