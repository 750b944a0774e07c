//! Cluster/namespace/name overrides taken from a file's path.
//!
//! Users describe their repository layout with a regular expression such as
//! `clusters/(?P<cluster>[^/]+)/(?P<namespace>[^/]+)/` and the named groups
//! `cluster`, `namespace` and `name` override what the manifest itself says.

use std::fmt;

use regex::Regex;

/// Values captured from a path. An empty string means "not captured".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOverrides {
	pub cluster: String,
	pub namespace: String,
	pub name: String,
}

/// Compiled `--paths-re` expression.
#[derive(Clone)]
pub struct PathMatcher {
	re: Regex,
}

impl PathMatcher {
	pub fn new(pattern: &str) -> Result<Self, regex::Error> {
		Ok(Self {
			re: Regex::new(pattern)?,
		})
	}

	/// Apply the expression to `path`, collecting every recognised named group
	/// that took part in the match. Unknown group names are ignored.
	pub fn classify(&self, path: &str) -> PathOverrides {
		let mut overrides = PathOverrides::default();
		let Some(captures) = self.re.captures(path) else {
			return overrides;
		};

		for group in self.re.capture_names().flatten() {
			let Some(value) = captures.name(group) else {
				continue;
			};
			let field = match group {
				"cluster" => &mut overrides.cluster,
				"namespace" => &mut overrides.namespace,
				"name" => &mut overrides.name,
				_ => continue,
			};
			*field = value.as_str().to_string();
		}

		overrides
	}

	pub fn as_str(&self) -> &str {
		self.re.as_str()
	}
}

impl fmt::Debug for PathMatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("PathMatcher").field(&self.as_str()).finish()
	}
}

/// Run the optional matcher; no matcher means no overrides.
pub fn classify(matcher: Option<&PathMatcher>, path: &str) -> PathOverrides {
	matcher
		.map(|m| m.classify(path))
		.unwrap_or_default()
}
