//! Lexical path helpers.

use std::{
	ffi::OsStr,
	path::{Component, Path, PathBuf},
};

use anyhow::Result;

/// Lexically clean a path: drop `.` components and fold `..` into the
/// preceding component where there is one. Never touches the filesystem.
pub fn clean(path: &Path) -> PathBuf {
	let mut out: Vec<Component> = Vec::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => match out.last() {
				Some(Component::Normal(_)) => {
					out.pop();
				}
				Some(Component::RootDir | Component::Prefix(_)) => {}
				_ => out.push(component),
			},
			other => out.push(other),
		}
	}

	if out.is_empty() {
		return PathBuf::from(".");
	}
	out.iter().map(|c| c.as_os_str()).collect()
}

/// Cleaned absolute form of `path`, resolved against the working directory.
pub fn absolute(path: &Path) -> Result<PathBuf> {
	if path.is_absolute() {
		return Ok(clean(path));
	}
	Ok(clean(&std::env::current_dir()?.join(path)))
}

/// Path of `target` as seen from the directory containing `output`, so a link
/// written into the output file resolves.
pub fn relative_to_output(target: &Path, output: &Path) -> Result<PathBuf> {
	let target = absolute(target)?;
	let output = absolute(output)?;
	let base = output.parent().unwrap_or(Path::new("/"));
	Ok(pathdiff::diff_paths(&target, base).unwrap_or(target))
}

/// Dot-prefixed file or directory name.
pub fn is_hidden_name(name: &OsStr) -> bool {
	name.to_str().is_some_and(|n| n.starts_with('.'))
}

pub fn is_yaml(path: &Path) -> bool {
	matches!(
		path.extension().and_then(OsStr::to_str),
		Some("yaml" | "yml")
	)
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("./apps/deploy.yaml", "apps/deploy.yaml")]
	#[case("apps/./base/../deploy.yaml", "apps/deploy.yaml")]
	#[case("../shared/app.yaml", "../shared/app.yaml")]
	#[case("/srv/../etc/app.yaml", "/etc/app.yaml")]
	#[case("/../app.yaml", "/app.yaml")]
	#[case(".", ".")]
	#[case("apps/..", ".")]
	fn test_clean(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(clean(Path::new(input)), PathBuf::from(expected));
	}

	#[test]
	fn test_relative_to_output_in_root() {
		let rel = relative_to_output(Path::new("apps/deploy.yaml"), Path::new("README.md")).unwrap();
		assert_eq!(rel, PathBuf::from("apps/deploy.yaml"));
	}

	#[test]
	fn test_relative_to_output_in_subdir() {
		let rel =
			relative_to_output(Path::new("./apps/deploy.yaml"), Path::new("docs/apps/README.md"))
				.unwrap();
		assert_eq!(rel, PathBuf::from("../../apps/deploy.yaml"));
	}

	#[rstest]
	#[case(".github", true)]
	#[case(".secret.yaml", true)]
	#[case("apps", false)]
	#[case("deploy.yaml", false)]
	fn test_is_hidden_name(#[case] name: &str, #[case] expected: bool) {
		assert_eq!(is_hidden_name(OsStr::new(name)), expected);
	}

	#[rstest]
	#[case("a.yaml", true)]
	#[case("a.yml", true)]
	#[case("a.json", false)]
	#[case("yaml", false)]
	fn test_is_yaml(#[case] path: &str, #[case] expected: bool) {
		assert_eq!(is_yaml(Path::new(path)), expected);
	}
}
