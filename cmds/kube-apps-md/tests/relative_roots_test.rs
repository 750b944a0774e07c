//! Discovery from roots given relative to the working directory.
//!
//! Changes the process working directory, so this file holds a single test.

use std::{env, fs, path::PathBuf};

use indoc::indoc;
use kube_apps_md::{
	aggregate::aggregate, config::Config, discover::discover, path_matcher::PathMatcher,
};

#[test]
fn test_relative_root_spellings_agree() {
	let temp = tempfile::TempDir::new().unwrap();
	let root = temp.path();
	fs::create_dir_all(root.join("base")).unwrap();
	fs::create_dir_all(root.join("overlay")).unwrap();
	fs::create_dir_all(root.join("apps")).unwrap();
	fs::write(
		root.join("base/app.yaml"),
		indoc! {"
			apiVersion: apps/v1
			kind: Deployment
			metadata:
			  name: app
			  namespace: default
		"},
	)
	.unwrap();
	fs::write(
		root.join("overlay/kustomization.yaml"),
		indoc! {"
			apiVersion: kustomize.config.k8s.io/v1beta1
			kind: Kustomization
			namespace: media
			resources:
			  - ../base/app.yaml
		"},
	)
	.unwrap();
	fs::write(
		root.join("apps/web.yaml"),
		indoc! {"
			apiVersion: apps/v1
			kind: Deployment
			metadata:
			  name: web-deployment
			  namespace: media
		"},
	)
	.unwrap();

	env::set_current_dir(root).unwrap();

	for dir in [".", "./", "base/..", "overlay/../"] {
		let config = Config {
			dirs: vec![PathBuf::from(dir)],
			// Anchored, so a leading "./" in the classifier input would miss
			path_matcher: Some(PathMatcher::new(r"^apps/(?P<name>[^/]+)\.yaml$").unwrap()),
			..Config::default()
		};

		let matches = discover(&config).unwrap();
		assert_eq!(matches.len(), 2, "{dir}: {matches:?}");

		let clusters = aggregate(matches, &config);
		assert_eq!(clusters.keys().collect::<Vec<_>>(), vec![""], "{dir}");
		let namespaces = &clusters[""].namespaces;
		assert_eq!(namespaces.keys().collect::<Vec<_>>(), vec!["media"], "{dir}");

		let media = &namespaces["media"];
		assert_eq!(
			media.services.keys().collect::<Vec<_>>(),
			vec!["app", "web"],
			"{dir}"
		);
		assert_eq!(media.services["app"].path, "base/app.yaml", "{dir}");
		assert_eq!(media.services["web"].path, "apps/web.yaml", "{dir}");
	}
}
