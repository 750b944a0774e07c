//! YAML decoding helpers for manifest files.
//!
//! Manifests are decoded into untyped [`serde_yaml::Value`] documents and then
//! inspected through [`Probe`], which treats a missing or wrong-typed field as
//! empty instead of failing. Only a file that is not valid YAML is an error.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::trace;

/// Decode every document of a (possibly multi-document) YAML file.
pub fn decode_all(path: &Path) -> Result<Vec<Value>> {
	let content =
		fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
	decode_str(&content).with_context(|| format!("unmarshal failed for {}", path.display()))
}

/// Decode every document of a YAML stream held in memory.
pub fn decode_str(content: &str) -> Result<Vec<Value>> {
	let mut documents = Vec::new();
	for doc in serde_yaml::Deserializer::from_str(content) {
		documents.push(Value::deserialize(doc)?);
	}
	trace!(count = documents.len(), "Decoded YAML documents");
	Ok(documents)
}

/// Shape-checking accessors over decoded YAML.
pub trait Probe {
	/// Follow a chain of mapping keys, returning `None` as soon as a step is
	/// missing or is not a mapping.
	fn probe(&self, keys: &[&str]) -> Option<&Value>;

	/// Like [`Probe::probe`], but the value must be a string. Anything else
	/// reads as the empty string.
	fn probe_str(&self, keys: &[&str]) -> &str {
		self.probe(keys).and_then(Value::as_str).unwrap_or_default()
	}

	/// The string items of a sequence. Non-string items are dropped and a
	/// missing or non-sequence value yields nothing.
	fn probe_strings(&self, keys: &[&str]) -> Vec<&str> {
		self.probe(keys)
			.and_then(Value::as_sequence)
			.map(|items| items.iter().filter_map(Value::as_str).collect())
			.unwrap_or_default()
	}
}

impl Probe for Value {
	fn probe(&self, keys: &[&str]) -> Option<&Value> {
		keys.iter().try_fold(self, |value, key| match value {
			Value::Mapping(mapping) => mapping.get(*key),
			_ => None,
		})
	}
}

#[cfg(test)]
mod tests {
	use indoc::indoc;

	use super::*;

	#[test]
	fn test_decode_multiple_documents() {
		let docs = decode_str(indoc! {"
			kind: Deployment
			---
			kind: Service
			---
		"})
		.unwrap();

		assert!(docs.len() >= 2);
		assert_eq!(docs[0].probe_str(&["kind"]), "Deployment");
		assert_eq!(docs[1].probe_str(&["kind"]), "Service");
	}

	#[test]
	fn test_decode_invalid_yaml() {
		assert!(decode_str("kind: [unterminated").is_err());
	}

	#[test]
	fn test_decode_file_error_mentions_path() {
		let temp = tempfile::TempDir::new().unwrap();
		let path = temp.path().join("broken.yaml");
		fs::write(&path, "metadata: {name: [}").unwrap();

		let err = decode_all(&path).unwrap_err();
		assert!(format!("{err}").contains("broken.yaml"), "{err}");
	}

	#[test]
	fn test_probe_degrades_to_empty() {
		let doc = &decode_str(indoc! {"
			apiVersion: apps/v1
			metadata:
			  name: 42
			  labels: [a, b]
			spec: plain
		"})
		.unwrap()[0];

		assert_eq!(doc.probe_str(&["apiVersion"]), "apps/v1");
		assert_eq!(doc.probe_str(&["metadata", "name"]), "");
		assert_eq!(doc.probe_str(&["metadata", "namespace"]), "");
		assert_eq!(doc.probe_str(&["spec", "url"]), "");
		assert!(doc.probe(&["metadata", "labels"]).is_some());
	}

	#[test]
	fn test_probe_strings_skips_non_strings() {
		let doc = &decode_str(indoc! {"
			resources:
			  - deploy.yaml
			  - {path: nested}
			  - service.yaml
		"})
		.unwrap()[0];

		assert_eq!(
			doc.probe_strings(&["resources"]),
			vec!["deploy.yaml", "service.yaml"]
		);
		assert!(doc.probe_strings(&["missing"]).is_empty());
	}
}
