//! Render the apps table and splice it into the output file.
//!
//! The table is an HTML fragment produced from a Go text/template (via
//! `gtmpl`). It replaces whatever sits between the start and end tags of the
//! output file; every byte outside the tags is kept as is.

use std::{
	collections::HashMap,
	fs, io,
	path::{Path, PathBuf},
};

use gtmpl::{Context, FuncError, Template, TemplateError, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
	aggregate::{Cluster, Clusters},
	config::Config,
	matcher::Match,
};

const APPS_TEMPLATE: &str = include_str!("templates/apps.html.tmpl");

#[derive(Debug, Error)]
pub enum RenderError {
	#[error("no start tag {tag:?} in {}", path.display())]
	NoStartTag { tag: String, path: PathBuf },

	#[error("no end tag {tag:?} in {}", path.display())]
	NoEndTag { tag: String, path: PathBuf },

	#[error("rendering apps template")]
	Template(#[from] TemplateError),

	#[error("{action} {}", path.display())]
	Io {
		action: &'static str,
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

/// Template function: ` rowspan="N"` for cells spanning several rows.
fn rowspan(args: &[Value]) -> Result<Value, FuncError> {
	let rows = match args.first() {
		Some(Value::Number(n)) => n.as_u64().unwrap_or(1),
		_ => 1,
	};
	if rows <= 1 {
		return Ok(Value::String(String::new()));
	}
	Ok(Value::String(format!(r#" rowspan="{rows}""#)))
}

fn escape_html(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&#34;"),
			'\'' => out.push_str("&#39;"),
			c => out.push(c),
		}
	}
	out
}

fn string(s: &str) -> Value {
	Value::String(escape_html(s))
}

fn links<'a>(matches: impl Iterator<Item = &'a Match>) -> Value {
	let links = matches
		.enumerate()
		.map(|(i, m)| {
			Value::Map(HashMap::from([
				("First".to_string(), Value::Bool(i == 0)),
				("Name".to_string(), string(&m.name)),
				("Path".to_string(), string(&m.path)),
				("Kind".to_string(), string(&m.kind)),
			]))
		})
		.collect();
	Value::Array(links)
}

fn cluster_rows(cluster: &Cluster, clustered: bool) -> impl Iterator<Item = Value> + '_ {
	let span = cluster.namespaces.len() as i64;
	cluster
		.namespaces
		.values()
		.enumerate()
		.map(move |(i, namespace)| {
			Value::Map(HashMap::from([
				("ClusterCell".to_string(), Value::Bool(clustered && i == 0)),
				("Cluster".to_string(), string(&cluster.name)),
				("ClusterRows".to_string(), Value::Number(span.into())),
				("Namespace".to_string(), string(&namespace.name)),
				("Services".to_string(), links(namespace.services.values())),
				("Supporting".to_string(), links(namespace.supporting.values())),
			]))
		})
}

/// Build the template context: one row per namespace, in name order.
fn context(clusters: &Clusters) -> Context {
	let clustered = clusters.keys().any(|name| !name.is_empty());
	let rows = clusters
		.values()
		.flat_map(|cluster| cluster_rows(cluster, clustered))
		.collect();

	Context::from(Value::Map(HashMap::from([
		("Clustered".to_string(), Value::Bool(clustered)),
		("Rows".to_string(), Value::Array(rows)),
	])))
}

/// Render the apps table fragment.
#[instrument(skip_all)]
pub fn render_table(clusters: &Clusters) -> Result<String, RenderError> {
	let mut tmpl = Template::default();
	tmpl.add_func("rowspan", rowspan);
	tmpl.parse(APPS_TEMPLATE).map_err(TemplateError::from)?;
	Ok(tmpl
		.render(&context(clusters))
		.map_err(TemplateError::from)?)
}

/// Replace the bytes between the end of `start_tag` and the following
/// `end_tag` with a newline and `fragment`.
pub fn splice(
	src: &[u8],
	start_tag: &str,
	end_tag: &str,
	fragment: &str,
	path: &Path,
) -> Result<Vec<u8>, RenderError> {
	let start = find(src, start_tag.as_bytes()).ok_or_else(|| RenderError::NoStartTag {
		tag: start_tag.to_string(),
		path: path.to_path_buf(),
	})?;
	let content_start = start + start_tag.len();
	let end = find(&src[content_start..], end_tag.as_bytes())
		.map(|offset| content_start + offset)
		.ok_or_else(|| RenderError::NoEndTag {
			tag: end_tag.to_string(),
			path: path.to_path_buf(),
		})?;

	let mut out = Vec::with_capacity(src.len() + fragment.len());
	out.extend_from_slice(&src[..content_start]);
	out.push(b'\n');
	out.extend_from_slice(fragment.as_bytes());
	out.extend_from_slice(&src[end..]);
	Ok(out)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	if needle.is_empty() {
		return Some(0);
	}
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}

/// Render `clusters` into the tagged section of the configured output file.
/// The file is left untouched when either tag is missing.
pub fn update_output(config: &Config, clusters: &Clusters) -> Result<(), RenderError> {
	let path = &config.output;
	let src = fs::read(path).map_err(|source| RenderError::Io {
		action: "failed to read",
		path: path.clone(),
		source,
	})?;

	let fragment = render_table(clusters)?;
	let out = splice(&src, &config.start_tag, &config.end_tag, &fragment, path)?;
	if out == src {
		debug!("{} is up to date", path.display());
		return Ok(());
	}

	fs::write(path, out).map_err(|source| RenderError::Io {
		action: "failed to write",
		path: path.clone(),
		source,
	})?;
	debug!("Updated {}", path.display());
	Ok(())
}
