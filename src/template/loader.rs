//! Template document loading.
//!
//! Templates are YAML documents parsed into a value tree. A mapping of the
//! single form `{include: <path>}` is replaced by the parsed content of the
//! referenced file, resolved relative to the including file; the include's
//! extension selects the parser: `.yaml`/`.yml` as YAML, `.json` as JSON,
//! anything else as a raw text scalar. Include chains form a DAG; a chain
//! that revisits an in-progress file fails fast.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_yaml::{Mapping, Value};

/// Load a template document, resolving every include directive.
pub fn load(path: &Path) -> Result<Value> {
    let mut in_progress = Vec::new();
    load_file(path, &mut in_progress)
}

fn load_file(path: &Path, in_progress: &mut Vec<PathBuf>) -> Result<Value> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("cannot resolve template file {}", path.display()))?;
    if in_progress.contains(&canonical) {
        bail!("include cycle detected at {}", path.display());
    }
    in_progress.push(canonical);

    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read template file {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let value = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&text)
            .with_context(|| format!("malformed YAML in {}", path.display()))?,
        "json" => {
            let json: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("malformed JSON in {}", path.display()))?;
            serde_yaml::to_value(json)?
        }
        _ => Value::String(text),
    };

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let resolved = resolve_includes(value, base, in_progress)?;
    in_progress.pop();
    Ok(resolved)
}

fn resolve_includes(value: Value, base: &Path, in_progress: &mut Vec<PathBuf>) -> Result<Value> {
    match value {
        Value::Mapping(map) => {
            if let Some(target) = include_target(&map) {
                return load_file(&base.join(target), in_progress);
            }
            let mut resolved = Mapping::with_capacity(map.len());
            for (key, child) in map {
                resolved.insert(key, resolve_includes(child, base, in_progress)?);
            }
            Ok(Value::Mapping(resolved))
        }
        Value::Sequence(items) => Ok(Value::Sequence(
            items
                .into_iter()
                .map(|item| resolve_includes(item, base, in_progress))
                .collect::<Result<_>>()?,
        )),
        other => Ok(other),
    }
}

/// A mapping is an include directive only when `include` is its sole key.
fn include_target(map: &Mapping) -> Option<String> {
    if map.len() != 1 {
        return None;
    }
    let key = Value::String("include".to_string());
    map.get(&key)?.as_str().map(str::to_string)
}
