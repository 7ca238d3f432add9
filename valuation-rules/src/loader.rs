use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use crate::error::RuleError;
use crate::rule::{Ruleset, ValidationLimits};
use crate::snapshot::RulesetSnapshot;

/// Loads rulesets from a file or a directory of `.json`/`.yaml`/`.yml` files.
///
/// Directory entries are read in file-name order so the resulting list is
/// stable across platforms.
pub fn load_rulesets(path: impl AsRef<Path>) -> Result<Vec<Ruleset>, RuleError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RuleError::MissingPath(path.display().to_string()));
    }

    if path.is_dir() {
        load_from_directory(path)
    } else {
        load_from_file(path)
    }
}

/// Loads and validates rulesets into a shareable snapshot.
pub fn load_snapshot(
    path: impl AsRef<Path>,
    limits: &ValidationLimits,
) -> Result<RulesetSnapshot, RuleError> {
    let rulesets = load_rulesets(path)?;
    RulesetSnapshot::new(rulesets, limits)
}

fn load_from_directory(path: &Path) -> Result<Vec<Ruleset>, RuleError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(path).map_err(|err| RuleError::from_io(path, err))? {
        let entry = entry.map_err(|err| RuleError::from_io(path, err))?;
        let file_type = entry
            .file_type()
            .map_err(|err| RuleError::from_io(entry.path(), err))?;
        if file_type.is_dir() {
            continue;
        }

        let candidate = entry.path();
        if let Some(ext) = candidate.extension().and_then(|value| value.to_str()) {
            if matches!(ext, "json" | "yaml" | "yml") {
                files.push(candidate);
            }
        }
    }
    files.sort();

    let mut rulesets = Vec::new();
    for file in files {
        let mut file_rulesets = load_from_file(&file)?;
        rulesets.append(&mut file_rulesets);
    }
    Ok(rulesets)
}

fn load_from_file(path: &Path) -> Result<Vec<Ruleset>, RuleError> {
    let raw = fs::read_to_string(path).map_err(|err| RuleError::from_io(path, err))?;
    let rulesets = parse_rulesets(&raw, path)?;
    debug!(path = %path.display(), count = rulesets.len(), "loaded rulesets");
    Ok(rulesets)
}

/// Parses a rules document; YAML is a superset of JSON so one parser serves both.
///
/// Accepted shapes are a mapping with a `rulesets` list, a bare list, or a
/// single ruleset mapping. The shape is picked before typed decoding so a
/// field-level error such as a missing `unit_field` reaches the author.
pub fn parse_rulesets(raw: &str, path: &Path) -> Result<Vec<Ruleset>, RuleError> {
    let parse_error = |err: serde_yaml::Error| RuleError::parse_error(path, err.to_string());
    let document: Value = serde_yaml::from_str(raw).map_err(parse_error)?;

    match document {
        Value::Mapping(mut mapping) => match mapping.remove("rulesets") {
            Some(list) => serde_yaml::from_value(list).map_err(parse_error),
            None => serde_yaml::from_value(Value::Mapping(mapping))
                .map(|ruleset| vec![ruleset])
                .map_err(parse_error),
        },
        list @ Value::Sequence(_) => serde_yaml::from_value(list).map_err(parse_error),
        other => Err(RuleError::parse_error(
            path,
            format!("expected a ruleset, a list of rulesets or a `rulesets` key, found {other:?}"),
        )),
    }
}
