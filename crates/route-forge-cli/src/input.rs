use std::path::Path;

use route_forge_core::session::Answers;
use route_forge_core::types::Endpoint;
use route_forge_gateway::{NetworkMapping, NetworkMappings};
use serde::de::DeserializeOwned;

use crate::error::CliError;

/// Decode a YAML or JSON input file, chosen by extension.
///
/// Anything not ending in `.json` is read as YAML, which also accepts JSON.
pub fn read_input<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&contents).map_err(|e| CliError::json(path, &e))
    } else {
        serde_yaml::from_str(&contents).map_err(|e| CliError::yaml(path, &e))
    }
}

pub fn read_endpoints(path: &Path) -> Result<Vec<Endpoint>, CliError> {
    read_input(path)
}

pub fn read_network(path: &Path) -> Result<NetworkMappings, CliError> {
    let entries: Vec<NetworkMapping> = read_input(path)?;
    NetworkMappings::from_entries(entries).map_err(|e| CliError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
        line: None,
        column: None,
    })
}

/// Merge an answers file with `id=choice` flags; flags win.
pub fn collect_answers(file: Option<&Path>, flags: &[String]) -> Result<Answers, CliError> {
    let mut answers = match file {
        Some(path) => read_input::<Answers>(path)?,
        None => Answers::new(),
    };
    for flag in flags {
        let (id, choice) =
            Answers::parse_assignment(flag).map_err(|e| CliError::Usage(e.to_string()))?;
        answers.insert(id, choice);
    }
    Ok(answers)
}
