use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::engine::Paths;
use crate::error::ConfigError;
use crate::model::job::Job;

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const SETTINGS_FILE: &str = "seir_weaver.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    pub model: String,
    pub metamodel_path: PathBuf,
    pub diagrams_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Idle time between jobs, to stay under the service's request quota.
    pub min_interval_secs: u64,

    pub jobs: Vec<Job>,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-pro".into(),
            metamodel_path: "metamodel.json".into(),
            diagrams_dir: "diagrams".into(),
            output_dir: ".".into(),
            min_interval_secs: 10,
            jobs: Job::builtin(),
        }
    }
}

impl WorkflowSettings {
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }

    /// Relative paths are resolved against `base`.
    pub fn paths(&self, base: &Path) -> Paths {
        Paths {
            metamodel: base.join(&self.metamodel_path),
            diagrams_dir: base.join(&self.diagrams_dir),
            output_dir: base.join(&self.output_dir),
        }
    }
}

/// Reads `<dir>/seir_weaver.json`, or the defaults when there is none.
pub fn load_settings(dir: &Path) -> Result<WorkflowSettings, ConfigError> {
    let path = dir.join(SETTINGS_FILE);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(WorkflowSettings::default())
        }
        Err(e) => {
            return Err(ConfigError::Settings {
                path,
                message: e.to_string(),
            })
        }
    };

    serde_json::from_str(&raw).map_err(|e| ConfigError::Settings {
        path,
        message: e.to_string(),
    })
}

/// Loads `<dir>/.env` into the process environment if it exists.
pub fn load_dotenv(dir: &Path) -> Result<(), ConfigError> {
    let path = dir.join(".env");
    if !path.exists() {
        return Ok(());
    }
    dotenvy::from_path(&path)
        .map(|_| ())
        .map_err(|source| ConfigError::Dotenv { path, source })
}

/// Looks up the API key; empty counts as unset.
pub fn require_api_key<F>(lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_KEY_VAR)
        .filter(|key| !key.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey(API_KEY_VAR))
}

/// Checks the key first; `make_client` only runs once it is known to be present.
pub fn connect<F, M, C>(lookup: F, make_client: M) -> Result<C, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    M: FnOnce(String) -> Result<C, ConfigError>,
{
    let key = require_api_key(lookup)?;
    make_client(key)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::model::job::Dataset;

    #[test]
    fn missing_key_never_builds_client() {
        let built = Cell::new(false);

        let result = connect(|_| None, |_key| {
            built.set(true);
            Ok(())
        });

        assert!(matches!(result, Err(ConfigError::MissingApiKey(API_KEY_VAR))));
        assert!(!built.get());
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let built = Cell::new(false);
        let result = connect(|_| Some("   ".into()), |_key| {
            built.set(true);
            Ok(())
        });
        assert!(result.is_err());
        assert!(!built.get());
    }

    #[test]
    fn present_key_is_passed_to_factory() {
        let client = connect(
            |name| (name == API_KEY_VAR).then(|| "abc".to_string()),
            |key| Ok(format!("client:{key}")),
        )
        .unwrap();
        assert_eq!(client, "client:abc");
    }

    #[test]
    fn missing_key_message_names_the_variable() {
        let err = require_api_key(|_| None).unwrap_err();
        assert_eq!(err.to_string(), "'GOOGLE_API_KEY' environment variable not set");
    }

    #[test]
    fn defaults_when_no_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings, WorkflowSettings::default());
        assert_eq!(settings.min_interval(), Duration::from_secs(10));
        assert_eq!(settings.jobs.len(), 3);
    }

    #[test]
    fn settings_file_overrides_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{
                "min_interval_secs": 2,
                "output_dir": "runs",
                "jobs": [
                    { "image": "a.png", "dataset": "hiv", "output": "a.txt" },
                    { "image": "b.png", "dataset": { "inline": "S -> I" }, "output": "b.txt" }
                ]
            }"#,
        )
        .unwrap();

        let settings = load_settings(dir.path()).unwrap();

        assert_eq!(settings.model, "gemini-2.5-pro");
        assert_eq!(settings.min_interval_secs, 2);
        assert_eq!(settings.jobs[0].dataset, Dataset::Hiv);
        assert_eq!(settings.jobs[1].dataset.text(), "S -> I");
        assert_eq!(settings.paths(dir.path()).output_dir, dir.path().join("runs"));
    }

    #[test]
    fn malformed_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "[").unwrap();
        assert!(matches!(
            load_settings(dir.path()),
            Err(ConfigError::Settings { .. })
        ));
    }

    #[test]
    fn dotenv_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dotenv(dir.path()).is_ok());
    }
}
