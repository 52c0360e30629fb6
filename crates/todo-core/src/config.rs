use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_DATA_FILE: &str = "todos.json";
pub const PROJECT_CONFIG_NAMES: [&str; 2] = [".todo.toml", ".todorc"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write config {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoConfig {
    /// Path of the JSON data file. Relative paths resolve against the directory
    /// holding the config file.
    pub data_file: Option<String>,
    /// Default list format: "table", "json" or "csv".
    pub default_format: Option<String>,
}

/// A parsed config file plus where it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub path: PathBuf,
    pub config: TodoConfig,
}

impl ConfigLayer {
    fn data_file(&self) -> Option<PathBuf> {
        let file = self.config.data_file.as_deref()?.trim();
        if file.is_empty() {
            return None;
        }
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        Some(base.join(file))
    }
}

/// Where the data file path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFileSource {
    Flag,
    Env,
    Project,
    Global,
    Default,
}

impl DataFileSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DataFileSource::Flag => "flag",
            DataFileSource::Env => "env",
            DataFileSource::Project => "project",
            DataFileSource::Global => "global",
            DataFileSource::Default => "default",
        }
    }
}

/// `$TODO_HOME`, else `.todo` under the user's home directory.
pub fn todo_home_dir() -> Option<PathBuf> {
    ["TODO_HOME", "HOME", "USERPROFILE"]
        .into_iter()
        .find_map(|var| {
            let value = std::env::var(var).ok()?;
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            let dir = PathBuf::from(value);
            Some(if var == "TODO_HOME" { dir } else { dir.join(".todo") })
        })
}

pub fn global_config_path() -> Option<PathBuf> {
    todo_home_dir().map(|home| home.join("config.toml"))
}

/// Nearest project config file at or above `start`.
pub fn discover_project_config(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    start.ancestors().find_map(|dir| {
        PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

pub fn read_config(path: &Path) -> Result<TodoConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `.todo.toml` into `dir`, creating the directory if needed.
pub fn write_project_config(dir: &Path, config: &TodoConfig) -> Result<PathBuf, ConfigError> {
    let path = dir.join(PROJECT_CONFIG_NAMES[0]);
    let body = toml::to_string_pretty(config)?;
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, body))
        .map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Reads one config file. Malformed files are skipped with a warning so a broken
/// config never blocks the CLI; unreadable files are still errors.
pub fn load_layer(path: Option<PathBuf>) -> Result<Option<ConfigLayer>, ConfigError> {
    let Some(path) = path.filter(|path| path.is_file()) else {
        return Ok(None);
    };
    match read_config(&path) {
        Ok(config) => Ok(Some(ConfigLayer { path, config })),
        Err(ConfigError::Parse { path, source }) => {
            warn!(path = %path.display(), error = %source, "ignoring malformed config file");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Settings after layering flag, env, project and global sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub data_file: PathBuf,
    pub source: DataFileSource,
    pub default_format: Option<String>,
}

/// Resolves the data file in priority order: explicit flag, `env_file` (the value of
/// `TODO_FILE`), project config found from `cwd` upward, global config, then
/// `todos.json` in `cwd`.
pub fn resolve_settings(
    cwd: &Path,
    flag_file: Option<&Path>,
    env_file: Option<&str>,
) -> Result<ResolvedSettings, ConfigError> {
    let project = load_layer(discover_project_config(cwd))?;
    let global = load_layer(global_config_path())?;
    let layers = [
        project.as_ref().map(|layer| (layer, DataFileSource::Project)),
        global.as_ref().map(|layer| (layer, DataFileSource::Global)),
    ];

    let default_format = layers
        .iter()
        .flatten()
        .find_map(|(layer, _)| layer.config.default_format.clone());

    let env_file = env_file.map(str::trim).filter(|path| !path.is_empty());
    let (data_file, source) = match (flag_file, env_file) {
        (Some(path), _) => (cwd.join(path), DataFileSource::Flag),
        (None, Some(path)) => (cwd.join(path), DataFileSource::Env),
        (None, None) => layers
            .iter()
            .flatten()
            .find_map(|(layer, source)| layer.data_file().map(|file| (file, *source)))
            .unwrap_or_else(|| (cwd.join(DEFAULT_DATA_FILE), DataFileSource::Default)),
    };

    debug!(
        path = %data_file.display(),
        source = source.as_str(),
        "resolved todo data file"
    );
    Ok(ResolvedSettings {
        data_file,
        source,
        default_format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_config(data_file: &str) -> TodoConfig {
        TodoConfig {
            data_file: Some(data_file.to_string()),
            default_format: None,
        }
    }

    #[test]
    fn written_config_reads_back() {
        let temp = TempDir::new().expect("tempdir");
        let config = TodoConfig {
            data_file: Some("data/todos.json".to_string()),
            default_format: Some("json".to_string()),
        };
        let path = write_project_config(&temp.path().join("fresh"), &config).expect("write");
        assert!(path.ends_with(".todo.toml"));
        assert_eq!(read_config(&path).expect("read"), config);
    }

    #[test]
    fn discovery_finds_rc_name_in_an_ancestor() {
        let temp = TempDir::new().expect("tempdir");
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).expect("nested");
        fs::write(temp.path().join(".todorc"), "data_file = \"x.json\"\n").expect("write");

        let path = discover_project_config(&nested).expect("found");
        assert!(path.ends_with(".todorc"));
        let layer = load_layer(Some(path)).expect("load").expect("layer");
        assert_eq!(
            layer.data_file(),
            Some(temp.path().canonicalize().expect("canonical").join("x.json"))
        );
    }

    #[test]
    fn malformed_config_is_skipped() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join(".todo.toml");
        fs::write(&path, "data_file = [").expect("write");

        assert!(matches!(read_config(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(load_layer(Some(path)).expect("load"), None);

        let settings = resolve_settings(temp.path(), None, None).expect("resolve");
        assert_ne!(settings.source, DataFileSource::Project);
    }

    #[test]
    fn malformed_config_does_not_block_explicit_file() {
        let temp = TempDir::new().expect("tempdir");
        fs::write(temp.path().join(".todo.toml"), "data_file = [").expect("write");

        let settings =
            resolve_settings(temp.path(), Some(Path::new("x.json")), None).expect("resolve");
        assert_eq!(settings.source, DataFileSource::Flag);
        assert_eq!(settings.data_file, temp.path().join("x.json"));
    }

    #[test]
    fn flag_and_env_take_precedence_over_project_config() {
        let temp = TempDir::new().expect("tempdir");
        write_project_config(temp.path(), &project_config("project.json")).expect("write");

        let flag = resolve_settings(temp.path(), Some(Path::new("flag.json")), Some("env.json"))
            .expect("resolve");
        assert_eq!(flag.source, DataFileSource::Flag);
        assert_eq!(flag.data_file, temp.path().join("flag.json"));

        let env = resolve_settings(temp.path(), None, Some("env.json")).expect("resolve");
        assert_eq!(env.source, DataFileSource::Env);
        assert_eq!(env.data_file, temp.path().join("env.json"));

        let project = resolve_settings(temp.path(), None, Some("  ")).expect("resolve");
        assert_eq!(project.source, DataFileSource::Project);
        assert!(project.data_file.ends_with("project.json"));
    }
}
