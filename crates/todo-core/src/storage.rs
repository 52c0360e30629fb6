use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::todo::TodoList;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Todo file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("todo file IO error")]
    Io(#[from] io::Error),
    #[error("failed to parse todo file")]
    Json(#[from] serde_json::Error),
}

/// Whole-file JSON store for a [`TodoList`].
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<TodoList, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(self.path.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        let todos: TodoList = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), count = todos.len(), "loaded todos");
        Ok(todos)
    }

    /// Like [`Storage::load`], but a missing file yields an empty list.
    pub fn load_or_default(&self) -> Result<TodoList, StorageError> {
        match self.load() {
            Err(StorageError::NotFound(path)) => {
                debug!(path = %path.display(), "no todo file yet, starting empty");
                Ok(TodoList::new())
            }
            other => other,
        }
    }

    /// Replaces the file contents through a temp file and rename, so readers never see
    /// a partial write.
    pub fn save(&self, todos: &TodoList) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(todos)?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = todos.len(), "saved todos");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "todos.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
