use crate::error::AppError;
use crate::model::Task;
use std::io::Write;
use std::path::{Path, PathBuf};

const STORE_FILE_NAME: &str = "tasks.json";
pub const STORE_ENV_VAR: &str = "TODOAPP_STORE_PATH";

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("todoapp").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("todoapp")
            .join(STORE_FILE_NAME))
    }
}

/// Reads the whole collection. A missing file is an empty collection.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "task store does not exist yet");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let tasks: Vec<Task> = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    tracing::debug!(path = %path.display(), count = tasks.len(), "loaded task store");
    Ok(tasks)
}

/// Replaces the backing file with the full collection.
///
/// Each call writes its own uniquely named temp file next to the target and
/// renames it into place, so a crash or a concurrent writer leaves either an
/// old or a new collection on disk. Concurrent writers still race: the last
/// rename wins.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|err| AppError::io(err.to_string()))?;

    let content = serde_json::to_string_pretty(tasks)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;

    let prefix = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| STORE_FILE_NAME.into());
    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|err| AppError::io(err.to_string()))?;
    tmp.write_all(content.as_bytes())
        .map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(tmp.path(), permissions)
            .map_err(|err| AppError::io(err.to_string()))?;
    }

    tmp.persist(path)
        .map_err(|err| AppError::io(err.error.to_string()))?;

    tracing::debug!(path = %path.display(), count = tasks.len(), "saved task store");
    Ok(())
}
