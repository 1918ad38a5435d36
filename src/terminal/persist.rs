use crate::error::AppError;
use crate::terminal::record::ProcessInfo;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Write the known terminals to `path` as JSON, creating its directory if needed.
pub async fn save_session_state(path: &Path, infos: &[ProcessInfo]) -> Result<(), AppError> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() {
            fs::create_dir_all(parent_dir).await?;
        }
    }
    let json = serde_json::to_string_pretty(infos)?;
    fs::write(path, json).await?;
    debug!(path = %path.display(), count = infos.len(), "Saved terminal session state");
    Ok(())
}

/// Read terminals saved by [`save_session_state`]. A missing file means none.
pub async fn load_session_state(path: &Path) -> Result<Vec<ProcessInfo>, AppError> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No saved terminal session state");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    let infos: Vec<ProcessInfo> = serde_json::from_str(&contents)?;
    debug!(path = %path.display(), count = infos.len(), "Loaded terminal session state");
    Ok(infos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::record::TerminalRecord;

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let infos = load_session_state(&dir.path().join("terminals.json")).await.unwrap();
        assert!(infos.is_empty());
    }

    #[tokio::test]
    async fn saves_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("terminals.json");
        let infos = vec![
            TerminalRecord::new("h1", "Terminal 1", 1).to_process_info(),
            TerminalRecord::new("h2", "build", 2)
                .with_working_directory(Some("/src".to_string()))
                .to_process_info(),
        ];

        save_session_state(&path, &infos).await.unwrap();
        let loaded = load_session_state(&path).await.unwrap();

        assert_eq!(loaded, infos);
    }

    #[tokio::test]
    async fn malformed_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terminals.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = load_session_state(&path).await.unwrap_err();
        assert!(matches!(err, AppError::SerdeJsonError(_)));
    }
}
