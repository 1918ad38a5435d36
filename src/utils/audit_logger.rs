use crate::config::Config;
use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::error;

/// Longest string argument written to the log before it is truncated.
const MAX_LOGGED_ARG_LEN: usize = 256;

pub struct AuditLogger {
    log_file_path: PathBuf,
    max_size_bytes: u64,
}

impl AuditLogger {
    pub fn new(config: &Config) -> Self {
        Self::with_path(config.audit_log_file.clone(), config.audit_log_max_size_bytes)
    }

    pub fn with_path(log_file_path: PathBuf, max_size_bytes: u64) -> Self {
        if let Some(dir) = log_file_path.parent().filter(|d| !d.exists()) {
            if let Err(e) = std::fs::create_dir_all(dir) {
                error!(path = %dir.display(), error = %e, "Failed to create audit log directory");
            }
        }
        Self { log_file_path, max_size_bytes }
    }

    /// `commands.log` becomes `commands_<stamp>.log` next to it.
    fn rotated_path(&self, stamp: &str) -> PathBuf {
        let stem = self.log_file_path.file_stem().unwrap_or_default().to_string_lossy();
        let name = match self.log_file_path.extension() {
            Some(ext) => format!("{}_{}.{}", stem, stamp, ext.to_string_lossy()),
            None => format!("{}_{}", stem, stamp),
        };
        self.log_file_path.with_file_name(name)
    }

    async fn rotate_if_full(&self) -> Result<()> {
        let size = match fs::metadata(&self.log_file_path).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if size >= self.max_size_bytes {
            let stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
            fs::rename(&self.log_file_path, self.rotated_path(&stamp)).await?;
        }
        Ok(())
    }

    pub async fn log_command(&self, command: &str, arguments: &Value) {
        if let Err(e) = self.try_log_command(command, arguments).await {
            error!(command = %command, error = %e, "Failed to write audit log");
        }
    }

    async fn try_log_command(&self, command: &str, arguments: &Value) -> Result<()> {
        self.rotate_if_full().await?;

        let mut logged = arguments.clone();
        if let Some(fields) = logged.as_object_mut() {
            for value in fields.values_mut() {
                if value.as_str().is_some_and(|s| s.len() > MAX_LOGGED_ARG_LEN) {
                    *value = Value::String("<truncated for log>".to_string());
                }
            }
        }

        let line = format!(
            "{} | {:<14} | {}\n",
            Utc::now().to_rfc3339(),
            command,
            serde_json::to_string(&logged)?
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}
