use crate::terminal::record::{AutoCloseMode, SessionDefaults, ShellType, DEFAULT_COLS, DEFAULT_ROWS};
use crate::terminal::session::UserPrefs;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub default_cols: u16,
    pub default_rows: u16,
    pub default_shell: ShellType,
    pub default_auto_close: AutoCloseMode,
    pub blinking_cursor: bool,
    pub state_dir: PathBuf,
    pub state_file: PathBuf,
    pub audit_log_file: PathBuf,
    pub audit_log_max_size_bytes: u64,
}

fn expand_tilde(path_str: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path_str).as_ref())
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from `lookup`, which maps variable names to values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let log_level = var("LOG_LEVEL", "info");

        let default_cols = var("TERMINAL_COLS", &DEFAULT_COLS.to_string())
            .parse::<u16>()
            .context("Invalid TERMINAL_COLS")?;
        let default_rows = var("TERMINAL_ROWS", &DEFAULT_ROWS.to_string())
            .parse::<u16>()
            .context("Invalid TERMINAL_ROWS")?;
        if default_cols == 0 || default_rows == 0 {
            anyhow::bail!("Terminal dimensions must be non-zero: {}x{}", default_cols, default_rows);
        }

        let default_shell = ShellType::from_str(&var("DEFAULT_SHELL", "default"))?;
        let default_auto_close = AutoCloseMode::from_str(&var("TERMINAL_AUTO_CLOSE", "default"))?;

        let blinking_cursor = var("BLINKING_CURSOR", "true")
            .parse::<bool>()
            .context("Invalid BLINKING_CURSOR")?;

        let state_dir = expand_tilde(&var("TERMINAL_STATE_DIR", "~/.terminal-list"));
        let state_file = state_dir.join("terminals.json");
        let audit_log_file = state_dir.join("commands.log");
        let audit_log_max_size_bytes = var("AUDIT_LOG_MAX_SIZE_MB", "10") // Default 10 MB
            .parse::<u64>()
            .map(|mb| mb * 1024 * 1024) // Convert MB to Bytes
            .unwrap_or(10 * 1024 * 1024);

        Ok(Config {
            log_level,
            default_cols,
            default_rows,
            default_shell,
            default_auto_close,
            blinking_cursor,
            state_dir,
            state_file,
            audit_log_file,
            audit_log_max_size_bytes,
        })
    }

    pub fn session_defaults(&self) -> SessionDefaults {
        SessionDefaults {
            columns: self.default_cols,
            rows: self.default_rows,
            shell_type: self.default_shell,
            auto_close_mode: self.default_auto_close,
        }
    }
}

impl UserPrefs for Config {
    fn blinking_cursor(&self) -> bool {
        self.blinking_cursor
    }
}
