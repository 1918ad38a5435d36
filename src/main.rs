use anyhow::{Context, Result};
use std::sync::Arc;
use terminal_list::config::Config;
use terminal_list::console::backend::LocalBackend;
use terminal_list::console::{Console, Flow};
use terminal_list::terminal::persist::load_session_state;
use terminal_list::terminal::{TerminalBusyEvent, TerminalList};
use terminal_list::utils::audit_logger::AuditLogger;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt::format::FmtSpan, FmtSubscriber};

/// Filter directive for this crate. Unknown levels fall back to `info`.
fn default_directive(log_level: &str) -> String {
    let level = log_level.trim().parse::<Level>().unwrap_or(Level::INFO);
    format!("terminal_list={}", level.as_str().to_lowercase())
}

/// JSON logs on stderr; stdout belongs to the console. `RUST_LOG` wins over
/// the configured level.
fn setup_logging(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    setup_logging(&config.log_level)?;

    tracing::info!(version = %env!("CARGO_PKG_VERSION"), "Starting terminal-list console");
    tracing::debug!("Loaded configuration: {:?}", config);

    if let Some(program) = config.default_shell.program() {
        if which::which(program).is_err() {
            tracing::warn!(shell = %config.default_shell, program, "Configured shell is not installed or not in PATH");
        }
    }

    let (backend, mut backend_events) = LocalBackend::new();
    let backend = Arc::new(backend);
    let (busy_tx, mut busy_rx) = broadcast::channel::<TerminalBusyEvent>(64);

    let mut list = TerminalList::with_defaults(
        backend.clone(),
        backend,
        Arc::new(busy_tx),
        Arc::new(config.clone()),
        config.session_defaults(),
    );
    let saved = load_session_state(&config.state_file).await?;
    if !saved.is_empty() {
        tracing::info!(count = saved.len(), path = %config.state_file.display(), "Restoring terminals");
    }
    list.restore(saved);

    let audit = AuditLogger::new(&config);
    let mut console = Console::new(list, config.state_file.clone(), audit);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    console.save().await?;
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match console.run_line(&line).await {
                    Ok(Flow::Continue(output)) => {
                        if !output.is_empty() {
                            println!("{}", output);
                        }
                    }
                    Ok(Flow::Quit(output)) => {
                        println!("{}", output);
                        break;
                    }
                    Err(e) => println!("error: {}", e),
                }
            }
            Some(event) = backend_events.recv() => {
                console.apply_backend_event(event);
            }
            busy = busy_rx.recv() => {
                match busy {
                    Ok(TerminalBusyEvent { busy }) => tracing::debug!(busy, "Terminal busy state"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Busy-event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::info!(terminals = console.list().len(), "Console shutdown.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_maps_to_crate_directive() {
        assert_eq!(default_directive("debug"), "terminal_list=debug");
        assert_eq!(default_directive("WARN"), "terminal_list=warn");
        assert_eq!(default_directive(" trace "), "terminal_list=trace");
        assert_eq!(default_directive("chatty"), "terminal_list=info");
    }
}
