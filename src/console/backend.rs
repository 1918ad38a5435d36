use crate::terminal::{ProcessTerminator, SessionRequest, SessionStarter, TerminalRecord};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// What the backend reports back after a start or reap request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Started(TerminalRecord),
    Reaped(String),
}

/// In-process stand-in for the terminal server. Requests are acknowledged
/// through a channel, the same way a remote server's notifications arrive.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    events: mpsc::UnboundedSender<BackendEvent>,
}

impl LocalBackend {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BackendEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events }, rx)
    }

    fn send(&self, event: BackendEvent) {
        if let Err(e) = self.events.send(event) {
            warn!(event = ?e.0, "Backend event dropped; receiver closed");
        }
    }
}

impl SessionStarter for LocalBackend {
    fn start(&self, request: SessionRequest) {
        let handle = request
            .handle
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        let resumed = request.handle.is_some();
        let record = request.into_record(handle);
        info!(
            handle = %record.handle(),
            caption = %record.caption(),
            sequence = record.sequence(),
            resumed,
            "Terminal session started"
        );
        self.send(BackendEvent::Started(record));
    }
}

impl ProcessTerminator for LocalBackend {
    fn interrupt_and_reap(&self, handle: &str) {
        info!(handle = %handle, "Interrupting and reaping terminal process");
        self.send(BackendEvent::Reaped(handle.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::{AutoCloseMode, ShellType};

    fn request(handle: Option<&str>) -> SessionRequest {
        SessionRequest {
            sequence: 2,
            handle: handle.map(str::to_string),
            caption: None,
            title: Some("bash".to_string()),
            has_child_processes: true,
            columns: 80,
            rows: 25,
            shell_type: ShellType::PosixBash,
            alt_buffer_active: false,
            working_directory: None,
            auto_close_mode: AutoCloseMode::Always,
            is_zombie: false,
            blinking_cursor: false,
            focus: true,
        }
    }

    #[tokio::test]
    async fn new_sessions_get_fresh_handles() {
        let (backend, mut rx) = LocalBackend::new();
        backend.start(request(None));
        backend.start(request(None));

        let Some(BackendEvent::Started(first)) = rx.recv().await else { panic!("expected start") };
        let Some(BackendEvent::Started(second)) = rx.recv().await else { panic!("expected start") };
        assert_ne!(first.handle(), second.handle());
        assert_eq!(first.caption(), "Terminal 2");
        assert_eq!(first.auto_close_mode(), AutoCloseMode::Always);
    }

    #[tokio::test]
    async fn resumed_sessions_keep_their_handle() {
        let (backend, mut rx) = LocalBackend::new();
        backend.start(request(Some("abc")));
        backend.interrupt_and_reap("abc");

        let Some(BackendEvent::Started(record)) = rx.recv().await else { panic!("expected start") };
        assert_eq!(record.handle(), "abc");
        assert_eq!(rx.recv().await, Some(BackendEvent::Reaped("abc".to_string())));
    }
}
