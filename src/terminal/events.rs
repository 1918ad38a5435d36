use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::trace;

/// Published after every registry mutation: is any terminal running a subprocess?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TerminalBusyEvent {
    pub busy: bool,
}

/// State changes reported for a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalNotification {
    SubprocessesChanged { handle: String, has_subprocesses: bool },
    WorkingDirectoryChanged { handle: String, cwd: Option<String> },
}

pub trait EventSink: Send + Sync {
    fn publish(&self, event: TerminalBusyEvent);
}

impl EventSink for broadcast::Sender<TerminalBusyEvent> {
    fn publish(&self, event: TerminalBusyEvent) {
        // Err only means nobody is subscribed right now.
        if self.send(event).is_err() {
            trace!(busy = event.busy, "No busy-event subscribers");
        }
    }
}

impl EventSink for mpsc::UnboundedSender<TerminalBusyEvent> {
    fn publish(&self, event: TerminalBusyEvent) {
        if self.send(event).is_err() {
            trace!(busy = event.busy, "Busy-event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_sink_without_subscribers_is_silent() {
        let (tx, rx) = broadcast::channel::<TerminalBusyEvent>(4);
        drop(rx);
        tx.publish(TerminalBusyEvent { busy: true });
    }

    #[tokio::test]
    async fn broadcast_sink_reaches_subscribers() {
        let (tx, mut rx) = broadcast::channel(4);
        tx.publish(TerminalBusyEvent { busy: false });
        assert_eq!(rx.recv().await.unwrap(), TerminalBusyEvent { busy: false });
    }
}
