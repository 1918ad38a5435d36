use crate::terminal::events::{EventSink, TerminalBusyEvent, TerminalNotification};
use crate::terminal::record::{
    AutoCloseMode, ProcessInfo, SessionDefaults, TerminalRecord, SEQUENCE_NO_TERMINAL,
};
use crate::terminal::session::{ProcessTerminator, SessionRequest, SessionStarter, UserPrefs};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Known terminals, in the order they were first added, with enough metadata
/// to list them and reconnect to them.
pub struct TerminalList {
    terminals: Vec<TerminalRecord>,
    /// Highest sequence seen or handed out so far; never decreases.
    highest_sequence: u32,
    /// Captions requested by `create_named` whose session has not been added yet.
    pending_captions: HashSet<String>,
    defaults: SessionDefaults,
    starter: Arc<dyn SessionStarter>,
    terminator: Arc<dyn ProcessTerminator>,
    events: Arc<dyn EventSink>,
    prefs: Arc<dyn UserPrefs>,
}

impl std::fmt::Debug for TerminalList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalList")
            .field("terminals", &self.terminals)
            .field("highest_sequence", &self.highest_sequence)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl TerminalList {
    pub fn new(
        starter: Arc<dyn SessionStarter>,
        terminator: Arc<dyn ProcessTerminator>,
        events: Arc<dyn EventSink>,
        prefs: Arc<dyn UserPrefs>,
    ) -> Self {
        Self::with_defaults(starter, terminator, events, prefs, SessionDefaults::default())
    }

    pub fn with_defaults(
        starter: Arc<dyn SessionStarter>,
        terminator: Arc<dyn ProcessTerminator>,
        events: Arc<dyn EventSink>,
        prefs: Arc<dyn UserPrefs>,
        defaults: SessionDefaults,
    ) -> Self {
        Self {
            terminals: Vec::new(),
            highest_sequence: SEQUENCE_NO_TERMINAL,
            pending_captions: HashSet::new(),
            defaults,
            starter,
            terminator,
            events,
            prefs,
        }
    }

    /// Insert `record`, or replace the record with the same handle in place.
    #[instrument(skip(self, record), fields(handle = %record.handle()))]
    pub fn add_or_update(&mut self, record: TerminalRecord) {
        self.highest_sequence = self.highest_sequence.max(record.sequence());
        self.pending_captions.remove(record.caption());
        match self.position(record.handle()) {
            Some(index) => {
                debug!(index, "Updating terminal");
                self.terminals[index] = record;
            }
            None => {
                debug!(caption = %record.caption(), sequence = record.sequence(), "Adding terminal");
                self.terminals.push(record);
            }
        }
        self.publish_busy();
    }

    /// Add a record for each persisted process, keeping their order.
    pub fn restore<I>(&mut self, infos: I)
    where
        I: IntoIterator<Item = ProcessInfo>,
    {
        for info in infos {
            let record = TerminalRecord::from_process_info(info, &self.defaults);
            self.add_or_update(record);
        }
    }

    pub fn snapshot(&self) -> Vec<ProcessInfo> {
        self.terminals.iter().map(TerminalRecord::to_process_info).collect()
    }

    #[instrument(skip(self))]
    pub fn remove(&mut self, handle: &str) {
        if let Some(index) = self.position(handle) {
            self.terminals.remove(index);
            debug!(index, "Removed terminal");
        }
        self.publish_busy();
    }

    /// Interrupt and reap one terminal's process and forget it. Returns false
    /// for an unknown handle.
    #[instrument(skip(self))]
    pub fn close(&mut self, handle: &str) -> bool {
        if self.position(handle).is_none() {
            return false;
        }
        self.terminator.interrupt_and_reap(handle);
        self.remove(handle);
        true
    }

    /// Interrupt and reap every known terminal process, then forget them all.
    #[instrument(skip(self), fields(count = self.terminals.len()))]
    pub fn terminate_all(&mut self) {
        for record in &self.terminals {
            self.terminator.interrupt_and_reap(record.handle());
        }
        info!("Terminated all terminals");
        self.terminals.clear();
        self.pending_captions.clear();
        self.publish_busy();
    }

    pub fn len(&self) -> usize {
        self.terminals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminals.is_empty()
    }

    pub fn get(&self, handle: &str) -> Option<&TerminalRecord> {
        self.terminals.iter().find(|t| t.handle() == handle)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TerminalRecord> {
        self.terminals.iter()
    }

    pub fn handles(&self) -> impl Iterator<Item = &str> + '_ {
        self.terminals.iter().map(TerminalRecord::handle)
    }

    /// Zero-based position of `handle` in iteration order.
    pub fn index_of(&self, handle: &str) -> Option<usize> {
        self.position(handle)
    }

    pub fn handle_at_index(&self, index: usize) -> Option<&str> {
        self.terminals.get(index).map(TerminalRecord::handle)
    }

    /// True if no terminal currently uses `caption` (exact, case-sensitive).
    pub fn is_caption_available(&self, caption: &str) -> bool {
        !self.terminals.iter().any(|t| t.caption() == caption)
    }

    pub fn handle_for_caption(&self, caption: &str) -> Option<&str> {
        self.terminals
            .iter()
            .find(|t| t.caption() == caption)
            .map(TerminalRecord::handle)
    }

    /// Auto-close policy, or [`AutoCloseMode::Default`] for an unknown handle.
    pub fn auto_close_mode(&self, handle: &str) -> AutoCloseMode {
        self.get(handle)
            .map(TerminalRecord::auto_close_mode)
            .unwrap_or_default()
    }

    /// Caption, or an empty string for an unknown handle.
    pub fn caption(&self, handle: &str) -> &str {
        self.get(handle).map(TerminalRecord::caption).unwrap_or("")
    }

    /// Whether the terminal has child processes. An unknown handle reports
    /// `true` so it is never treated as safe to close silently.
    pub fn has_subprocesses(&self, handle: &str) -> bool {
        self.get(handle)
            .map(TerminalRecord::has_child_processes)
            .unwrap_or(true)
    }

    pub fn any_subprocesses_active(&self) -> bool {
        self.terminals.iter().any(TerminalRecord::has_child_processes)
    }

    /// Returns true if the title changed.
    #[instrument(skip(self))]
    pub fn retitle(&mut self, handle: &str, title: &str) -> bool {
        match self.get(handle) {
            Some(current) if current.title() != title => {
                let updated = current.clone().with_title(title);
                self.add_or_update(updated);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_child_processes(&mut self, handle: &str, has_child_processes: bool) -> bool {
        match self.get(handle) {
            Some(current) if current.has_child_processes() != has_child_processes => {
                let updated = current.clone().with_child_processes(has_child_processes);
                self.add_or_update(updated);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_working_directory(&mut self, handle: &str, cwd: Option<String>) -> bool {
        match self.get(handle) {
            Some(current) if current.working_directory() != cwd.as_deref() => {
                let updated = current.clone().with_working_directory(cwd);
                self.add_or_update(updated);
                true
            }
            _ => false,
        }
    }

    /// Apply a state change reported for a running session.
    #[instrument(skip(self))]
    pub fn handle_notification(&mut self, notification: TerminalNotification) {
        match notification {
            TerminalNotification::SubprocessesChanged { handle, has_subprocesses } => {
                self.set_child_processes(&handle, has_subprocesses);
                self.publish_busy();
            }
            TerminalNotification::WorkingDirectoryChanged { handle, cwd } => {
                self.set_working_directory(&handle, cwd);
            }
        }
    }

    /// One more than the highest sequence present or already handed out.
    /// Gaps left by closed terminals are not refilled. Saturates at `u32::MAX`.
    pub fn next_sequence(&self) -> u32 {
        let present = self
            .terminals
            .iter()
            .map(TerminalRecord::sequence)
            .fold(SEQUENCE_NO_TERMINAL, u32::max);
        self.highest_sequence.max(present).saturating_add(1)
    }

    fn allocate_sequence(&mut self) -> u32 {
        let sequence = self.next_sequence();
        self.highest_sequence = sequence;
        sequence
    }

    /// Start a new terminal with the default caption. Returns its sequence.
    pub fn create_new(&mut self) -> u32 {
        let sequence = self.allocate_sequence();
        let request = self.new_session_request(sequence, None);
        self.start_session(request);
        sequence
    }

    /// Start a new terminal called `caption` and return its sequence. An empty
    /// caption falls back to [`TerminalList::create_new`]. Returns `None`,
    /// starting nothing, if the caption is in use or already requested.
    #[instrument(skip(self))]
    pub fn create_named(&mut self, caption: &str) -> Option<u32> {
        if caption.is_empty() {
            return Some(self.create_new());
        }
        if !self.is_caption_available(caption) || self.pending_captions.contains(caption) {
            debug!("Caption already in use");
            return None;
        }
        let sequence = self.allocate_sequence();
        self.pending_captions.insert(caption.to_string());
        let request = self.new_session_request(sequence, Some(caption.to_string()));
        self.start_session(request);
        Some(sequence)
    }

    /// Resume a known terminal with all of its stored metadata.
    #[instrument(skip(self))]
    pub fn reconnect(&mut self, handle: &str) -> bool {
        let Some(existing) = self.get(handle) else {
            return false;
        };
        let request = SessionRequest {
            sequence: existing.sequence(),
            handle: Some(existing.handle().to_string()),
            caption: Some(existing.caption().to_string()),
            title: Some(existing.title().to_string()),
            has_child_processes: existing.has_child_processes(),
            columns: existing.columns(),
            rows: existing.rows(),
            shell_type: existing.shell_type(),
            alt_buffer_active: existing.alt_buffer_active(),
            working_directory: existing.working_directory().map(str::to_string),
            auto_close_mode: existing.auto_close_mode(),
            is_zombie: existing.is_zombie(),
            blinking_cursor: self.prefs.blinking_cursor(),
            focus: true,
        };
        self.start_session(request);
        true
    }

    fn new_session_request(&self, sequence: u32, caption: Option<String>) -> SessionRequest {
        SessionRequest {
            sequence,
            handle: None,
            caption,
            title: None,
            has_child_processes: true,
            columns: self.defaults.columns,
            rows: self.defaults.rows,
            shell_type: self.defaults.shell_type,
            alt_buffer_active: false,
            working_directory: None,
            auto_close_mode: self.defaults.auto_close_mode,
            is_zombie: false,
            blinking_cursor: self.prefs.blinking_cursor(),
            focus: true,
        }
    }

    fn start_session(&self, request: SessionRequest) {
        info!(sequence = request.sequence, handle = ?request.handle, caption = ?request.caption, "Starting terminal session");
        self.starter.start(request);
        self.publish_busy();
    }

    fn position(&self, handle: &str) -> Option<usize> {
        self.terminals.iter().position(|t| t.handle() == handle)
    }

    fn publish_busy(&self) {
        self.events.publish(TerminalBusyEvent {
            busy: self.any_subprocesses_active(),
        });
    }
}

impl<'a> IntoIterator for &'a TerminalList {
    type Item = &'a TerminalRecord;
    type IntoIter = std::slice::Iter<'a, TerminalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.terminals.iter()
    }
}
