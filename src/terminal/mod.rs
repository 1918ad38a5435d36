//! Client-side registry of interactive terminal sessions.

pub mod events;
pub mod list;
pub mod persist;
pub mod record;
pub mod session;

pub use events::{EventSink, TerminalBusyEvent, TerminalNotification};
pub use list::TerminalList;
pub use record::{AutoCloseMode, ProcessInfo, SessionDefaults, ShellType, TerminalRecord};
pub use session::{FixedPrefs, ProcessTerminator, SessionRequest, SessionStarter, UserPrefs};
