use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use terminal_list::terminal::{
    FixedPrefs, ProcessTerminator, SessionRequest, SessionStarter, TerminalBusyEvent,
    TerminalList, TerminalNotification, TerminalRecord,
};
use tokio::sync::mpsc;

struct NullStarter;

impl SessionStarter for NullStarter {
    fn start(&self, _request: SessionRequest) {}
}

#[derive(Default)]
struct CountingTerminator {
    handles: Mutex<Vec<String>>,
}

impl ProcessTerminator for CountingTerminator {
    fn interrupt_and_reap(&self, handle: &str) {
        self.handles.lock().unwrap().push(handle.to_string());
    }
}

fn new_list() -> (TerminalList, Arc<CountingTerminator>, mpsc::UnboundedReceiver<TerminalBusyEvent>) {
    let terminator = Arc::new(CountingTerminator::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let list = TerminalList::new(
        Arc::new(NullStarter),
        terminator.clone(),
        Arc::new(tx),
        Arc::new(FixedPrefs::default()),
    );
    (list, terminator, rx)
}

#[derive(Debug, Clone)]
enum Op {
    Add { handle: u8, sequence: u32, busy: bool },
    Remove { handle: u8 },
    Subprocs { handle: u8, busy: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8, 1u32..50, any::<bool>()).prop_map(|(handle, sequence, busy)| Op::Add { handle, sequence, busy }),
        (0u8..8).prop_map(|handle| Op::Remove { handle }),
        (0u8..8, any::<bool>()).prop_map(|(handle, busy)| Op::Subprocs { handle, busy }),
    ]
}

fn handle_name(handle: u8) -> String {
    format!("term-{}", handle)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    /// Property: count equals the number of distinct handles added
    #[test]
    fn prop_count_is_distinct_handles(handles in prop::collection::vec(0u8..20, 0..60)) {
        let (mut list, _, _rx) = new_list();
        for (i, handle) in handles.iter().enumerate() {
            let name = handle_name(*handle);
            list.add_or_update(TerminalRecord::new(name.clone(), name, i as u32 + 1));
        }
        let distinct: HashSet<_> = handles.iter().collect();
        prop_assert_eq!(list.len(), distinct.len());
    }

    /// Property: next_sequence exceeds every present sequence and never goes back
    #[test]
    fn prop_next_sequence_is_monotonic(ops in prop::collection::vec(op_strategy(), 0..80)) {
        let (mut list, _, _rx) = new_list();
        let mut previous = list.next_sequence();
        for op in ops {
            match op {
                Op::Add { handle, sequence, busy } => {
                    let name = handle_name(handle);
                    list.add_or_update(TerminalRecord::new(name.clone(), name, sequence).with_child_processes(busy));
                }
                Op::Remove { handle } => list.remove(&handle_name(handle)),
                Op::Subprocs { handle, busy } => list.handle_notification(TerminalNotification::SubprocessesChanged {
                    handle: handle_name(handle),
                    has_subprocesses: busy,
                }),
            }
            let next = list.next_sequence();
            prop_assert!(next >= previous);
            prop_assert!(list.iter().all(|t| t.sequence() < next));
            previous = next;
        }
    }

    /// Property: the aggregate busy flag is the OR of every record's flag,
    /// and the last published event agrees with it
    #[test]
    fn prop_busy_matches_records(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let (mut list, _, mut rx) = new_list();
        for op in ops {
            match op {
                Op::Add { handle, sequence, busy } => {
                    let name = handle_name(handle);
                    list.add_or_update(TerminalRecord::new(name.clone(), name, sequence).with_child_processes(busy));
                }
                Op::Remove { handle } => list.remove(&handle_name(handle)),
                Op::Subprocs { handle, busy } => list.handle_notification(TerminalNotification::SubprocessesChanged {
                    handle: handle_name(handle),
                    has_subprocesses: busy,
                }),
            }
            let expected = list.iter().any(|t| t.has_child_processes());
            prop_assert_eq!(list.any_subprocesses_active(), expected);

            let mut last = None;
            while let Ok(event) = rx.try_recv() {
                last = Some(event.busy);
            }
            prop_assert_eq!(last, Some(expected));
        }
    }

    /// Property: removal makes a handle unknown and frees its caption
    #[test]
    fn prop_remove_forgets_handle(count in 1usize..10, victim in 0usize..10) {
        let (mut list, _, _rx) = new_list();
        for i in 0..count {
            list.add_or_update(TerminalRecord::new(format!("h{}", i), format!("caption {}", i), i as u32 + 1));
        }
        let victim = victim % count;
        let handle = format!("h{}", victim);
        let caption = format!("caption {}", victim);
        prop_assert!(!list.is_caption_available(&caption));

        list.remove(&handle);

        prop_assert_eq!(list.index_of(&handle), None);
        prop_assert_eq!(list.caption(&handle), "");
        prop_assert!(list.is_caption_available(&caption));
        prop_assert_eq!(list.len(), count - 1);
    }

    /// Property: terminate_all reaps each handle once and empties the list
    #[test]
    fn prop_terminate_all_reaps_every_handle(count in 0usize..12) {
        let (mut list, terminator, _rx) = new_list();
        for i in 0..count {
            list.add_or_update(TerminalRecord::new(format!("h{}", i), format!("T{}", i), i as u32 + 1));
        }

        list.terminate_all();

        let reaped = terminator.handles.lock().unwrap().clone();
        let expected: Vec<String> = (0..count).map(|i| format!("h{}", i)).collect();
        prop_assert_eq!(reaped, expected);
        prop_assert_eq!(list.len(), 0);
    }
}
