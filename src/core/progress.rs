use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A progress event reported by the execution engine for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitEvent {
    Start,
    Finish,
    Custom(String),
}

/// One message on the progress stream. The stream ends with `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressMessage {
    Unit {
        name: String,
        event: Option<UnitEvent>,
    },
    Done,
}

/// Receives progress callbacks, synchronously, on the engine's thread.
pub trait ProgressObserver: Send + Sync {
    fn notify(&self, unit_name: &str, event: Option<UnitEvent>);

    /// Signals that no further events will follow.
    fn finish(&self) {}
}

/// Simple in-memory collector for progress messages.
#[derive(Default)]
pub struct MemoryProgress {
    messages: Mutex<Vec<ProgressMessage>>,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<ProgressMessage> {
        self.lock().clone()
    }

    fn push(&self, message: ProgressMessage) {
        self.lock().push(message);
    }

    /// A panicking observer must not lose the events recorded so far.
    fn lock(&self) -> MutexGuard<'_, Vec<ProgressMessage>> {
        self.messages.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::warn!("Progress collector lock was poisoned, recovering.");
            poisoned.into_inner()
        })
    }
}

impl ProgressObserver for MemoryProgress {
    fn notify(&self, unit_name: &str, event: Option<UnitEvent>) {
        self.push(ProgressMessage::Unit {
            name: unit_name.to_string(),
            event,
        });
    }

    fn finish(&self) {
        self.push(ProgressMessage::Done);
    }
}

/// Forwards progress over a bounded channel to a consumer on another task.
///
/// A full channel blocks the producer until the consumer catches up. Once the
/// receiver is gone, events are dropped. Must not be called from inside an
/// async context, since sends block the calling thread.
pub struct ChannelProgress {
    sender: mpsc::Sender<ProgressMessage>,
}

/// Creates a progress channel holding at most `capacity` pending messages.
pub fn progress_channel(capacity: usize) -> (ChannelProgress, mpsc::Receiver<ProgressMessage>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ChannelProgress { sender }, receiver)
}

impl ChannelProgress {
    fn send(&self, message: ProgressMessage) {
        if self.sender.blocking_send(message).is_err() {
            log::warn!("Progress receiver closed, dropping event.");
        }
    }
}

impl ProgressObserver for ChannelProgress {
    fn notify(&self, unit_name: &str, event: Option<UnitEvent>) {
        self.send(ProgressMessage::Unit {
            name: unit_name.to_string(),
            event,
        });
    }

    fn finish(&self) {
        self.send(ProgressMessage::Done);
    }
}

/// Drains `receiver` into the log until `Done` arrives or every sender is
/// dropped. Resolves to the number of unit events seen.
pub fn spawn_progress_logger(mut receiver: mpsc::Receiver<ProgressMessage>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut seen = 0;
        while let Some(message) = receiver.recv().await {
            match message {
                ProgressMessage::Unit { name, event } => {
                    seen += 1;
                    match event {
                        Some(event) => log::info!("{} - {:?}", name, event),
                        None => log::info!("{}", name),
                    }
                }
                ProgressMessage::Done => {
                    log::info!("-- END --");
                    break;
                }
            }
        }
        seen
    })
}
