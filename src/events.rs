//! Progress notifications and the listener registry.

use crossbeam_channel::Sender;

/// Fire-and-forget notification raised by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    PhaseChanged(u32),
    ActiveGeneratorsChanged(u32),
    FoundKeysChanged(u32),
    PuzzleSolved,
}

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Box<dyn FnMut(&ProgressEvent) + Send + Sync>;

/// Registered handlers, called synchronously in registration order.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    handlers: Vec<(ListenerId, Handler)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&ProgressEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Push every event into `sender`. A disconnected receiver is ignored.
    pub fn forward_to(&mut self, sender: Sender<ProgressEvent>) -> ListenerId {
        self.subscribe(move |event| {
            let _ = sender.send(*event);
        })
    }

    /// Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(hid, _)| *hid != id);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: ProgressEvent) {
        for (_, handler) in self.handlers.iter_mut() {
            handler(&event);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("count", &self.handlers.len()).finish()
    }
}
