//! Structured user notifications and narrow UI hints.
//!
//! The simulation core never renders anything; it pushes `LogEvent`s (for
//! the user-facing event feed) and `UiHint`s (transient state for any open
//! UI surface) into a `NotificationSink` owned by the caller.

/// Tags describing what changed during a day, for downstream cache refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTag {
    GameSim,
    PlayerMovement,
    NewPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Info,
    Error,
    InjuredList,
    Healed,
    HealedList,
    Tragedy,
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub kind: EventKind,
    pub text: String,
    pub show_notification: bool,
    /// Persistent events stay visible until dismissed.
    pub persistent: bool,
    pub pids: Vec<u32>,
    pub tids: Vec<i32>,
    /// Notification ranking score, when applicable.
    pub score: Option<u8>,
}

impl LogEvent {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Info,
            text: text.into(),
            show_notification: true,
            persistent: false,
            pids: Vec::new(),
            tids: Vec::new(),
            score: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            text: text.into(),
            show_notification: true,
            persistent: false,
            pids: Vec::new(),
            tids: Vec::new(),
            score: None,
        }
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

/// Transient state pushed to open UI surfaces.
#[derive(Debug, Clone, PartialEq)]
pub enum UiHint {
    RealtimeUpdate { tags: Vec<UpdateTag>, live: Option<LiveGame> },
    LiveGameInProgress,
    DeleteGames { gids: Vec<u32> },
}

/// A requested live game's trace, surfaced once its day resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveGame {
    pub gid: u32,
    pub play_by_play: Vec<String>,
}

pub trait NotificationSink {
    fn log_event(&mut self, event: LogEvent);
    fn ui_hint(&mut self, hint: UiHint);
}

/// Collects everything; the default sink for embedders and tests.
#[derive(Debug, Default)]
pub struct EventBuffer {
    pub events: Vec<LogEvent>,
    pub hints: Vec<UiHint>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter().filter(|e| e.kind == EventKind::Error)
    }
}

impl NotificationSink for EventBuffer {
    fn log_event(&mut self, event: LogEvent) {
        log::debug!("event [{:?}]: {}", event.kind, event.text);
        self.events.push(event);
    }

    fn ui_hint(&mut self, hint: UiHint) {
        self.hints.push(hint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_collects_in_order() {
        let mut buffer = EventBuffer::new();
        buffer.log_event(LogEvent::info("first"));
        buffer.log_event(LogEvent::error("second").persistent());

        assert_eq!(buffer.events.len(), 2);
        assert_eq!(buffer.errors().count(), 1);
        assert!(buffer.events[1].persistent);
    }
}
