//! The keyspace-event collaborator (§4.8, interface only): a `Notifier`
//! trait that command handlers call into after a successful mutation.

/// The kind of keyspace event a command publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SAdd,
    SRem,
    SPop,
    SInterStore,
    SUnionStore,
    SDiffStore,
    SRandMemberStore,
    Del,
}

impl EventKind {
    /// The event name as published to subscribers.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::SAdd => "sadd",
            EventKind::SRem => "srem",
            EventKind::SPop => "spop",
            EventKind::SInterStore => "sinterstore",
            EventKind::SUnionStore => "sunionstore",
            EventKind::SDiffStore => "sdiffstore",
            EventKind::SRandMemberStore => "srandmemberstore",
            EventKind::Del => "del",
        }
    }
}

/// A published mutation: which key, what kind, and how much the dirty
/// counter advanced because of it.
#[derive(Debug, Clone, Copy)]
pub struct KeyspaceEvent<'a> {
    pub kind: EventKind,
    pub key: &'a [u8],
    pub dirty: u64,
}

impl<'a> KeyspaceEvent<'a> {
    pub fn new(kind: EventKind, key: &'a [u8], dirty: u64) -> Self {
        KeyspaceEvent { kind, key, dirty }
    }
}

/// Consumer of keyspace events. Command handlers accept `&mut dyn
/// Notifier` the same way they accept a keyspace and a replicator — one
/// more narrow, swappable collaborator.
pub trait Notifier {
    fn notify(&mut self, event: KeyspaceEvent<'_>);
}

/// A `Notifier` that discards every event.
#[derive(Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&mut self, _event: KeyspaceEvent<'_>) {}
}

/// A `Notifier` that records every event it sees, for tests that assert
/// on exactly which events (and dirty deltas) a command produced.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub events: Vec<(EventKind, Vec<u8>, u64)>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, event: KeyspaceEvent<'_>) {
        self.events
            .push((event.kind, event.key.to_vec(), event.dirty));
    }
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.iter().map(|(k, _, _)| *k).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_captures_events_in_order() {
        let mut n = RecordingNotifier::new();
        n.notify(KeyspaceEvent::new(EventKind::SAdd, b"key", 2));
        n.notify(KeyspaceEvent::new(EventKind::Del, b"key", 0));
        assert_eq!(n.kinds(), vec![EventKind::SAdd, EventKind::Del]);
        assert_eq!(n.events[0].2, 2);
    }
}
