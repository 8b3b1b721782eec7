use serde::Serialize;
use std::fmt;
use suitestore_schema::{Status, SuiteRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListenerType {
    Install,
    Remove,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Start,
    End,
}

impl fmt::Display for ListenerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerType::Install => write!(f, "install"),
            ListenerType::Remove => write!(f, "remove"),
            ListenerType::Update => write!(f, "update"),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Start => write!(f, "start"),
            Phase::End => write!(f, "end"),
        }
    }
}

/// One notification. `suite` is a snapshot; on an install start it is the
/// caller's description and nothing about it is durable yet.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteEvent {
    pub kind: ListenerType,
    pub phase: Phase,
    pub status: Status,
    pub suite: SuiteRecord,
}

pub trait SuiteListener: Send + Sync {
    fn notify(&self, event: &SuiteEvent);
}

impl<F> SuiteListener for F
where
    F: Fn(&SuiteEvent) + Send + Sync,
{
    fn notify(&self, event: &SuiteEvent) {
        self(event);
    }
}

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Box<dyn SuiteListener>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: impl SuiteListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn notify(&self, kind: ListenerType, phase: Phase, status: Status, suite: &SuiteRecord) {
        if self.listeners.is_empty() {
            return;
        }
        let event = SuiteEvent {
            kind,
            phase,
            status,
            suite: suite.clone(),
        };
        for listener in &self.listeners {
            listener.notify(&event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
