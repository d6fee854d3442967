//! Event system for controller communication
//!
//! Provides:
//! - Event types for machine status, position and fault changes
//! - Event dispatcher for publishing events to subscribers

use crate::data::{Coord, MachineStatus};
use tokio::sync::broadcast;

/// Controller event types
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// Reported machine status changed
    StatusChanged {
        /// Status before the report
        from: MachineStatus,
        /// Status carried by the report
        to: MachineStatus,
    },
    /// A status report carried a (logical) position
    PositionChanged(Coord),
    /// Idle to moving transition observed
    MovementStarted,
    /// Moving to idle transition observed
    MovementFinished,
    /// Mechanical homing completed
    Homed,
    /// Controller reported an error; motion is blocked until reset
    FaultLatched,
    /// Latched fault cleared by reset
    FaultCleared,
    /// Transport to the controller went away
    ConnectionLost(String),
}

impl std::fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerEvent::StatusChanged { from, to } => {
                write!(f, "Status: {} -> {}", from, to)
            }
            ControllerEvent::PositionChanged(pos) => write!(f, "Position: {}", pos),
            ControllerEvent::MovementStarted => write!(f, "Movement started"),
            ControllerEvent::MovementFinished => write!(f, "Movement finished"),
            ControllerEvent::Homed => write!(f, "Homed"),
            ControllerEvent::FaultLatched => write!(f, "Fault latched"),
            ControllerEvent::FaultCleared => write!(f, "Fault cleared"),
            ControllerEvent::ConnectionLost(reason) => write!(f, "Connection lost: {}", reason),
        }
    }
}

/// Event dispatcher for publishing events to subscribers
#[derive(Clone)]
pub struct EventDispatcher {
    /// Broadcast sender channel for controller events.
    tx: broadcast::Sender<ControllerEvent>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    ///
    /// # Arguments
    /// * `buffer_size` - Size of the broadcast buffer (default 100)
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of subscribers reached; zero when nobody listens.
    pub fn publish(&self, event: ControllerEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
