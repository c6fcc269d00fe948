//! Console events and notifiers.
//!
//! Boards and designer sessions emit an event for every completed remote
//! operation and every raised notice, so a surface can refresh, log or
//! stream them.

use flowdesk_lifecycle::{DefinitionStatus, InstanceStatus};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::notice::Notice;

/// Events emitted by console components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConsoleEvent {
  /// A definition was created or replaced.
  DefinitionSaved { definition_id: String, name: String },

  /// A definition's status changed.
  DefinitionTransitioned {
    definition_id: String,
    from: DefinitionStatus,
    to: DefinitionStatus,
  },

  DefinitionDeleted { definition_id: String },

  InstanceStarted {
    instance_id: String,
    definition_id: String,
  },

  /// An instance's status changed through a user operation.
  InstanceTransitioned {
    instance_id: String,
    from: InstanceStatus,
    to: InstanceStatus,
  },

  /// An operation failed and a notice was raised.
  NoticeRaised(Notice),
}

/// Receives console events.
pub trait ConsoleNotifier: Send + Sync {
  fn notify(&self, event: ConsoleEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ConsoleNotifier for NoopNotifier {
  fn notify(&self, _event: ConsoleEvent) {}
}

/// Sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ConsoleEvent>,
}

impl ChannelNotifier {
  /// Create a notifier and the receiving end of its channel.
  pub fn new() -> (Self, mpsc::UnboundedReceiver<ConsoleEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self { sender }, receiver)
  }
}

impl ConsoleNotifier for ChannelNotifier {
  fn notify(&self, event: ConsoleEvent) {
    // A dropped receiver only means nobody is listening.
    let _ = self.sender.send(event);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_channel_notifier_delivers_in_order() {
    let (notifier, mut receiver) = ChannelNotifier::new();
    notifier.notify(ConsoleEvent::DefinitionDeleted {
      definition_id: "d-1".to_string(),
    });
    notifier.notify(ConsoleEvent::DefinitionDeleted {
      definition_id: "d-2".to_string(),
    });

    assert!(matches!(
      receiver.try_recv(),
      Ok(ConsoleEvent::DefinitionDeleted { definition_id }) if definition_id == "d-1"
    ));
    assert!(matches!(
      receiver.try_recv(),
      Ok(ConsoleEvent::DefinitionDeleted { definition_id }) if definition_id == "d-2"
    ));
  }

  #[test]
  fn test_send_after_receiver_dropped() {
    let (notifier, receiver) = ChannelNotifier::new();
    drop(receiver);
    notifier.notify(ConsoleEvent::DefinitionDeleted {
      definition_id: "d-1".to_string(),
    });
  }
}
