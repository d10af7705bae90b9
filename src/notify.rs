use serde::Serialize;
use tokio::sync::broadcast;

use crate::model::activity::Category;
use crate::model::ledger::EventKind;

/// Event name consumed by live dashboards.
pub const NEW_ACTIVITY: &str = "new_activity";

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEvent {
    pub event: &'static str,
    pub emp_id: String,
    pub kind: String,
    pub description: String,
}

impl ActivityEvent {
    pub fn new_activity(emp_id: &str, category: Category, description: &str) -> Self {
        Self {
            event: NEW_ACTIVITY,
            emp_id: emp_id.to_string(),
            kind: category.to_string(),
            description: description.to_string(),
        }
    }

    pub fn auth(emp_id: &str, kind: EventKind, description: String) -> Self {
        Self {
            event: NEW_ACTIVITY,
            emp_id: emp_id.to_string(),
            kind: kind.to_string(),
            description,
        }
    }
}

/// Live-dashboard emitter. At-most-once, fire-and-forget: delivery is not
/// ordered relative to the durable write, and a failure to deliver must
/// never fail the state mutation it accompanies.
pub trait Notifier: Send + Sync {
    fn emit(&self, event: ActivityEvent);
}

/// Broadcast-channel implementation; dashboard transports subscribe and
/// relay. Sending with no subscribers is not an error.
#[derive(Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<ActivityEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEvent> {
        self.tx.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn emit(&self, event: ActivityEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_without_subscribers_does_not_panic() {
        let notifier = BroadcastNotifier::new(16);
        notifier.emit(ActivityEvent::new_activity("E1", Category::Task, "Data Entry"));
    }

    #[test]
    fn subscribers_receive_emitted_events() {
        let notifier = BroadcastNotifier::new(16);
        let mut rx = notifier.subscribe();

        notifier.emit(ActivityEvent::new_activity("E1", Category::Break, "Break 1"));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event, NEW_ACTIVITY);
        assert_eq!(event.kind, "break");
        assert_eq!(event.description, "Break 1");
    }
}
