use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{trace, warn};

/// Default buffer for both channel kinds.
/// Form interactions arrive one at a time, 128 leaves plenty of headroom.
pub const DEFAULT_CAPACITY: usize = 128;
const MIN_CAPACITY: usize = 1;

/// Supported channel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Fan-out: every subscriber sees every event, slow subscribers may lag.
    Broadcast { capacity: usize },
    /// Single-consumer queue: events are delivered in order and never skipped.
    Queue { capacity: usize },
}

/// Marker trait for types that can be sent across the [`EventBus`].
///
/// Any type that is `Send + Sync + 'static` automatically implements this trait.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct ChannelState {
    kind: ChannelKind,
    sender: Box<dyn Any + Send + Sync>,
}

#[derive(Debug)]
struct QueueChannel<T> {
    sender: mpsc::Sender<Arc<T>>,
    receiver: Option<mpsc::Receiver<Arc<T>>>,
}

/// A thread-safe, type-indexed event bus.
///
/// Cloning is cheap: all clones share the same channel table.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, ChannelState>>>,
}

impl EventBus {
    /// Creates a new, empty `EventBus`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to broadcast events of type `T` with the default capacity.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is already routed
    /// through a queue.
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes to broadcast events of type `T` with a specific buffer capacity.
    ///
    /// The capacity only applies when this call creates the channel.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] for a zero capacity and
    /// [`EventBusError::ChannelKindMismatch`] if `T` is already routed through a queue.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        let capacity = validate_capacity(capacity)?;
        Ok(self.broadcast_sender::<T>(capacity)?.subscribe())
    }

    /// Takes the single receiver of the queue channel for `T`, creating the channel if needed.
    ///
    /// Events published to the queue before this call stay buffered and are delivered first.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] for a zero capacity,
    /// [`EventBusError::ChannelKindMismatch`] if `T` is broadcast, and
    /// [`EventBusError::ReceiverTaken`] if another consumer already owns the queue.
    pub fn subscribe_queue<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<mpsc::Receiver<Arc<T>>, EventBusError> {
        let capacity = validate_capacity(capacity)?;
        let mut channels = self.channels.write();
        let state = channels.entry(TypeId::of::<T>()).or_insert_with(|| new_queue::<T>(capacity));
        let queue = queue_mut::<T>(state, capacity)?;

        queue.receiver.take().ok_or_else(|| EventBusError::ReceiverTaken {
            message: type_name::<T>().into(),
            context: Some("Queue already has a consumer".into()),
        })
    }

    /// Publishes an event via broadcast.
    ///
    /// Returns the number of subscribers that received it (zero is not an error).
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is routed through a queue.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Publishes a shared event via broadcast without re-wrapping.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is routed through a queue.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.broadcast_sender::<T>(DEFAULT_CAPACITY)?;
        let delivered = sender.send(event).unwrap_or_else(|_| {
            trace!(event = type_name::<T>(), "Event dropped: no active subscribers");
            0
        });
        if delivered > 0 {
            trace!(event = type_name::<T>(), delivered, "Event dispatched");
        }
        Ok(delivered)
    }

    /// Enqueues an event for the single queue consumer of `T`.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is broadcast and
    /// [`EventBusError::ChannelFull`] if the buffer is full or the consumer is gone.
    pub fn publish_queue<T: Event>(&self, event: T) -> Result<(), EventBusError> {
        let sender = {
            let mut channels = self.channels.write();
            let state = channels
                .entry(TypeId::of::<T>())
                .or_insert_with(|| new_queue::<T>(DEFAULT_CAPACITY));
            queue_mut::<T>(state, DEFAULT_CAPACITY)?.sender.clone()
        };

        sender.try_send(Arc::new(event)).map_err(|e| EventBusError::ChannelFull {
            message: e.to_string().into(),
            context: Some(type_name::<T>().into()),
        })?;
        trace!(event = type_name::<T>(), "Event enqueued");
        Ok(())
    }

    /// Returns the kind of channel registered for `T`, if any.
    #[must_use]
    pub fn channel_kind<T: Event>(&self) -> Option<ChannelKind> {
        self.channels.read().get(&TypeId::of::<T>()).map(|state| state.kind)
    }

    /// Drops every channel. Receivers observe closure once their buffers drain.
    ///
    /// Returns the number of channels that were closed.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn broadcast_sender<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        if let Some(state) = self.channels.read().get(&TypeId::of::<T>()) {
            return broadcast_from_state::<T>(state, capacity);
        }

        let mut channels = self.channels.write();
        let state = channels.entry(TypeId::of::<T>()).or_insert_with(|| {
            trace!(event = type_name::<T>(), capacity, "Initializing broadcast channel");
            let (tx, _) = broadcast::channel::<Arc<T>>(capacity);
            ChannelState { kind: ChannelKind::Broadcast { capacity }, sender: Box::new(tx) }
        });
        broadcast_from_state::<T>(state, capacity)
    }
}

fn new_queue<T: Event>(capacity: usize) -> ChannelState {
    trace!(event = type_name::<T>(), capacity, "Initializing queue channel");
    let (sender, receiver) = mpsc::channel::<Arc<T>>(capacity);
    ChannelState {
        kind: ChannelKind::Queue { capacity },
        sender: Box::new(QueueChannel { sender, receiver: Some(receiver) }),
    }
}

fn broadcast_from_state<T: Event>(
    state: &ChannelState,
    requested: usize,
) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
    let ChannelKind::Broadcast { capacity } = state.kind else {
        return Err(kind_mismatch::<T>("Broadcast", state.kind));
    };
    if capacity != requested {
        warn!(
            event = type_name::<T>(),
            existing_capacity = capacity,
            requested_capacity = requested,
            "Broadcast channel already initialized with a different capacity"
        );
    }
    state.sender.downcast_ref::<broadcast::Sender<Arc<T>>>().cloned().ok_or_else(type_mismatch::<T>)
}

fn queue_mut<T: Event>(
    state: &mut ChannelState,
    requested: usize,
) -> Result<&mut QueueChannel<T>, EventBusError> {
    let ChannelKind::Queue { capacity } = state.kind else {
        return Err(kind_mismatch::<T>("Queue", state.kind));
    };
    if capacity != requested {
        warn!(
            event = type_name::<T>(),
            existing_capacity = capacity,
            requested_capacity = requested,
            "Queue channel already initialized with a different capacity"
        );
    }
    state.sender.downcast_mut::<QueueChannel<T>>().ok_or_else(type_mismatch::<T>)
}

fn kind_mismatch<T: Event>(expected: &str, found: ChannelKind) -> EventBusError {
    EventBusError::ChannelKindMismatch {
        message: format!("Expected {expected} but found {found:?} for {}", type_name::<T>()).into(),
        context: None,
    }
}

fn type_mismatch<T: Event>() -> EventBusError {
    EventBusError::TypeMismatch {
        message: type_name::<T>().into(),
        context: Some("Unexpected event type".into()),
    }
}

fn validate_capacity(capacity: usize) -> Result<usize, EventBusError> {
    if capacity < MIN_CAPACITY {
        return Err(EventBusError::InvalidCapacity {
            message: format!("capacity must be >= {MIN_CAPACITY}").into(),
            context: None,
        });
    }
    Ok(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Ping(u32);

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(Ping(1)).unwrap(), 0);
        assert_eq!(bus.channel_kind::<Ping>(), Some(ChannelKind::Broadcast { capacity: 128 }));
    }

    #[test]
    fn kinds_cannot_be_mixed_for_one_event_type() {
        let bus = EventBus::new();
        let _rx = bus.subscribe_queue::<Ping>(4).unwrap();

        let err = bus.subscribe::<Ping>().unwrap_err();
        assert!(matches!(err, EventBusError::ChannelKindMismatch { .. }));

        let err = bus.publish(Ping(1)).unwrap_err();
        assert!(matches!(err, EventBusError::ChannelKindMismatch { .. }));
    }

    #[test]
    fn queue_rejects_publish_when_full() {
        let bus = EventBus::new();
        let _rx = bus.subscribe_queue::<Ping>(1).unwrap();

        bus.publish_queue(Ping(1)).unwrap();
        let err = bus.publish_queue(Ping(2)).unwrap_err();
        assert!(matches!(err, EventBusError::ChannelFull { .. }));
    }
}
