//! # Event Bus
//!
//! A type-safe in-process event bus used to decouple producers (donor
//! interactions, gateway switches) from the subsystems reacting to them.
//!
//! ## Channel kinds
//!
//! * **Broadcast**: fan-out to every subscriber; lagging subscribers skip ahead.
//! * **Queue**: a single consumer receives every event in publish order.
//!
//! # Example
//!
//! ```rust
//! use dhub_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct GatewaySwitched { form: String }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!
//!     let mut rx = bus.subscribe_queue::<GatewaySwitched>(8)?;
//!     bus.publish_queue(GatewaySwitched { form: "give-form-1".to_owned() })?;
//!
//!     let event = rx.next_event().await.expect("queued event");
//!     assert_eq!(event.form, "give-form-1");
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{ChannelKind, DEFAULT_CAPACITY, Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
