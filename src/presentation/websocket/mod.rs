//! Flash Feed
//!
//! Real-time broadcast of global activity events over WebSocket.

pub mod handler;
pub mod hub;
pub mod registry;
pub mod subscriber;

pub use handler::flash_handler;
pub use hub::BroadcastHub;
pub use registry::SubscriberRegistry;
pub use subscriber::{EventSink, ReleaseSignal, SinkError, Subscriber, SubscriberId, WsSink};
