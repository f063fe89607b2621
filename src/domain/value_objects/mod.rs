//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **BroadcastEvent**: Global activity event fanned out to live subscribers
//! - **PushTarget / PushMessage**: Device token and provider-agnostic push payload
//! - **Activity**: Domain actions that notify a single recipient

mod activity;
mod broadcast_event;
mod push;

pub use activity::*;
pub use broadcast_event::*;
pub use push::*;
