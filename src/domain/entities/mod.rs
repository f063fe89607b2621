//! # Domain Entities
//!
//! Entities the notification pipeline reads or writes. Both map to database
//! tables; the `users` table is owned by the account handlers and only read
//! here (plus the push token column).
//!
//! - **User**: Identity used to resolve mentions, name actors and find push targets
//! - **Notification**: Persisted per-recipient inbox entry
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer.

mod notification;
mod user;

pub use notification::{NewNotification, Notification, NotificationKind, NotificationRepository};
pub use user::{User, UserRepository};

#[cfg(test)]
pub use notification::MockNotificationRepository;
#[cfg(test)]
pub use user::MockUserRepository;
