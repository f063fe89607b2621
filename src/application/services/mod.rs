//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **NotificationService**: Persisted notifications plus best-effort push (the delivery gateway)
//! - **MentionService**: `@username` scanning and mention notifications
//! - **ActivityService**: Canonical notifications per domain activity and flash broadcasts

pub mod activity_service;
pub mod mention_service;
pub mod notification_service;

// Re-export notification service types
pub use notification_service::{
    deliver_push, NotificationDto, NotificationError, NotificationService, NotificationServiceImpl,
    PushDelivery,
};

// Re-export mention service types
pub use mention_service::{MentionError, MentionService, MentionServiceImpl};

// Re-export activity service types
pub use activity_service::{ActivityError, ActivityService, ActivityServiceImpl, EventPublisher};

#[cfg(test)]
pub use activity_service::MockEventPublisher;
#[cfg(test)]
pub use notification_service::MockNotificationService;
