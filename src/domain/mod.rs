//! # Domain Layer
//!
//! Core types of the real-time distribution and notification pipeline.
//! Independent of the HTTP framework, the database driver and the push provider.
//!
//! ## Structure
//!
//! - **entities**: User identity and persisted Notification
//! - **value_objects**: BroadcastEvent, PushTarget/PushMessage, Activity
//! - **services**: Mention scanning
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Values are immutable once built

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
