//! # Chattr Server Library
//!
//! The real-time distribution and notification pipeline of the Chattr social
//! backend:
//! - Flash feed: a WebSocket broadcast of global activity events
//! - Notifications: persisted inbox rows mirrored to devices by push
//! - Mentions: `@username` tokens turned into notifications
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, value objects and repository traits
//! - **Application Layer**: Notification, mention and activity services
//! - **Infrastructure Layer**: PostgreSQL, push provider and metrics
//! - **Presentation Layer**: HTTP handlers and the flash broadcast hub
//!
//! ## Module Structure
//!
//! ```text
//! chattr_server/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, mention scanning
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, push provider, metrics
//! +-- presentation/   HTTP routes, middleware, flash hub
//! +-- shared/         Errors and validation helpers
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
