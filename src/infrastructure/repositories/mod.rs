//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **UserRepository** - Identity lookups and push token updates
//! - **NotificationRepository** - Notification inbox rows
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgNotificationRepository, PgUserRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let user_repo = PgUserRepository::new(pool.clone());
//!     let notification_repo = PgNotificationRepository::new(pool);
//! }
//! ```

pub mod notification_repository;
pub mod user_repository;

pub use notification_repository::PgNotificationRepository;
pub use user_repository::PgUserRepository;
