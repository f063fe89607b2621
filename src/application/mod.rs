//! Application Layer
//!
//! Contains the notification pipeline services and data transfer objects
//! (DTOs). This layer sits between the presentation layer (HTTP handlers,
//! flash feed) and the domain layer.

pub mod dto;
pub mod services;
