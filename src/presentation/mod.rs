//! Presentation Layer
//!
//! HTTP routes, middleware and the flash WebSocket feed.

pub mod http;
pub mod middleware;
pub mod websocket;
