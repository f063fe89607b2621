//! HTTP and WebSocket API tests

mod flash_tests;
mod health_tests;
mod notification_tests;
