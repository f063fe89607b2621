//! End-to-end pipeline scenarios over in-memory collaborators

mod broadcast_tests;
mod mention_tests;
mod notify_tests;
