//! # Domain Services
//!
//! Domain services encapsulate business rules that don't naturally belong to
//! a single entity.
//!
//! ## Services
//!
//! - **MentionParser**: Lazy `@username` token scanning over free text

mod mention_parser;

pub use mention_parser::*;
