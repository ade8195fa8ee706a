//! Developer profile module
//!
//! CRUD over developer profiles with friend-aware visibility, language
//! tagging, avatar management, and cohort/language/geekout queries.

pub mod handlers;
pub mod views;

pub use views::{FriendDeveloper, PublicDeveloper};
