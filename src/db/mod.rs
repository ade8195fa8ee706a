//! Database module for the Geekylikes server
//!
//! This module handles database connections and the data access layer for
//! users, sessions, developers, avatars, languages, geekouts, and
//! relationships.

pub mod models;
pub mod operations;

pub use models::{
    Avatar, Developer, DeveloperProfile, DeveloperUpdate, Geekout, Language, NewDeveloper,
    Relationship, RelationshipStatus, User, UserSession,
};
pub use operations::DbOperations;
