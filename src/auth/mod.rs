//! Authentication module for the Geekylikes server
//!
//! This module handles user authentication, token management,
//! and session handling.

pub mod handlers;
mod identity;
mod rate_limit;
mod service;

pub use identity::CurrentUser;
pub use rate_limit::{RateLimiter, RateLimitConfig};
pub use service::{AuthService, Claims};
