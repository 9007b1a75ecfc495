pub mod auth;
pub mod client;
pub mod config;
pub mod diff;
pub mod fetch;
pub mod pacing;
pub mod places;
pub mod session;

pub use client::*;
pub use config::*;
pub use fetch::*;
pub use session::*;
