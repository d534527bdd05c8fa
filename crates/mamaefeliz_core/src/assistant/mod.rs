//! Chat assistant boundary and reply rendering helpers.
//!
//! # Responsibility
//! - Wrap the remote generative-AI collaborator behind a failure-absorbing
//!   service.
//! - Parse inline video markers out of reply text.

pub mod client;
pub mod markers;
pub mod video;
