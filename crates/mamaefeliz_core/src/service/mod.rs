//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate persistence calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod post_store;
