//! Shared domain types for Confab.
//!
//! This crate contains the domain types used across the Confab workspace:
//! conversations, messages, provider identities, normalized turns, settings,
//! credentials and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, secrecy.

pub mod chat;
pub mod config;
pub mod credential;
pub mod error;
pub mod llm;
pub mod message;
