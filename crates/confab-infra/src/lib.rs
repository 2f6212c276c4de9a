//! Infrastructure layer for Confab.
//!
//! Contains the concrete pieces behind the core's seams: HTTP chat
//! backends and their factory, settings and credential loading, data
//! directory resolution and the JSON conversation store.

pub mod config;
pub mod credential;
pub mod llm;
pub mod paths;
pub mod store;
