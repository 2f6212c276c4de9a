//! History shaping for provider requests.
//!
//! - `normalizer`: message log -> provider-ready role sequence
//! - `cleaner`: strips author scaffolding the model echoes back

pub mod cleaner;
pub mod normalizer;

pub use cleaner::{clean, strip_self_reference};
pub use normalizer::normalize;
