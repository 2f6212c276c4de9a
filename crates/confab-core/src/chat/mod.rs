//! Conversation lifecycle helpers.
//!
//! - `tree`: parent links, branching, duplication and removal

pub mod tree;
