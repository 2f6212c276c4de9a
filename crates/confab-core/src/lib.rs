//! Core engine for Confab.
//!
//! Pure domain logic with no I/O: history normalization and cleanup, the
//! provider gateway policy, turn selection, auto-flow scheduling and
//! response orchestration. Concrete HTTP backends live in confab-infra and
//! plug in through [`llm::ProviderFactory`].

pub mod chat;
pub mod history;
pub mod llm;
pub mod orchestration;
pub mod turn;
