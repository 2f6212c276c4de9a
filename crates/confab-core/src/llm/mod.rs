//! LLM provider abstractions for Confab.
//!
//! - `ChatProvider`: RPITIT trait for concrete backends
//! - `BoxChatProvider`: object-safe wrapper for dynamic dispatch
//! - `ProviderFactory`: builds a backend per provider kind
//! - `ProviderGateway`: normalization, retry-on-429 and output cleanup

pub mod box_provider;
pub mod factory;
pub mod gateway;
pub mod provider;

pub use box_provider::BoxChatProvider;
pub use factory::ProviderFactory;
pub use gateway::{GatewayRequest, ProviderGateway};
pub use provider::ChatProvider;
