//! Provider construction keyed on [`ProviderKind`].

use secrecy::SecretString;

use confab_types::llm::{LlmError, ProviderKind};

use super::box_provider::BoxChatProvider;

/// Builds a boxed provider for one call.
///
/// The credential is whatever the caller resolved for `kind`; factories
/// must not look anywhere else for one.
pub trait ProviderFactory: Send + Sync {
    fn create(
        &self,
        kind: ProviderKind,
        credential: Option<&SecretString>,
    ) -> Result<BoxChatProvider, LlmError>;
}
