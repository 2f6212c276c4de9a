//! BoxChatProvider -- object-safe dynamic dispatch wrapper for ChatProvider.
//!
//! 1. `ChatProviderDyn` is an object-safe mirror of [`ChatProvider`] with boxed futures
//! 2. Blanket-impl `ChatProviderDyn` for all `T: ChatProvider`
//! 3. `BoxChatProvider` wraps `Box<dyn ChatProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use confab_types::llm::{ChatRequest, LlmError, ProviderKind};

use super::provider::ChatProvider;

/// Object-safe version of [`ChatProvider`] with boxed futures.
pub trait ChatProviderDyn: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn name(&self) -> &str;

    fn send_boxed<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;
}

impl<T: ChatProvider> ChatProviderDyn for T {
    fn kind(&self) -> ProviderKind {
        ChatProvider::kind(self)
    }

    fn name(&self) -> &str {
        ChatProvider::name(self)
    }

    fn send_boxed<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(self.send(request))
    }
}

/// Type-erased chat provider for runtime backend selection.
///
/// Since `ChatProvider` uses RPITIT it cannot be a trait object directly;
/// this wrapper exposes the same surface over `dyn ChatProviderDyn`.
pub struct BoxChatProvider {
    inner: Box<dyn ChatProviderDyn + Send + Sync>,
}

impl BoxChatProvider {
    /// Wrap a concrete `ChatProvider` in a type-erased box.
    pub fn new<T: ChatProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.inner.kind()
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn send(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.inner.send_boxed(request).await
    }
}

impl std::fmt::Debug for BoxChatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxChatProvider")
            .field("name", &self.name())
            .finish()
    }
}
