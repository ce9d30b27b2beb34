//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use super::Interpreter;
use crate::eval_mode::EvalMode;
use crate::{DefaultPackager, Dispatcher, Packager, SharedRegistry, TypeProvider, TypeRegistry};

/// Builder for [`Interpreter`].
///
/// Unset collaborators fall back to an empty dispatcher, the root
/// [`DefaultPackager`] and an empty [`TypeRegistry`]. The mode defaults to
/// `EvalMode::Unbounded`.
#[derive(Default)]
pub struct InterpreterBuilder {
    dispatcher: Option<SharedRegistry<Dispatcher>>,
    packager: Option<SharedRegistry<dyn Packager>>,
    provider: Option<SharedRegistry<dyn TypeProvider>>,
    mode: EvalMode,
    profile: bool,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder::default()
    }

    /// Set the function dispatcher. Registration must be complete.
    #[must_use]
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(SharedRegistry::new(dispatcher));
        self
    }

    /// Share a dispatcher already used by other interpreters.
    #[must_use]
    pub fn shared_dispatcher(mut self, dispatcher: SharedRegistry<Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    #[must_use]
    pub fn packager(mut self, packager: impl Packager + 'static) -> Self {
        let boxed: Box<dyn Packager> = Box::new(packager);
        self.packager = Some(SharedRegistry::from(boxed));
        self
    }

    #[must_use]
    pub fn provider(mut self, provider: impl TypeProvider + 'static) -> Self {
        let boxed: Box<dyn TypeProvider> = Box::new(provider);
        self.provider = Some(SharedRegistry::from(boxed));
        self
    }

    /// Set the evaluation mode.
    #[must_use]
    pub fn mode(mut self, mode: EvalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Collect `EvalCounters` during evaluation.
    #[must_use]
    pub fn profile(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    pub fn build(self) -> Interpreter {
        let packager = self.packager.unwrap_or_else(|| {
            let boxed: Box<dyn Packager> = Box::new(DefaultPackager);
            SharedRegistry::from(boxed)
        });
        let provider = self.provider.unwrap_or_else(|| {
            let boxed: Box<dyn TypeProvider> = Box::new(TypeRegistry::new());
            SharedRegistry::from(boxed)
        });
        let dispatcher = self
            .dispatcher
            .unwrap_or_else(|| SharedRegistry::new(Dispatcher::new()));

        Interpreter {
            mode: self.mode,
            profile: self.profile,
            ..Interpreter::new(dispatcher, packager, provider)
        }
    }
}
