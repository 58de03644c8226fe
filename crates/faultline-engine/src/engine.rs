//! Error engine: the context object owning all dispatch state.
//!
//! [`ErrorEngine::global`] is the process-wide instance. Independent
//! instances from [`ErrorEngine::new`] share nothing with it and are what
//! tests use for isolation.

use std::future::Future;
use std::sync::{Arc, LazyLock};

use futures::Stream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use faultline_core::config::hooks::HookConfig;
use faultline_core::error::EngineError;
use faultline_core::raised::{ErrorLineage, Raised};

use crate::channel::AsyncErrorChannel;
use crate::dispatcher::{Dispatcher, Recovery};
use crate::hooks::manager::GlobalHookManager;
use crate::hooks::process::NotificationSources;
use crate::policy::PolicyBuilder;
use crate::registry::HandlerRegistry;
use crate::supervise;

static GLOBAL: LazyLock<ErrorEngine> =
    LazyLock::new(|| ErrorEngine::with_sources(NotificationSources::process()));

/// Owns the handler registry, dispatcher, global hooks, and error channel.
#[derive(Debug)]
pub struct ErrorEngine {
    /// Policy store.
    registry: Arc<HandlerRegistry>,
    /// Dispatcher over `registry`.
    dispatcher: Arc<Dispatcher>,
    /// Out-of-band error queue.
    channel: Arc<AsyncErrorChannel>,
    /// Global hook lifecycle.
    hooks: GlobalHookManager,
}

impl ErrorEngine {
    /// Creates an engine whose hooks listen to private sources.
    pub fn new() -> Self {
        Self::with_sources(NotificationSources::isolated())
    }

    /// Creates an engine whose hooks listen to `sources`.
    pub fn with_sources(sources: NotificationSources) -> Self {
        let registry = Arc::new(HandlerRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));
        let channel = Arc::new(AsyncErrorChannel::new());
        let hooks = GlobalHookManager::new(Arc::clone(&dispatcher), Arc::clone(&channel), sources);

        Self {
            registry,
            dispatcher,
            channel,
            hooks,
        }
    }

    /// Returns the process-wide engine.
    pub fn global() -> &'static ErrorEngine {
        &GLOBAL
    }

    /// Activates global hooks as described by `config`.
    pub fn apply_config(&self, config: &HookConfig) {
        if config.universal {
            self.initialize_universal_handling();
        } else if config.enabled {
            self.enable_global_handling(config.swallow);
        }
    }

    // ── Registration ─────────────────────────────────────────────

    /// Starts (and immediately registers) the policy for `E`.
    pub fn policy<E: ErrorLineage>(&self) -> PolicyBuilder<'_, E> {
        PolicyBuilder::new(&self.registry)
    }

    /// Removes every registered policy.
    pub fn clear_handlers(&self) {
        self.registry.clear();
    }

    // ── Dispatch ─────────────────────────────────────────────────

    /// See [`Dispatcher::run`].
    pub fn run<R, E, F>(&self, work: F) -> Result<R, Raised>
    where
        R: 'static,
        E: Into<Raised>,
        F: FnOnce() -> Result<R, E>,
    {
        self.dispatcher.run(work)
    }

    /// See [`Dispatcher::run_async`].
    pub async fn run_async<R, E, Fut>(&self, work: Fut) -> Result<R, Raised>
    where
        R: 'static,
        E: Into<Raised>,
        Fut: Future<Output = Result<R, E>>,
    {
        self.dispatcher.run_async(work).await
    }

    /// See [`Dispatcher::handle`].
    pub fn handle<R: 'static>(&self, error: Raised) -> Result<R, Raised> {
        self.dispatcher.handle(error)
    }

    /// See [`Dispatcher::handle_any`].
    pub fn handle_any(&self, error: Raised) -> Result<Recovery, Raised> {
        self.dispatcher.handle_any(error)
    }

    // ── Global hooks ─────────────────────────────────────────────

    /// See [`GlobalHookManager::enable`].
    pub fn enable_global_handling(&self, swallow: bool) -> bool {
        self.hooks.enable(swallow)
    }

    /// See [`GlobalHookManager::disable`].
    pub fn disable_global_handling(&self) -> bool {
        self.hooks.disable()
    }

    /// See [`GlobalHookManager::initialize_universal`].
    pub fn initialize_universal_handling(&self) -> bool {
        self.hooks.initialize_universal()
    }

    /// Disables every hook and clears every policy.
    ///
    /// Errors already queued on the channel are left for consumers.
    pub fn shutdown(&self) {
        self.hooks.reset();
        self.registry.clear();
        info!("Error engine shut down");
    }

    /// Spawns `future` detached; its failure is reported as unobserved.
    pub fn spawn_detached<F, T, E>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Into<Raised> + Send + 'static,
    {
        supervise::spawn_detached(Arc::clone(&self.hooks.sources().unobserved), future)
    }

    // ── Error channel ────────────────────────────────────────────

    /// See [`AsyncErrorChannel::enqueue`].
    pub fn enqueue_exception(&self, error: Raised) {
        self.channel.enqueue(error);
    }

    /// See [`AsyncErrorChannel::write`].
    pub async fn write_exception(&self, error: Raised) {
        self.channel.write(error).await;
    }

    /// See [`AsyncErrorChannel::consume`].
    pub fn read_exceptions(
        &self,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<Raised, EngineError>> + Send + 'static {
        self.channel.consume(cancel)
    }

    // ── Accessors ────────────────────────────────────────────────

    /// Returns the policy store.
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Returns the error channel.
    pub fn channel(&self) -> &Arc<AsyncErrorChannel> {
        &self.channel
    }

    /// Returns the global hook manager.
    pub fn hooks(&self) -> &GlobalHookManager {
        &self.hooks
    }
}

impl Default for ErrorEngine {
    fn default() -> Self {
        Self::new()
    }
}
