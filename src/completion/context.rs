//! Request-scoped completion context
//!
//! One [`RequestContext`] exists per completion request. It owns the handles
//! to the spec manager and runtime data provider, and the shell environment
//! snapshot, which is fetched at most once per request. Every boundary call
//! goes through here and degrades to an empty value on failure.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::runtime::{RuntimeDataProvider, ShellEnvironment};
use crate::spec::{CommandSpec, GeneratorSpec, ShortCommandSpec, SpecManager, Suggestion};

/// Collaborators and cached state for one completion request
pub struct RequestContext {
    /// Spec lookups and deferred-spec resolution
    specs: Arc<dyn SpecManager>,
    /// Filesystem, environment, and generator access
    runtime: Arc<dyn RuntimeDataProvider>,
    /// Shell environment snapshot, fetched on first use
    environment: OnceCell<Arc<ShellEnvironment>>,
}

impl RequestContext {
    /// Create a context for a new request
    pub fn new(specs: Arc<dyn SpecManager>, runtime: Arc<dyn RuntimeDataProvider>) -> Self {
        Self {
            specs,
            runtime,
            environment: OnceCell::new(),
        }
    }

    /// Expand a shallow spec, keeping the shallow one if expansion fails
    pub async fn resolve_full(&self, spec: Arc<CommandSpec>) -> Arc<CommandSpec> {
        if spec.deferred_spec_ref.is_none() {
            return spec;
        }
        match self.specs.resolve_full(Arc::clone(&spec)).await {
            Ok(full) => full,
            Err(e) => {
                warn!("keeping shallow spec for '{}': {}", spec.name(), e);
                spec
            }
        }
    }

    /// Full spec of a command, trying aliases when the name itself has none
    pub async fn command_spec(&self, name: &str) -> Option<Arc<CommandSpec>> {
        if let Some(spec) = self.direct_spec(name).await {
            return Some(self.resolve_full(spec).await);
        }

        let environment = self.environment().await;
        let target = environment.alias(name)?.command_word()?;
        if target == name {
            return None;
        }
        debug!("resolving alias '{}' to '{}'", name, target);
        let spec = self.direct_spec(target).await?;
        Some(self.resolve_full(spec).await)
    }

    async fn direct_spec(&self, name: &str) -> Option<Arc<CommandSpec>> {
        match self.specs.get_command_spec(name).await {
            Ok(spec) => spec,
            Err(e) => {
                warn!("spec lookup for '{}' failed: {}", name, e);
                None
            }
        }
    }

    /// Summary spec of a command, `None` on any failure
    pub async fn short_spec(&self, name: &str) -> Option<ShortCommandSpec> {
        match self.specs.get_short_spec(name).await {
            Ok(short) => short,
            Err(e) => {
                debug!("short spec lookup for '{}' failed: {}", name, e);
                None
            }
        }
    }

    /// Shell environment snapshot for this request
    pub async fn environment(&self) -> Arc<ShellEnvironment> {
        let environment = self
            .environment
            .get_or_init(|| async {
                match self.runtime.shell_environment().await {
                    Ok(environment) => Arc::new(environment),
                    Err(e) => {
                        warn!("shell environment unavailable: {}", e);
                        Arc::new(ShellEnvironment::default())
                    }
                }
            })
            .await;
        Arc::clone(environment)
    }

    /// Directory entries, empty when the directory cannot be listed
    pub async fn list_directory(&self, path: &str) -> Vec<String> {
        match self.runtime.list_directory(path).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("no path suggestions: {}", e);
                Vec::new()
            }
        }
    }

    /// Generator output, empty when the generator fails
    pub async fn run_generator(&self, generator: &GeneratorSpec, typed: &str) -> Vec<Suggestion> {
        match self.runtime.run_generator(generator, typed).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!("generator produced no suggestions: {}", e);
                Vec::new()
            }
        }
    }
}
