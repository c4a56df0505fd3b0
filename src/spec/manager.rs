//! Spec manager: looks up command specs by name and expands deferred specs
//!
//! The completion core only ever reads specs through the [`SpecManager`]
//! trait. [`SpecRegistry`] is the bundled implementation: in-memory
//! registrations backed by an optional directory of JSON documents.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::debug;

use super::{CommandSpec, ShortCommandSpec};
use crate::error::{Result, SpecError};

/// Source of command specs
#[async_trait]
pub trait SpecManager: Send + Sync {
    /// Look up the spec of a top-level command
    ///
    /// # Returns
    /// * `Result<Option<Arc<CommandSpec>>>` - The spec, `None` if unknown
    async fn get_command_spec(&self, name: &str) -> Result<Option<Arc<CommandSpec>>>;

    /// Replace a shallow spec with its full definition
    ///
    /// Specs without a `deferred_spec_ref` are returned unchanged.
    async fn resolve_full(&self, spec: Arc<CommandSpec>) -> Result<Arc<CommandSpec>>;

    /// Look up the name/description summary of a command
    async fn get_short_spec(&self, name: &str) -> Result<Option<ShortCommandSpec>> {
        Ok(self
            .get_command_spec(name)
            .await?
            .map(|spec| ShortCommandSpec {
                names: spec.names.clone(),
                description: spec.description.clone(),
            }))
    }
}

/// Spec cache keyed by command name or deferred reference
///
/// `None` records a name with no document, so misses are not reloaded.
type SpecCache = RwLock<SpecMap>;

type SpecMap = HashMap<String, Option<Arc<CommandSpec>>>;

/// In-memory spec registry with an optional JSON directory behind it
///
/// `<directory>/<command>.json` holds a command spec and
/// `<directory>/<reference>.json` holds the full definition a
/// `deferredSpecRef` points to. Documents are loaded on first use and cached,
/// as is the absence of a document.
#[derive(Default)]
pub struct SpecRegistry {
    /// Directory of JSON spec documents
    directory: Option<PathBuf>,
    /// Command specs by name
    commands: SpecCache,
    /// Full definitions by deferred reference
    deferred: SpecCache,
}

impl SpecRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry backed by a directory of JSON specs
    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
            ..Self::default()
        }
    }

    /// Register a spec under every one of its names
    pub fn with_spec(self, spec: CommandSpec) -> Self {
        let spec = Arc::new(spec);
        {
            let mut commands = write(&self.commands);
            for name in &spec.names {
                commands.insert(name.clone(), Some(Arc::clone(&spec)));
            }
        }
        self
    }

    /// Register the full definition behind a deferred reference
    pub fn with_deferred(self, reference: impl Into<String>, spec: CommandSpec) -> Self {
        write(&self.deferred).insert(reference.into(), Some(Arc::new(spec)));
        self
    }

    /// Backing directory, if any
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Number of cached command specs, misses excluded
    pub fn cached_commands(&self) -> usize {
        read(&self.commands).values().flatten().count()
    }

    /// Load a spec document from the backing directory
    ///
    /// # Returns
    /// * `Result<Option<CommandSpec>>` - `None` when there is no directory or no document
    async fn load_document(&self, key: &str) -> Result<Option<CommandSpec>> {
        let Some(directory) = &self.directory else {
            return Ok(None);
        };
        if !is_safe_key(key) {
            return Ok(None);
        }

        let path = directory.join(format!("{key}.json"));
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        debug!("loaded spec document {}", path.display());
        let spec = CommandSpec::from_json(&content).map_err(|e| SpecError::InvalidFormat {
            name: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(spec))
    }

    /// Cached lookup falling back to the backing directory
    async fn lookup(&self, cache: &SpecCache, key: &str) -> Result<Option<Arc<CommandSpec>>> {
        let cached = read(cache).get(key).cloned();
        if let Some(spec) = cached {
            return Ok(spec);
        }

        let spec = self.load_document(key).await?.map(Arc::new);
        write(cache).insert(key.to_string(), spec.clone());
        Ok(spec)
    }
}

#[async_trait]
impl SpecManager for SpecRegistry {
    async fn get_command_spec(&self, name: &str) -> Result<Option<Arc<CommandSpec>>> {
        // Command names never address nested documents
        if name.is_empty() || name.contains('/') {
            return Ok(None);
        }
        self.lookup(&self.commands, name).await
    }

    async fn resolve_full(&self, spec: Arc<CommandSpec>) -> Result<Arc<CommandSpec>> {
        let Some(reference) = spec.deferred_spec_ref.as_deref() else {
            return Ok(spec);
        };

        let full = self
            .lookup(&self.deferred, reference)
            .await?
            .ok_or_else(|| SpecError::DeferredUnresolved(reference.to_string()))?;

        if full.names.is_empty() {
            // The shallow spec is what the user typed; keep its names
            let mut named = (*full).clone();
            named.names = spec.names.clone();
            return Ok(Arc::new(named));
        }
        Ok(full)
    }
}

/// Reject keys that could escape the spec directory
fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && key.split('/').all(|part| !part.is_empty() && part != "." && part != "..")
}

fn read(cache: &SpecCache) -> std::sync::RwLockReadGuard<'_, SpecMap> {
    cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(cache: &SpecCache) -> std::sync::RwLockWriteGuard<'_, SpecMap> {
    cache.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionError;

    fn write_spec(dir: &Path, key: &str, json: &str) {
        let path = dir.join(format!("{key}.json"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, json).unwrap();
    }

    #[tokio::test]
    async fn test_registered_spec_found_by_every_name() {
        let registry = SpecRegistry::new()
            .with_spec(CommandSpec {
                names: vec!["python".to_string(), "python3".to_string()],
                ..CommandSpec::default()
            });

        let spec = registry.get_command_spec("python3").await.unwrap().unwrap();
        assert_eq!(spec.name(), "python");
        assert!(registry.get_command_spec("ruby").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_loads_and_caches_directory_specs() {
        let dir = tempfile::tempdir().unwrap();
        write_spec(dir.path(), "ls", r#"{"names": ["ls"], "description": "list"}"#);

        let registry = SpecRegistry::with_directory(dir.path());
        let spec = registry.get_command_spec("ls").await.unwrap().unwrap();
        assert_eq!(spec.description.as_deref(), Some("list"));
        assert_eq!(registry.cached_commands(), 1);

        // Served from the cache after the document is gone
        std::fs::remove_file(dir.path().join("ls.json")).unwrap();
        assert!(registry.get_command_spec("ls").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_document_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let registry = SpecRegistry::with_directory(dir.path());
        assert!(registry.get_command_spec("hg").await.unwrap().is_none());

        // A document appearing later is not read: the miss is cached
        write_spec(dir.path(), "hg", r#"{"names": ["hg"]}"#);
        assert!(registry.get_command_spec("hg").await.unwrap().is_none());
        assert_eq!(registry.cached_commands(), 0);
    }

    #[tokio::test]
    async fn test_invalid_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_spec(dir.path(), "bad", "{ not json");

        let registry = SpecRegistry::with_directory(dir.path());
        let err = registry.get_command_spec("bad").await.unwrap_err();
        assert!(matches!(
            err,
            CompletionError::Spec(SpecError::InvalidFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_path_like_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let registry = SpecRegistry::with_directory(dir.path());

        assert!(registry.get_command_spec("../etc/passwd").await.unwrap().is_none());
        assert!(registry.get_command_spec("").await.unwrap().is_none());
        assert!(!is_safe_key("git/../../x"));
        assert!(is_safe_key("git/commit"));
    }

    #[tokio::test]
    async fn test_resolve_full_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_spec(
            dir.path(),
            "git/commit",
            r#"{"options": [{"names": ["--amend"]}]}"#,
        );

        let registry = SpecRegistry::with_directory(dir.path());
        let shallow = Arc::new(CommandSpec::new("commit").with_deferred_ref("git/commit"));
        let full = registry.resolve_full(shallow).await.unwrap();

        assert_eq!(full.name(), "commit");
        assert!(full.options[0].has_name("--amend"));
    }

    #[tokio::test]
    async fn test_resolve_full_without_reference_is_identity() {
        let registry = SpecRegistry::new();
        let spec = Arc::new(CommandSpec::new("status"));
        let resolved = registry.resolve_full(Arc::clone(&spec)).await.unwrap();
        assert!(Arc::ptr_eq(&spec, &resolved));
    }

    #[tokio::test]
    async fn test_unresolvable_reference() {
        let registry = SpecRegistry::new();
        let shallow = Arc::new(CommandSpec::new("push").with_deferred_ref("git/push"));
        let err = registry.resolve_full(shallow).await.unwrap_err();
        assert!(matches!(
            err,
            CompletionError::Spec(SpecError::DeferredUnresolved(_))
        ));
    }

    #[tokio::test]
    async fn test_short_spec_from_full_spec() {
        let registry =
            SpecRegistry::new().with_spec(CommandSpec::new("make").with_description("build"));
        let short = registry.get_short_spec("make").await.unwrap().unwrap();
        assert_eq!(short.names, vec!["make"]);
        assert_eq!(short.description.as_deref(), Some("build"));
    }
}
