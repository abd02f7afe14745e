//! The [`GroupFolders`] service and its builder.

mod access;
mod admin;
mod rules;

use std::path::PathBuf;
use std::sync::Arc;

use acl::{AclManager, MemoryRuleStore, RuleStore};
use folders::{Directory, FolderRegistry};
use mounts::{DiskUsage, MemoryUsage, MountOptions, MountResolver, StorageRoot, UsageProvider};

use crate::error::EngineResult;
use crate::guard::{DEFAULT_TEMPLATE_EXTENSIONS, TemplateGuard};

pub use admin::FolderDetails;
pub use rules::MappingSearch;

/// Group whose members are global administrators unless configured
/// otherwise.
pub const DEFAULT_ADMIN_GROUP: &str = "admin";

/// Engine-wide settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Members of this group may manage ACLs of every folder.
    pub admin_group: String,
    /// Whether folder roots may be reshared.
    pub allow_root_share: bool,
    /// File extensions accepted in template-only folders.
    pub template_extensions: Vec<String>,
    /// Directory holding folder content, created on first use.
    pub storage_root: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            admin_group: DEFAULT_ADMIN_GROUP.to_owned(),
            allow_root_share: true,
            template_extensions: DEFAULT_TEMPLATE_EXTENSIONS.map(str::to_owned).to_vec(),
            storage_root: None,
        }
    }
}

/// Permission and mount engine for group folders.
///
/// The service owns the folder registry and the ACL manager and borrows the
/// host's identity provider, usage accounting and rule storage through trait
/// objects. Every method is safe to call concurrently.
pub struct GroupFolders {
    registry: FolderRegistry,
    acl: AclManager,
    resolver: MountResolver,
    guard: TemplateGuard,
    settings: Settings,
}

impl GroupFolders {
    /// Creates an engine with default settings, in-memory rule storage and
    /// in-memory usage accounting.
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        let settings = Settings::default();
        let resolver = MountResolver::new(directory, Arc::new(MemoryUsage::new()));
        Self {
            registry: FolderRegistry::new(),
            acl: AclManager::new(Arc::new(MemoryRuleStore::new())),
            resolver,
            guard: TemplateGuard::default(),
            settings,
        }
    }

    /// Starts a builder over `directory`.
    #[must_use]
    pub fn builder(directory: Arc<dyn Directory>) -> GroupFoldersBuilder {
        GroupFoldersBuilder::new(directory)
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Folder registry.
    #[must_use]
    pub const fn registry(&self) -> &FolderRegistry {
        &self.registry
    }

    /// ACL manager.
    #[must_use]
    pub const fn acl(&self) -> &AclManager {
        &self.acl
    }

    /// Mount resolver.
    #[must_use]
    pub const fn resolver(&self) -> &MountResolver {
        &self.resolver
    }

    /// Template file-type guard.
    #[must_use]
    pub const fn guard(&self) -> &TemplateGuard {
        &self.guard
    }
}

impl std::fmt::Debug for GroupFolders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupFolders")
            .field("folders", &self.registry.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Builder for [`GroupFolders`].
pub struct GroupFoldersBuilder {
    directory: Arc<dyn Directory>,
    usage: Option<Arc<dyn UsageProvider>>,
    rules: Option<Arc<dyn RuleStore>>,
    settings: Settings,
}

impl GroupFoldersBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self {
            directory,
            usage: None,
            rules: None,
            settings: Settings::default(),
        }
    }

    /// Uses `usage` for quota accounting.
    ///
    /// Without it, usage is measured on disk when a storage root is set and
    /// tracked in memory otherwise.
    #[must_use]
    pub fn usage(mut self, usage: Arc<dyn UsageProvider>) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Stores ACL rules in `store` instead of memory.
    #[must_use]
    pub fn rule_store(mut self, store: Arc<dyn RuleStore>) -> Self {
        self.rules = Some(store);
        self
    }

    /// Replaces every setting at once.
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the administrator group.
    #[must_use]
    pub fn admin_group(mut self, group: impl Into<String>) -> Self {
        self.settings.admin_group = group.into();
        self
    }

    /// Allows or forbids resharing folder roots.
    #[must_use]
    pub const fn allow_root_share(mut self, allow: bool) -> Self {
        self.settings.allow_root_share = allow;
        self
    }

    /// Sets the extensions accepted in template-only folders.
    #[must_use]
    pub fn template_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.template_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Places folder content below `root`.
    #[must_use]
    pub fn storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.settings.storage_root = Some(root.into());
        self
    }

    /// Builds the engine. Fails with `InvalidArgument` when a template
    /// extension is malformed.
    pub fn build(self) -> EngineResult<GroupFolders> {
        let guard = TemplateGuard::new(&self.settings.template_extensions)?;
        let storage = self
            .settings
            .storage_root
            .as_ref()
            .map(|root| Arc::new(StorageRoot::new(root)));

        let usage: Arc<dyn UsageProvider> = match (self.usage, &storage) {
            (Some(usage), _) => usage,
            (None, Some(root)) => Arc::new(DiskUsage::new(Arc::clone(root))),
            (None, None) => Arc::new(MemoryUsage::new()),
        };

        let mut resolver = MountResolver::new(self.directory, usage).with_options(MountOptions {
            allow_root_share: self.settings.allow_root_share,
        });
        if let Some(root) = storage {
            resolver = resolver.with_storage_root(root);
        }

        let store = self
            .rules
            .unwrap_or_else(|| Arc::new(MemoryRuleStore::new()));

        Ok(GroupFolders {
            registry: FolderRegistry::new(),
            acl: AclManager::new(store),
            resolver,
            guard,
            settings: self.settings,
        })
    }
}

impl std::fmt::Debug for GroupFoldersBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupFoldersBuilder")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
