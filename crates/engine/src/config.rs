//! Configuration file parsing for `groupfolders.conf`.
//!
//! The file is INI-like: global directives first, then
//! one section per folder named after its mount point.
//!
//! # Format
//!
//! ```ini
//! # Global parameters
//! admin group = admin
//! allow root share = yes
//! template extensions = ott ots otp
//! storage root = /srv/groupfolders
//! members = staff: alice bob
//! members = interns: jo
//!
//! [Marketing]
//! groups = staff:rucds, interns:ru
//! users = carol:r
//! quota = 10G
//! acl = yes
//! manage acl = @staff, carol
//! rule = /drafts @interns -u
//! ```
//!
//! # Example
//!
//! ```no_run
//! use engine::EngineConfig;
//! use std::path::Path;
//!
//! let config = EngineConfig::from_file(Path::new("/etc/groupfolders.conf"))?;
//! for folder in config.folders() {
//!     println!("{} ({} groups)", folder.mount_point(), folder.groups().len());
//! }
//! # Ok::<(), engine::ConfigError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use folders::{MemoryDirectory, Quota};
use permissions::{FolderId, Mapping, PermissionMask};

use crate::error::EngineResult;
use crate::service::{DEFAULT_ADMIN_GROUP, GroupFolders, Settings};

/// Category of a [`ConfigError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigErrorKind {
    /// The file could not be read.
    Io,
    /// A line is not well formed.
    Parse,
    /// A value is well formed but not acceptable.
    Validation,
}

/// Errors that can occur while parsing configuration files.
#[derive(Debug, Clone)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    line: Option<usize>,
    message: String,
    path: Option<PathBuf>,
}

impl ConfigError {
    fn io_error(path: &Path, source: &io::Error) -> Self {
        Self {
            kind: ConfigErrorKind::Io,
            line: None,
            message: format!("failed to read '{}': {source}", path.display()),
            path: Some(path.to_path_buf()),
        }
    }

    fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Parse,
            line: Some(line),
            message: message.into(),
            path: Some(path.to_path_buf()),
        }
    }

    fn validation_error(path: &Path, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Validation,
            line: Some(line),
            message: message.into(),
            path: Some(path.to_path_buf()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> ConfigErrorKind {
        self.kind
    }

    /// Returns the line number where the error occurred, if available.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        self.line
    }

    /// Returns the configuration file path where the error occurred.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: ", path.display())?;
        }
        if let Some(line) = self.line {
            write!(f, "line {line}: ")?;
        }
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Global parameters, appearing before the first folder section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    admin_group: Option<String>,
    allow_root_share: Option<bool>,
    template_extensions: Option<Vec<String>>,
    storage_root: Option<PathBuf>,
    members: BTreeMap<String, BTreeSet<String>>,
}

impl GlobalConfig {
    /// Returns the administrator group (default: `admin`).
    #[must_use]
    pub fn admin_group(&self) -> &str {
        self.admin_group.as_deref().unwrap_or(DEFAULT_ADMIN_GROUP)
    }

    /// Returns whether folder roots may be reshared (default: true).
    #[must_use]
    pub fn allow_root_share(&self) -> bool {
        self.allow_root_share.unwrap_or(true)
    }

    /// Returns the template extensions, if specified.
    #[must_use]
    pub fn template_extensions(&self) -> Option<&[String]> {
        self.template_extensions.as_deref()
    }

    /// Returns the storage root, if specified.
    #[must_use]
    pub fn storage_root(&self) -> Option<&Path> {
        self.storage_root.as_deref()
    }

    /// Returns the group memberships declared with `members`.
    #[must_use]
    pub const fn members(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.members
    }
}

/// An ACL rule declared inside a folder section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleConfig {
    path: String,
    mapping: Mapping,
    allow: PermissionMask,
    deny: PermissionMask,
}

impl RuleConfig {
    /// Returns the folder-relative path of the rule.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the mapping the rule applies to.
    #[must_use]
    pub const fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Returns the bits the rule grants.
    #[must_use]
    pub const fn allow(&self) -> PermissionMask {
        self.allow
    }

    /// Returns the bits the rule revokes.
    #[must_use]
    pub const fn deny(&self) -> PermissionMask {
        self.deny
    }
}

/// Per-folder parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderConfig {
    mount_point: String,
    groups: Vec<(String, PermissionMask)>,
    users: Vec<(String, PermissionMask)>,
    quota: Quota,
    acl: bool,
    manage_acl: Vec<Mapping>,
    api_server: Option<String>,
    template_only: bool,
    rules: Vec<RuleConfig>,
}

impl FolderConfig {
    /// Returns the mount point (section name).
    #[must_use]
    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    /// Returns the applicable groups with their masks.
    #[must_use]
    pub fn groups(&self) -> &[(String, PermissionMask)] {
        &self.groups
    }

    /// Returns the applicable users with their masks.
    #[must_use]
    pub fn users(&self) -> &[(String, PermissionMask)] {
        &self.users
    }

    /// Returns the quota (default: unlimited).
    #[must_use]
    pub const fn quota(&self) -> Quota {
        self.quota
    }

    /// Returns whether ACL rules are enabled (default: false).
    #[must_use]
    pub const fn acl(&self) -> bool {
        self.acl
    }

    /// Returns the ACL managers.
    #[must_use]
    pub fn manage_acl(&self) -> &[Mapping] {
        &self.manage_acl
    }

    /// Returns the template server endpoint, if specified.
    #[must_use]
    pub fn api_server(&self) -> Option<&str> {
        self.api_server.as_deref()
    }

    /// Returns whether the folder only accepts templates (default: false).
    #[must_use]
    pub const fn template_only(&self) -> bool {
        self.template_only
    }

    /// Returns the ACL rules declared for the folder.
    #[must_use]
    pub fn rules(&self) -> &[RuleConfig] {
        &self.rules
    }
}

/// Complete configuration: global parameters and folders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    global: GlobalConfig,
    folders: Vec<FolderConfig>,
}

impl EngineConfig {
    /// Parses a configuration file from the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid syntax.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, &e))?;
        Self::parse(&contents, path)
    }

    /// Parses configuration from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input contains invalid syntax.
    pub fn parse(input: &str, path: &Path) -> Result<Self, ConfigError> {
        let config = Parser::new(input, path).parse()?;
        logging::trace_config!(
            path = %path.display(),
            folders = config.folders.len(),
            groups = config.global.members.len(),
            "config_parsed"
        );
        Ok(config)
    }

    /// Returns the global configuration.
    #[must_use]
    pub const fn global(&self) -> &GlobalConfig {
        &self.global
    }

    /// Returns all folder configurations, in file order.
    #[must_use]
    pub fn folders(&self) -> &[FolderConfig] {
        &self.folders
    }

    /// Finds a folder by mount point.
    #[must_use]
    pub fn get_folder(&self, mount_point: &str) -> Option<&FolderConfig> {
        self.folders.iter().find(|f| f.mount_point == mount_point)
    }

    /// Engine settings described by the global parameters.
    #[must_use]
    pub fn settings(&self) -> Settings {
        let mut settings = Settings {
            admin_group: self.global.admin_group().to_owned(),
            allow_root_share: self.global.allow_root_share(),
            storage_root: self.global.storage_root.clone(),
            ..Settings::default()
        };
        if let Some(extensions) = &self.global.template_extensions {
            settings.template_extensions.clone_from(extensions);
        }
        settings
    }

    /// Registers every `members` declaration with `directory`.
    pub fn populate_directory(&self, directory: &MemoryDirectory) {
        for (group, users) in &self.global.members {
            directory.add_group(group);
            for user in users {
                directory.add_member(group, user);
            }
        }
    }

    /// Creates the configured folders in `engine` and returns their ids in
    /// file order.
    ///
    /// Applicable rows are written without consulting the identity provider:
    /// the file is authoritative for folder configuration.
    ///
    /// # Errors
    ///
    /// Fails with `Conflict` when a mount point is already taken and with
    /// `InvalidArgument` when a value is rejected by the registry. Folders
    /// created before the failure are kept.
    pub fn seed(&self, engine: &GroupFolders) -> EngineResult<Vec<FolderId>> {
        let mut created = Vec::with_capacity(self.folders.len());
        for folder in &self.folders {
            let id = engine.create_folder(&folder.mount_point)?;
            let registry = engine.registry();
            for (group, mask) in &folder.groups {
                registry.set_group_permissions(id, group, *mask)?;
            }
            for (user, mask) in &folder.users {
                registry.set_user_permissions(id, user, *mask)?;
            }
            registry.set_quota_value(id, folder.quota)?;
            registry.set_acl_enabled(id, folder.acl)?;
            for mapping in &folder.manage_acl {
                registry.set_manage_acl(id, mapping, true)?;
            }
            registry.set_api_server(id, folder.api_server.as_deref())?;
            registry.set_template_only(id, folder.template_only)?;
            for rule in &folder.rules {
                engine.acl().set_rule(acl::AclRule::new(
                    id,
                    &rule.path,
                    rule.mapping.clone(),
                    rule.allow,
                    rule.allow | rule.deny,
                ))?;
            }
            logging::trace_config!(
                folder = %id,
                mount_point = %folder.mount_point,
                rules = folder.rules.len(),
                "folder_seeded"
            );
            created.push(id);
        }
        Ok(created)
    }
}

struct Parser<'a> {
    input: &'a str,
    path: &'a Path,
    line_number: usize,
}

impl<'a> Parser<'a> {
    const fn new(input: &'a str, path: &'a Path) -> Self {
        Self {
            input,
            path,
            line_number: 0,
        }
    }

    fn parse(&mut self) -> Result<EngineConfig, ConfigError> {
        let mut global = GlobalConfig::default();
        let mut folders = Vec::new();
        let mut current_folder: Option<FolderBuilder> = None;
        let mut section_names = HashMap::new();

        for line in self.input.lines() {
            self.line_number += 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                if let Some(builder) = current_folder.take() {
                    folders.push(builder.build());
                }

                let end = header.find(']').ok_or_else(|| {
                    ConfigError::parse_error(self.path, self.line_number, "unterminated folder header")
                })?;

                let name = header[..end].trim();
                if name.trim_matches('/').trim().is_empty() {
                    return Err(ConfigError::parse_error(
                        self.path,
                        self.line_number,
                        "folder mount point must be non-empty",
                    ));
                }

                if let Some(prev_line) = section_names.get(name) {
                    return Err(ConfigError::parse_error(
                        self.path,
                        self.line_number,
                        format!("duplicate folder '{name}' (previously defined at line {prev_line})"),
                    ));
                }
                section_names.insert(name.to_owned(), self.line_number);

                let trailing = header[end + 1..].trim();
                if !trailing.is_empty() && !trailing.starts_with('#') && !trailing.starts_with(';') {
                    return Err(ConfigError::parse_error(
                        self.path,
                        self.line_number,
                        "unexpected content after folder header",
                    ));
                }

                current_folder = Some(FolderBuilder::new(name.to_owned()));
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                ConfigError::parse_error(self.path, self.line_number, "expected 'key = value' format")
            })?;

            let key = key.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase();
            let value = value.trim();

            if let Some(builder) = current_folder.as_mut() {
                self.parse_folder_directive(builder, &key, value)?;
            } else {
                self.parse_global_directive(&mut global, &key, value)?;
            }
        }

        if let Some(builder) = current_folder {
            folders.push(builder.build());
        }

        Ok(EngineConfig { global, folders })
    }

    fn parse_global_directive(
        &self,
        global: &mut GlobalConfig,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        match key {
            "admin group" => {
                if value.is_empty() {
                    return Err(self.invalid("admin group must not be empty"));
                }
                global.admin_group = Some(value.to_owned());
            }
            "allow root share" => {
                global.allow_root_share = Some(self.parse_bool(value)?);
            }
            "template extensions" => {
                let extensions = Self::parse_list(value);
                if extensions.is_empty() {
                    return Err(self.invalid("template extensions must not be empty"));
                }
                global.template_extensions = Some(extensions);
            }
            "storage root" => {
                if value.is_empty() {
                    return Err(self.invalid("storage root must not be empty"));
                }
                global.storage_root = Some(PathBuf::from(value));
            }
            "members" => {
                let (group, users) = value
                    .split_once(':')
                    .ok_or_else(|| self.invalid("expected 'members = <group>: <user> ...'"))?;
                let group = group.trim();
                if group.is_empty() {
                    return Err(self.invalid("members group must not be empty"));
                }
                global
                    .members
                    .entry(group.to_owned())
                    .or_default()
                    .extend(Self::parse_list(users));
            }
            _ => {
                // Unknown global directives are ignored for forward compatibility
            }
        }
        Ok(())
    }

    fn parse_folder_directive(
        &self,
        builder: &mut FolderBuilder,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        match key {
            "groups" => {
                builder.groups = self.parse_grants(value)?;
            }
            "users" => {
                builder.users = self.parse_grants(value)?;
            }
            "quota" => {
                builder.quota = Some(self.parse_quota(value)?);
            }
            "acl" => {
                builder.acl = Some(self.parse_bool(value)?);
            }
            "manage acl" => {
                builder.manage_acl = Self::parse_list(value)
                    .iter()
                    .map(|entry| self.parse_mapping(entry))
                    .collect::<Result<_, _>>()?;
            }
            "api server" => {
                builder.api_server = (!value.is_empty()).then(|| value.to_owned());
            }
            "template only" => {
                builder.template_only = Some(self.parse_bool(value)?);
            }
            "rule" => {
                builder.rules.push(self.parse_rule(value)?);
            }
            _ => {
                // Unknown folder directives are ignored
            }
        }
        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::validation_error(self.path, self.line_number, message)
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Ok(true),
            "no" | "false" | "0" => Ok(false),
            _ => Err(self.invalid(format!("invalid boolean value '{value}'"))),
        }
    }

    fn parse_list(value: &str) -> Vec<String> {
        value
            .split([',', ' ', '\t'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }

    fn parse_mask(&self, value: &str) -> Result<PermissionMask, ConfigError> {
        value
            .parse()
            .map_err(|e| self.invalid(format!("invalid permissions '{value}': {e}")))
    }

    /// `name:mask` entries; a bare name receives every permission.
    fn parse_grants(&self, value: &str) -> Result<Vec<(String, PermissionMask)>, ConfigError> {
        Self::parse_list(value)
            .into_iter()
            .map(|entry| match entry.split_once(':') {
                Some((name, mask)) if !name.is_empty() => {
                    Ok((name.to_owned(), self.parse_mask(mask)?))
                }
                Some(_) => Err(self.invalid(format!("missing name in '{entry}'"))),
                None => Ok((entry, PermissionMask::ALL)),
            })
            .collect()
    }

    /// `@group`, `group:id`, `user:id` or a bare user id.
    fn parse_mapping(&self, value: &str) -> Result<Mapping, ConfigError> {
        if value.starts_with('@') || value.contains(':') {
            value
                .parse()
                .map_err(|e| self.invalid(format!("invalid mapping '{value}': {e}")))
        } else {
            Ok(Mapping::user(value))
        }
    }

    fn parse_quota(&self, value: &str) -> Result<Quota, ConfigError> {
        let lower = value.trim().to_ascii_lowercase();
        if lower == "unlimited" {
            return Ok(Quota::Unlimited);
        }
        if let Ok(raw) = lower.parse::<i64>() {
            return Quota::from_raw(raw).map_err(|e| self.invalid(e.to_string()));
        }

        let invalid = || self.invalid(format!("invalid quota '{value}'"));
        let unit = lower.chars().last().ok_or_else(invalid)?;
        let shift = match unit {
            'k' => 10,
            'm' => 20,
            'g' => 30,
            't' => 40,
            _ => return Err(invalid()),
        };
        let amount: u64 = lower[..lower.len() - 1].trim().parse().map_err(|_| invalid())?;
        amount
            .checked_mul(1 << shift)
            .filter(|bytes| i64::try_from(*bytes).is_ok())
            .map(Quota::Limited)
            .ok_or_else(invalid)
    }

    /// `<path> <mapping> [+letters] [-letters]`.
    fn parse_rule(&self, value: &str) -> Result<RuleConfig, ConfigError> {
        let mut tokens = value.split_whitespace();
        let (Some(path), Some(mapping)) = (tokens.next(), tokens.next()) else {
            return Err(self.invalid("expected 'rule = <path> <mapping> [+allow] [-deny]'"));
        };

        let mut allow = PermissionMask::NONE;
        let mut deny = PermissionMask::NONE;
        for token in tokens {
            if let Some(letters) = token.strip_prefix('+') {
                allow = allow | self.parse_mask(letters)?;
            } else if let Some(letters) = token.strip_prefix('-') {
                deny = deny | self.parse_mask(letters)?;
            } else {
                return Err(self.invalid(format!("rule permissions must start with + or -: '{token}'")));
            }
        }

        if (allow | deny).is_empty() {
            return Err(self.invalid("rule must grant or revoke at least one permission"));
        }
        if !(allow & deny).is_empty() {
            return Err(self.invalid(format!("rule both grants and revokes {}", allow & deny)));
        }

        Ok(RuleConfig {
            path: acl::path::normalize(path),
            mapping: self.parse_mapping(mapping)?,
            allow,
            deny,
        })
    }
}

#[derive(Default)]
struct FolderBuilder {
    mount_point: String,
    groups: Vec<(String, PermissionMask)>,
    users: Vec<(String, PermissionMask)>,
    quota: Option<Quota>,
    acl: Option<bool>,
    manage_acl: Vec<Mapping>,
    api_server: Option<String>,
    template_only: Option<bool>,
    rules: Vec<RuleConfig>,
}

impl FolderBuilder {
    fn new(mount_point: String) -> Self {
        Self {
            mount_point,
            ..Default::default()
        }
    }

    fn build(self) -> FolderConfig {
        FolderConfig {
            mount_point: self.mount_point,
            groups: self.groups,
            users: self.users,
            quota: self.quota.unwrap_or_default(),
            acl: self.acl.unwrap_or(false),
            manage_acl: self.manage_acl,
            api_server: self.api_server,
            template_only: self.template_only.unwrap_or(false),
            rules: self.rules,
        }
    }
}
